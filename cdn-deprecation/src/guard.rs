//! Create guard - Reject creation of deprecated resource configurations
//!
//! A resource's create operation calls [`CreateGuard::check_create`] before any
//! API request. Read, update and delete are never blocked, so existing
//! resources stay manageable until they are removed.

use crate::checks::{DeprecationCheck, DeprecationRegistry};
use crate::clock::{Clock, SystemClock};
use crate::resource::{Resource, ResourceId};

/// A resource whose creation is blocked by a deprecation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardError {
    pub resource_id: ResourceId,
    pub check: DeprecationCheck,
}

impl GuardError {
    pub fn message(&self) -> &'static str {
        self.check.message()
    }
}

impl std::fmt::Display for GuardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.resource_id, self.message())
    }
}

impl std::error::Error for GuardError {}

/// Result type for guard checks
pub type GuardResult = Result<(), Vec<GuardError>>;

/// SKUs of the classic Microsoft CDN
const SKU_MICROSOFT_CLASSIC: &[&str] = &["Standard_Microsoft"];
/// SKUs of Azure CDN from Edgio
const SKU_EDGIO: &[&str] = &["Standard_Verizon", "Premium_Verizon"];
/// SKUs of Azure CDN from Akamai
const SKU_AKAMAI: &[&str] = &["Standard_Akamai"];

/// Resource types that belong to Azure Front Door (classic)
const FRONTDOOR_CLASSIC_TYPES: &[&str] = &[
    "frontdoor",
    "frontdoor_custom_https_configuration",
    "frontdoor_firewall_policy",
    "frontdoor_rules_engine",
];

/// Checks that gate creation of `resource`.
///
/// Front Door Standard/Premium (`cdn_frontdoor_*`) and unknown types have none.
pub fn checks_for(resource: &Resource) -> Vec<DeprecationCheck> {
    let resource_type = resource.id.resource_type.as_str();
    match resource_type {
        "cdn_profile" => match resource.get_string("sku") {
            Some(sku) if sku_in(sku, SKU_MICROSOFT_CLASSIC) => vec![
                DeprecationCheck::CdnClassicCreation,
                DeprecationCheck::CdnClassicRetirement,
            ],
            Some(sku) if sku_in(sku, SKU_EDGIO) => vec![DeprecationCheck::CdnEdgioRetirement],
            Some(sku) if sku_in(sku, SKU_AKAMAI) => vec![DeprecationCheck::CdnAkamaiRetirement],
            _ => vec![],
        },
        "cdn_endpoint" | "cdn_endpoint_custom_domain" => vec![
            DeprecationCheck::CdnClassicCreation,
            DeprecationCheck::CdnClassicRetirement,
        ],
        t if FRONTDOOR_CLASSIC_TYPES.contains(&t) => vec![
            DeprecationCheck::FrontDoorClassicCreation,
            DeprecationCheck::FrontDoorClassicRetirement,
        ],
        _ => vec![],
    }
}

/// SKU names are case-insensitive on the API side
fn sku_in(sku: &str, skus: &[&str]) -> bool {
    skus.iter().any(|candidate| candidate.eq_ignore_ascii_case(sku))
}

/// Gate for create operations
#[derive(Debug, Clone)]
pub struct CreateGuard<C: Clock = SystemClock> {
    registry: DeprecationRegistry<C>,
}

impl Default for CreateGuard<SystemClock> {
    fn default() -> Self {
        Self::new(DeprecationRegistry::new())
    }
}

impl<C: Clock> CreateGuard<C> {
    pub fn new(registry: DeprecationRegistry<C>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &DeprecationRegistry<C> {
        &self.registry
    }

    /// Check whether `resource` may be created now
    pub fn check_create(&self, resource: &Resource) -> GuardResult {
        let errors: Vec<GuardError> = checks_for(resource)
            .into_iter()
            .filter(|check| self.registry.is_passed(*check))
            .map(|check| GuardError {
                resource_id: resource.id.clone(),
                check,
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            log::info!(
                "Creation of {} blocked by {} deprecation check(s)",
                resource.id,
                errors.len()
            );
            Err(errors)
        }
    }

    /// Check a batch of resources, collecting every violation
    pub fn check_all(&self, resources: &[Resource]) -> GuardResult {
        let errors: Vec<GuardError> = resources
            .iter()
            .filter_map(|resource| self.check_create(resource).err())
            .flatten()
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
