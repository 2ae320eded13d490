//! Named deprecation checks and their thresholds
//!
//! Each check is an independent predicate over its own date. Nothing enforces an
//! order between them (e.g. creation being blocked before retirement); keep the
//! constants consistent when adding new ones.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::evaluator::{DateError, Evaluator, parse_threshold};

/// New Azure CDN from Microsoft (classic) profiles and endpoints are rejected from this date
pub const CDN_CLASSIC_CREATION_DATE: &str = "2025-10-01";
/// Azure CDN from Microsoft (classic) is retired
pub const CDN_CLASSIC_RETIREMENT_DATE: &str = "2027-09-30";
/// Azure CDN from Edgio (Standard_Verizon / Premium_Verizon) is retired
pub const CDN_EDGIO_RETIREMENT_DATE: &str = "2025-01-15";
/// Azure CDN from Akamai (Standard_Akamai) is retired
pub const CDN_AKAMAI_RETIREMENT_DATE: &str = "2023-10-31";
/// New Azure Front Door (classic) resources are rejected from this date
pub const FRONTDOOR_CLASSIC_CREATION_DATE: &str = "2025-04-01";
/// Azure Front Door (classic) is retired
pub const FRONTDOOR_CLASSIC_RETIREMENT_DATE: &str = "2027-03-31";

/// A named deprecation threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeprecationCheck {
    CdnClassicCreation,
    CdnClassicRetirement,
    CdnEdgioRetirement,
    CdnAkamaiRetirement,
    FrontDoorClassicCreation,
    FrontDoorClassicRetirement,
}

impl DeprecationCheck {
    pub const ALL: [DeprecationCheck; 6] = [
        DeprecationCheck::CdnClassicCreation,
        DeprecationCheck::CdnClassicRetirement,
        DeprecationCheck::CdnEdgioRetirement,
        DeprecationCheck::CdnAkamaiRetirement,
        DeprecationCheck::FrontDoorClassicCreation,
        DeprecationCheck::FrontDoorClassicRetirement,
    ];

    /// Stable name used in configuration files and CLI output
    pub fn name(&self) -> &'static str {
        match self {
            DeprecationCheck::CdnClassicCreation => "cdn_classic_creation",
            DeprecationCheck::CdnClassicRetirement => "cdn_classic_retirement",
            DeprecationCheck::CdnEdgioRetirement => "cdn_edgio_retirement",
            DeprecationCheck::CdnAkamaiRetirement => "cdn_akamai_retirement",
            DeprecationCheck::FrontDoorClassicCreation => "frontdoor_classic_creation",
            DeprecationCheck::FrontDoorClassicRetirement => "frontdoor_classic_retirement",
        }
    }

    pub fn default_threshold(&self) -> &'static str {
        match self {
            DeprecationCheck::CdnClassicCreation => CDN_CLASSIC_CREATION_DATE,
            DeprecationCheck::CdnClassicRetirement => CDN_CLASSIC_RETIREMENT_DATE,
            DeprecationCheck::CdnEdgioRetirement => CDN_EDGIO_RETIREMENT_DATE,
            DeprecationCheck::CdnAkamaiRetirement => CDN_AKAMAI_RETIREMENT_DATE,
            DeprecationCheck::FrontDoorClassicCreation => FRONTDOOR_CLASSIC_CREATION_DATE,
            DeprecationCheck::FrontDoorClassicRetirement => FRONTDOOR_CLASSIC_RETIREMENT_DATE,
        }
    }

    /// Message surfaced to the user when the check has passed
    pub fn message(&self) -> &'static str {
        match self {
            DeprecationCheck::CdnClassicCreation => {
                "Azure CDN from Microsoft (classic) no longer supports the creation of new profiles or endpoints, \
                 please use Azure Front Door Standard or Premium (`cdn_frontdoor_profile`) instead"
            }
            DeprecationCheck::CdnClassicRetirement => {
                "Azure CDN from Microsoft (classic) has been retired, \
                 please migrate to Azure Front Door Standard or Premium (`cdn_frontdoor_profile`)"
            }
            DeprecationCheck::CdnEdgioRetirement => {
                "Azure CDN from Edgio has been retired and the `Standard_Verizon` and `Premium_Verizon` SKUs \
                 can no longer be used, please migrate to Azure Front Door Standard or Premium"
            }
            DeprecationCheck::CdnAkamaiRetirement => {
                "Azure CDN from Akamai has been retired and the `Standard_Akamai` SKU can no longer be used, \
                 please migrate to Azure Front Door Standard or Premium"
            }
            DeprecationCheck::FrontDoorClassicCreation => {
                "Azure Front Door (classic) no longer supports the creation of new resources, \
                 please use Azure Front Door Standard or Premium (`cdn_frontdoor_profile`) instead"
            }
            DeprecationCheck::FrontDoorClassicRetirement => {
                "Azure Front Door (classic) has been retired, \
                 please migrate to Azure Front Door Standard or Premium (`cdn_frontdoor_profile`)"
            }
        }
    }
}

impl fmt::Display for DeprecationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for DeprecationCheck {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl FromStr for DeprecationCheck {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeprecationCheck::ALL
            .into_iter()
            .find(|check| check.name() == s)
            .ok_or_else(|| format!("Unknown deprecation check: {}", s))
    }
}

/// A threshold date that does not parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid threshold for {check}: {source}")]
pub struct InvalidThreshold {
    pub check: DeprecationCheck,
    pub source: DateError,
}

/// Threshold date for every named check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdTable {
    dates: BTreeMap<DeprecationCheck, String>,
}

impl ThresholdTable {
    /// Threshold for `check`
    pub fn get(&self, check: DeprecationCheck) -> &str {
        self.dates
            .get(&check)
            .map(String::as_str)
            .unwrap_or_else(|| check.default_threshold())
    }

    /// Override the threshold for `check`
    pub fn set(&mut self, check: DeprecationCheck, date: impl Into<String>) {
        self.dates.insert(check, date.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeprecationCheck, &str)> {
        DeprecationCheck::ALL
            .into_iter()
            .map(move |check| (check, self.get(check)))
    }

    /// Report every threshold that is not a valid date.
    ///
    /// Evaluation treats such thresholds as never passed, so call this at
    /// start-up to catch them instead.
    pub fn validate(&self) -> Result<(), Vec<InvalidThreshold>> {
        let errors: Vec<InvalidThreshold> = self
            .iter()
            .filter_map(|(check, date)| {
                parse_threshold(date)
                    .err()
                    .map(|source| InvalidThreshold { check, source })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            dates: DeprecationCheck::ALL
                .into_iter()
                .map(|check| (check, check.default_threshold().to_string()))
                .collect(),
        }
    }
}

/// Evaluated state of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckStatus {
    pub check: DeprecationCheck,
    pub threshold: String,
    pub passed: bool,
    pub message: &'static str,
}

/// Evaluates the named checks against a clock
#[derive(Debug, Clone)]
pub struct DeprecationRegistry<C: Clock = SystemClock> {
    evaluator: Evaluator,
    thresholds: ThresholdTable,
    clock: C,
}

impl DeprecationRegistry<SystemClock> {
    /// Default thresholds, default reference timezone, system clock
    pub fn new() -> Self {
        Self::with_clock(Evaluator::default(), ThresholdTable::default(), SystemClock)
    }
}

impl Default for DeprecationRegistry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> DeprecationRegistry<C> {
    pub fn with_clock(evaluator: Evaluator, thresholds: ThresholdTable, clock: C) -> Self {
        Self {
            evaluator,
            thresholds,
            clock,
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Has the threshold for `check` been reached?
    ///
    /// Recomputed on every call; nothing is cached.
    pub fn is_passed(&self, check: DeprecationCheck) -> bool {
        self.evaluator
            .is_date_passed_with(self.thresholds.get(check), &self.clock)
    }

    /// Evaluate an arbitrary date with this registry's evaluator and clock
    pub fn is_date_passed(&self, date: &str) -> bool {
        self.evaluator.is_date_passed_with(date, &self.clock)
    }

    pub fn status(&self) -> Vec<CheckStatus> {
        self.thresholds
            .iter()
            .map(|(check, threshold)| CheckStatus {
                check,
                threshold: threshold.to_string(),
                passed: self.is_date_passed(threshold),
                message: check.message(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Tz;

    use crate::clock::FixedClock;

    fn registry_at(y: i32, m: u32, d: u32) -> DeprecationRegistry<FixedClock> {
        let now = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        DeprecationRegistry::with_clock(
            Evaluator::new(Tz::America__Los_Angeles),
            ThresholdTable::default(),
            FixedClock::new(now),
        )
    }

    #[test]
    fn test_names_round_trip() {
        for check in DeprecationCheck::ALL {
            assert_eq!(check.name().parse::<DeprecationCheck>(), Ok(check));
            assert_eq!(check.to_string(), check.name());
        }
        assert!("cdn_classic".parse::<DeprecationCheck>().is_err());
    }

    #[test]
    fn test_default_thresholds_are_valid() {
        assert!(ThresholdTable::default().validate().is_ok());
    }

    #[test]
    fn test_retirement_follows_creation() {
        let table = ThresholdTable::default();
        assert!(
            table.get(DeprecationCheck::CdnClassicCreation)
                < table.get(DeprecationCheck::CdnClassicRetirement)
        );
        assert!(
            table.get(DeprecationCheck::FrontDoorClassicCreation)
                < table.get(DeprecationCheck::FrontDoorClassicRetirement)
        );
    }

    #[test]
    fn test_validate_reports_bad_overrides() {
        let mut table = ThresholdTable::default();
        table.set(DeprecationCheck::CdnEdgioRetirement, "not-a-date");
        table.set(DeprecationCheck::CdnClassicRetirement, "2025-13-40");

        let errors = table.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].check, DeprecationCheck::CdnClassicRetirement);
        assert_eq!(errors[1].check, DeprecationCheck::CdnEdgioRetirement);
        assert!(errors[1].to_string().contains("cdn_edgio_retirement"));
    }

    #[test]
    fn test_creation_check_end_to_end() {
        assert!(registry_at(2025, 10, 2).is_passed(DeprecationCheck::CdnClassicCreation));
        assert!(!registry_at(2024, 1, 1).is_passed(DeprecationCheck::CdnClassicCreation));
    }

    #[test]
    fn test_checks_are_independent() {
        let registry = registry_at(2026, 6, 1);
        assert!(registry.is_passed(DeprecationCheck::CdnClassicCreation));
        assert!(!registry.is_passed(DeprecationCheck::CdnClassicRetirement));
        assert!(registry.is_passed(DeprecationCheck::FrontDoorClassicCreation));
        assert!(!registry.is_passed(DeprecationCheck::FrontDoorClassicRetirement));
        assert!(registry.is_passed(DeprecationCheck::CdnAkamaiRetirement));
        assert!(registry.is_passed(DeprecationCheck::CdnEdgioRetirement));
    }

    #[test]
    fn test_malformed_override_fails_open() {
        let mut table = ThresholdTable::default();
        table.set(DeprecationCheck::CdnAkamaiRetirement, "someday");
        let registry = DeprecationRegistry::with_clock(
            Evaluator::new(Tz::America__Los_Angeles),
            table,
            FixedClock::new(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
        );
        assert!(!registry.is_passed(DeprecationCheck::CdnAkamaiRetirement));
    }

    #[test]
    fn test_status_lists_every_check() {
        let status = registry_at(2025, 10, 2).status();
        assert_eq!(status.len(), DeprecationCheck::ALL.len());

        let creation = status
            .iter()
            .find(|s| s.check == DeprecationCheck::CdnClassicCreation)
            .unwrap();
        assert_eq!(creation.threshold, CDN_CLASSIC_CREATION_DATE);
        assert!(creation.passed);
        assert_eq!(creation.message, DeprecationCheck::CdnClassicCreation.message());
    }

    #[test]
    fn test_status_serializes_check_name() {
        let status = registry_at(2024, 1, 1).status();
        let json = serde_json::to_value(&status[0]).unwrap();
        assert_eq!(json["check"], "cdn_classic_creation");
        assert_eq!(json["passed"], false);
    }
}
