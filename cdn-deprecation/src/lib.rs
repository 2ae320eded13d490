//! CDN Deprecation
//!
//! Date-threshold deprecation checks for Azure CDN and Front Door resources.
//!
//! # Overview
//!
//! - **Evaluator**: decides whether a `YYYY-MM-DD` threshold has passed, looking at
//!   "now" both in the reference timezone (America/Los_Angeles) and in the caller's
//!   local timezone. Either frame crossing the threshold is enough.
//! - **DeprecationCheck**: the named thresholds (CDN classic, Edgio, Akamai,
//!   Front Door classic) with their fixed messages.
//! - **CreateGuard**: the hook a resource's create operation calls before sending
//!   anything to the API.
//!
//! # Example
//!
//! ```ignore
//! use cdn_deprecation::{DeprecationCheck, DeprecationConfig};
//!
//! let config = DeprecationConfig::load(None)?;
//! let registry = config.registry()?;
//!
//! if registry.is_passed(DeprecationCheck::CdnClassicCreation) {
//!     return Err(DeprecationCheck::CdnClassicCreation.message().into());
//! }
//! ```

pub mod checks;
pub mod clock;
pub mod config;
pub mod evaluator;
pub mod guard;
pub mod resource;
pub mod timezone;

// Re-export main types for convenience
pub use checks::{
    CheckStatus, DeprecationCheck, DeprecationRegistry, InvalidThreshold, ThresholdTable,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, ConfigResult, DeprecationConfig};
pub use evaluator::{DateError, Evaluator, is_date_passed, parse_threshold};
pub use guard::{CreateGuard, GuardError, GuardResult};
pub use resource::{Resource, ResourceId, Value};
