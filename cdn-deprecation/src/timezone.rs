//! Reference timezone resolution

use std::str::FromStr;
use std::sync::OnceLock;

use chrono_tz::Tz;

/// Timezone that deprecation dates are published in
pub const DEFAULT_REFERENCE_TIMEZONE: &str = "America/Los_Angeles";

/// Look up a timezone by its IANA name.
///
/// Names missing from the timezone database resolve to UTC. That shifts the
/// threshold by a few hours, which is tolerated for day-granularity checks.
pub fn resolve(name: &str) -> Tz {
    match Tz::from_str(name) {
        Ok(tz) => tz,
        Err(e) => {
            log::warn!(
                "Timezone '{}' is not available ({}), falling back to UTC",
                name,
                e
            );
            Tz::UTC
        }
    }
}

/// The default reference timezone, resolved once per process
pub fn reference() -> Tz {
    static REFERENCE: OnceLock<Tz> = OnceLock::new();
    *REFERENCE.get_or_init(|| resolve(DEFAULT_REFERENCE_TIMEZONE))
}
