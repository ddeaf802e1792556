//! Circulation policy knobs.

use serde::Deserialize;

fn default_loan_period_days() -> u32 {
    14
}

fn default_renewal_extension_days() -> u32 {
    7
}

fn default_max_renewals() -> u32 {
    3
}

fn default_per_day_rate_cents() -> i64 {
    200
}

/// Policy constants the engine enforces.
///
/// Deserializable so a deployment can override individual values from a
/// policy file; anything omitted falls back to the defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CirculationPolicy {
    /// Loan period applied when a checkout does not name one.
    #[serde(default = "default_loan_period_days")]
    pub loan_period_days: u32,

    /// Extension applied when a renewal does not name one.
    #[serde(default = "default_renewal_extension_days")]
    pub renewal_extension_days: u32,

    /// Renewals allowed per loan before `RenewalLimitExceeded`.
    #[serde(default = "default_max_renewals")]
    pub max_renewals: u32,

    /// Late-return fine per whole day past due, in cents.
    #[serde(default = "default_per_day_rate_cents")]
    pub per_day_rate_cents: i64,
}

impl Default for CirculationPolicy {
    fn default() -> Self {
        Self {
            loan_period_days: default_loan_period_days(),
            renewal_extension_days: default_renewal_extension_days(),
            max_renewals: default_max_renewals(),
            per_day_rate_cents: default_per_day_rate_cents(),
        }
    }
}
