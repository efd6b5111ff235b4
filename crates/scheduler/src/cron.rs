//! Cron expression parsing helpers.

use std::str::FromStr;

use cron::Schedule;

/// Parse a cron expression, auto-prepending "0 " for 5-field expressions.
///
/// The `cron` crate requires 6 fields (sec min hr dom mon dow), but users
/// typically write 5-field cron (min hr dom mon dow). We detect and adapt.
pub fn parse_cron(expr: &str) -> Result<Schedule, cron::error::Error> {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    if parts.len() == 5 {
        let six_field = format!("0 {}", expr.trim());
        Schedule::from_str(&six_field)
    } else {
        Schedule::from_str(expr.trim())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
