pub mod classify;
pub mod config;
pub mod run;

use chrono::{DateTime, Utc};

/// Parse an optional `--now` argument, defaulting to the current time.
pub fn parse_now(now: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match now {
        Some(value) => {
            let parsed = DateTime::parse_from_rfc3339(value)
                .map_err(|e| anyhow::anyhow!("invalid --now '{}': {}", value, e))?;
            Ok(parsed.with_timezone(&Utc))
        }
        None => Ok(Utc::now()),
    }
}
