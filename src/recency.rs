use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named look-back windows for the publishedAfter search filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyMode {
    LastMonth,
    LastWeek,
    LastDay,
    Custom,
}

impl RecencyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecencyMode::LastMonth => "last_month",
            RecencyMode::LastWeek => "last_week",
            RecencyMode::LastDay => "last_day",
            RecencyMode::Custom => "custom",
        }
    }

    /// Parse a mode name from config or CLI
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "last_month" => Some(RecencyMode::LastMonth),
            "last_week" => Some(RecencyMode::LastWeek),
            "last_day" => Some(RecencyMode::LastDay),
            "custom" => Some(RecencyMode::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for RecencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Custom look-back window, required when the mode is `custom`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomWindow {
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
}

impl CustomWindow {
    /// Parse a "weeks,days,hours" triple as given on the CLI
    pub fn parse_triple(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(anyhow!(
                "custom window must be three comma-separated numbers (weeks,days,hours), got '{}'",
                value
            ));
        }
        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| anyhow!("invalid custom window component '{}'", part))?;
        }
        Ok(Self {
            weeks: numbers[0],
            days: numbers[1],
            hours: numbers[2],
        })
    }

    fn as_duration(&self) -> Duration {
        Duration::weeks(self.weeks as i64)
            + Duration::days(self.days as i64)
            + Duration::hours(self.hours as i64)
    }
}

/// Timestamp format the search API expects: UTC, second precision, trailing zulu
const CUTOFF_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Compute the publishedAfter cutoff against the current instant
pub fn cutoff(mode: RecencyMode, custom: Option<CustomWindow>) -> Result<String> {
    cutoff_at(Utc::now(), mode, custom)
}

/// Compute the cutoff against an explicit instant.
///
/// Sub-second precision is dropped by formatting, never rounded up.
/// A `custom` mode without a window is a configuration error.
pub fn cutoff_at(
    now: DateTime<Utc>,
    mode: RecencyMode,
    custom: Option<CustomWindow>,
) -> Result<String> {
    let window = match mode {
        RecencyMode::LastMonth => Duration::weeks(4),
        RecencyMode::LastWeek => Duration::weeks(1),
        RecencyMode::LastDay => Duration::days(1),
        RecencyMode::Custom => custom
            .ok_or_else(|| {
                anyhow!("recency mode 'custom' requires a (weeks, days, hours) window")
            })?
            .as_duration(),
    };

    Ok((now - window).format(CUTOFF_FORMAT).to_string())
}
