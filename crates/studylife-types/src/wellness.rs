//! Dashboard wellness metrics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Energy level (percent) shown on the dashboard until it is tracked.
pub const DEFAULT_ENERGY_LEVEL: u8 = 70;

/// Stress estimate derived from last night's sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressLevel {
    High,
    Normal,
    Low,
}

impl StressLevel {
    pub fn from_sleep_hours(hours: f64) -> Self {
        if hours < 6.0 {
            StressLevel::High
        } else if hours < 7.5 {
            StressLevel::Normal
        } else {
            StressLevel::Low
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StressLevel::High => write!(f, "High"),
            StressLevel::Normal => write!(f, "Normal"),
            StressLevel::Low => write!(f, "Low"),
        }
    }
}

/// Inputs to the daily insight prompt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WellnessMetrics {
    pub sleep_hours: f64,
    /// Energy in percent (0-100).
    pub energy_level: u8,
}

impl WellnessMetrics {
    /// Energy on the 0-10 scale used in prompts.
    pub fn energy_out_of_ten(&self) -> u8 {
        self.energy_level.min(100) / 10
    }
}

/// Everything the dashboard displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub greeting_name: String,
    pub sleep_hours: f64,
    pub energy_level: u8,
    pub stress: StressLevel,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_thresholds() {
        assert_eq!(StressLevel::from_sleep_hours(5.9), StressLevel::High);
        assert_eq!(StressLevel::from_sleep_hours(6.0), StressLevel::Normal);
        assert_eq!(StressLevel::from_sleep_hours(7.4), StressLevel::Normal);
        assert_eq!(StressLevel::from_sleep_hours(7.5), StressLevel::Low);
    }

    #[test]
    fn test_energy_scale() {
        let metrics = WellnessMetrics {
            sleep_hours: 7.0,
            energy_level: DEFAULT_ENERGY_LEVEL,
        };
        assert_eq!(metrics.energy_out_of_ten(), 7);
    }
}
