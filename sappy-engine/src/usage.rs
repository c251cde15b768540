//! Plant state derivation from a day's water usage.
//!
//! Everything here is a pure function of a [`UsageSnapshot`]; nothing is
//! remembered between calls, so a reading can be re-derived at any time.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SappyError};

/// Default daily water limit in liters.
pub const DEFAULT_DAILY_LIMIT_LITERS: f64 = 150.0;

/// Liters that must be left under the limit for Sappy to thrive.
pub const THRIVING_SAVINGS_LITERS: f64 = 10.0;

/// One day's water usage measured against the daily limit.
///
/// Construction goes through [`UsageSnapshot::new`], which rejects a
/// non-positive limit so the gauge never divides by zero.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct UsageSnapshot {
    water_used_liters: f64,
    daily_limit_liters: f64,
}

impl UsageSnapshot {
    pub fn new(water_used_liters: f64, daily_limit_liters: f64) -> Result<Self> {
        if !daily_limit_liters.is_finite() || daily_limit_liters <= 0.0 {
            return Err(SappyError::InvalidLimit(daily_limit_liters));
        }
        if !water_used_liters.is_finite() || water_used_liters < 0.0 {
            return Err(SappyError::InvalidUsage(water_used_liters));
        }
        Ok(UsageSnapshot {
            water_used_liters,
            daily_limit_liters,
        })
    }

    pub fn water_used_liters(&self) -> f64 {
        self.water_used_liters
    }

    pub fn daily_limit_liters(&self) -> f64 {
        self.daily_limit_liters
    }

    /// Same limit, nothing used.
    pub fn cleared(&self) -> Self {
        UsageSnapshot {
            water_used_liters: 0.0,
            daily_limit_liters: self.daily_limit_liters,
        }
    }
}

/// Sappy's display state.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantState {
    Wilted,
    Starting,
    Growing,
    Thriving,
}

impl PlantState {
    /// Greeting shown under the user's name on the dashboard.
    pub fn message(&self) -> &'static str {
        match self {
            PlantState::Wilted => {
                "Sappy is looking a bit sad today. Save some water to help him grow."
            }
            PlantState::Starting => "Welcome and meet Sappy!",
            PlantState::Growing => "Sappy is growing nicely!",
            PlantState::Thriving => "Sappy is looking happy today!",
        }
    }
}

/// Everything the dashboard needs from a snapshot.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct UsageReading {
    pub state: PlantState,
    /// Liters left under the limit, never below 0
    pub saved: f64,
    /// Share of the limit used, clamped to 0..=100
    pub gauge_percent: f64,
    /// Gauge switches to its alert color once the limit is exceeded
    pub over_limit: bool,
}

/// Derive Sappy's state, savings and gauge from a snapshot.
///
/// Rules are checked in order and the first match wins:
/// nothing used yet is `Starting`, over the limit is `Wilted`, at least
/// [`THRIVING_SAVINGS_LITERS`] left is `Thriving`, anything else `Growing`.
pub fn derive(usage: &UsageSnapshot) -> UsageReading {
    let used = usage.water_used_liters;
    let limit = usage.daily_limit_liters;

    let saved = (limit - used).max(0.0);
    let gauge_percent = (100.0 * used / limit).min(100.0);

    let state = if used == 0.0 {
        PlantState::Starting
    } else if used > limit {
        PlantState::Wilted
    } else if saved >= THRIVING_SAVINGS_LITERS {
        PlantState::Thriving
    } else {
        PlantState::Growing
    };

    UsageReading {
        state,
        saved,
        gauge_percent,
        over_limit: used > limit,
    }
}
