//! Turning saved water into points.
//!
//! A [`DailyTally`] accumulates one calendar day of usage. When the day
//! rolls over, the liters saved under the limit are paid out as points.

use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::store::StoreLedger;
use crate::usage::{derive, PlantState, UsageReading, UsageSnapshot};

/// Points earned for a reading: one per whole liter saved.
///
/// Days with no recorded usage and days over the limit earn nothing.
pub fn points_for(reading: &UsageReading) -> u32 {
    match reading.state {
        PlantState::Starting | PlantState::Wilted => 0,
        PlantState::Growing | PlantState::Thriving => reading.saved.floor() as u32,
    }
}

/// Summary of a finished day.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct DayResult {
    pub date: NaiveDate,
    pub reading: UsageReading,
    pub points: u32,
}

/// Running usage for a single day.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct DailyTally {
    date: NaiveDate,
    snapshot: UsageSnapshot,
}

impl DailyTally {
    pub fn new(date: NaiveDate, daily_limit_liters: f64) -> Result<Self> {
        Ok(DailyTally {
            date,
            snapshot: UsageSnapshot::new(0.0, daily_limit_liters)?,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        self.snapshot
    }

    /// Add a usage reading to today's total.
    pub fn record_usage(&mut self, liters: f64) -> Result<UsageReading> {
        self.snapshot = UsageSnapshot::new(
            self.snapshot.water_used_liters() + liters,
            self.snapshot.daily_limit_liters(),
        )?;
        Ok(self.reading())
    }

    pub fn reading(&self) -> UsageReading {
        derive(&self.snapshot)
    }

    /// Points the day would pay out if it ended now.
    pub fn points_so_far(&self) -> u32 {
        points_for(&self.reading())
    }

    /// Close the current day, credit its points and start `next_day`.
    ///
    /// The limit carries over to the new day.
    pub fn roll_over(&mut self, next_day: NaiveDate, ledger: &mut StoreLedger) -> DayResult {
        let reading = self.reading();
        let points = points_for(&reading);
        let result = DayResult {
            date: self.date,
            reading,
            points,
        };
        let balance = ledger.credit(points);
        info!(
            "Closed {}: {:?}, {} liters saved, {} points earned ({} total)",
            self.date, reading.state, reading.saved, points, balance.total_points
        );
        self.date = next_day;
        self.snapshot = self.snapshot.cleared();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SappyError;
    use crate::store::{Catalog, PointsBalance};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_points_for_states() {
        let read = |used, limit| derive(&UsageSnapshot::new(used, limit).unwrap());
        assert_eq!(points_for(&read(0.0, 150.0)), 0);
        assert_eq!(points_for(&read(160.0, 150.0)), 0);
        assert_eq!(points_for(&read(135.0, 150.0)), 15);
        assert_eq!(points_for(&read(144.5, 150.0)), 5);
        assert_eq!(points_for(&read(150.0, 150.0)), 0);
    }

    #[test]
    fn test_tally_accumulates() {
        let mut tally = DailyTally::new(day(1), 150.0).unwrap();
        assert_eq!(tally.reading().state, PlantState::Starting);
        tally.record_usage(100.0).unwrap();
        let reading = tally.record_usage(35.0).unwrap();
        assert_eq!(reading.state, PlantState::Thriving);
        assert_eq!(tally.points_so_far(), 15);
        assert_eq!(tally.snapshot().water_used_liters(), 135.0);
    }

    #[test]
    fn test_tally_rejects_negative_totals() {
        let mut tally = DailyTally::new(day(1), 150.0).unwrap();
        assert!(matches!(
            tally.record_usage(-1.0),
            Err(SappyError::InvalidUsage(_))
        ));
        assert_eq!(tally.snapshot().water_used_liters(), 0.0);
        assert!(DailyTally::new(day(1), 0.0).is_err());
    }

    #[test]
    fn test_roll_over_credits_ledger() {
        let mut ledger =
            StoreLedger::new(Catalog::default_catalog().unwrap(), PointsBalance::new(2));
        let mut tally = DailyTally::new(day(1), 150.0).unwrap();
        tally.record_usage(120.0).unwrap();

        let result = tally.roll_over(day(2), &mut ledger);
        assert_eq!(result.date, day(1));
        assert_eq!(result.points, 30);
        assert_eq!(ledger.balance(), PointsBalance::new(32));

        assert_eq!(tally.date(), day(2));
        assert_eq!(tally.reading().state, PlantState::Starting);
        assert_eq!(tally.snapshot().daily_limit_liters(), 150.0);

        tally.record_usage(200.0).unwrap();
        assert_eq!(tally.roll_over(day(3), &mut ledger).points, 0);
        assert_eq!(ledger.balance(), PointsBalance::new(32));
    }
}
