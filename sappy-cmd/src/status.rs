//! Plant state and daily points commands.

use chrono::{Duration, Local};
use log::info;
use sappy_engine::reward::DailyTally;
use sappy_engine::store::{Catalog, PointsBalance, StoreLedger};
use sappy_engine::usage::{derive, UsageReading, UsageSnapshot};

fn print_reading(reading: &UsageReading, limit: f64) {
    println!("{}", reading.state.message());
    println!("State:  {:?}", reading.state);
    println!("Saved:  {:.1} L (out of {:.0} L)", reading.saved, limit);
    println!(
        "Gauge:  {:.0}%{}",
        reading.gauge_percent,
        if reading.over_limit { " (over limit)" } else { "" }
    );
}

/// Show Sappy's state for a single usage figure.
pub fn run_status(used: f64, limit: f64) -> anyhow::Result<()> {
    let snapshot = UsageSnapshot::new(used, limit)?;
    let reading = derive(&snapshot);
    info!("Derived {:?} for {} of {} liters", reading.state, used, limit);
    print_reading(&reading, limit);
    Ok(())
}

/// Record a day's readings, close the day and bank its points.
pub fn run_day(readings: &[f64], limit: f64, points: u32) -> anyhow::Result<()> {
    let today = Local::now().naive_local().date();
    let mut tally = DailyTally::new(today, limit)?;
    for liters in readings {
        let reading = tally.record_usage(*liters)?;
        info!(
            "Recorded {} liters, {:?} at {:.0}%",
            liters, reading.state, reading.gauge_percent
        );
    }

    let mut ledger = StoreLedger::new(Catalog::default_catalog()?, PointsBalance::new(points));
    let result = tally.roll_over(today + Duration::days(1), &mut ledger);

    print_reading(&result.reading, limit);
    println!("Points earned today: {}", result.points);
    println!("Total points:        {}", ledger.balance().total_points);
    Ok(())
}
