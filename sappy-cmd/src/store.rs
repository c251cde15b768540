//! Store catalog and purchase commands.

use log::{info, warn};
use sappy_engine::store::{Catalog, PointsBalance, StoreLedger};

/// List every catalog item with its price and lock state.
pub fn run_catalog() -> anyhow::Result<()> {
    let catalog = Catalog::default_catalog()?;
    for item in catalog.items() {
        println!(
            "{:<12} {:<14} {:>4} pts  {:<8} {}",
            item.id,
            item.name,
            item.cost,
            if item.unlocked { "" } else { "locked" },
            item.description
        );
    }
    Ok(())
}

/// Select the given items and try to buy them.
///
/// A rejected purchase is reported, not treated as a failure.
pub fn run_store(points: u32, items: &[String]) -> anyhow::Result<()> {
    let mut ledger = StoreLedger::new(Catalog::default_catalog()?, PointsBalance::new(points));
    for item_id in items {
        let before = ledger.selection().len();
        if ledger.toggle_selection(item_id).len() == before {
            warn!("{} is locked or unknown, skipping", item_id);
        }
    }

    println!("Total cost:  {}", ledger.quote());
    println!("Your points: {}", ledger.balance().total_points);
    println!("{}", ledger.purchase_label());

    match ledger.purchase() {
        Ok(purchase) => {
            let names: Vec<&str> = purchase.items.iter().map(|i| i.name.as_str()).collect();
            info!("Bought {:?}", names);
            println!("Bought {} for {} points", names.join(", "), purchase.total_cost);
            println!("Points left: {}", purchase.balance.total_points);
        }
        Err(rejection) => println!("Cannot purchase: {}", rejection),
    }
    Ok(())
}
