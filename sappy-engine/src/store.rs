//! Points balance, item catalog and store purchases.

use std::collections::BTreeSet;

use csv::ReaderBuilder;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Result, SappyError};

/// Embedded CSV data for the default store catalog.
pub static CATALOG_CSV: &str = include_str!("../../fixtures/catalog.csv");

/// An item Sappy's caretaker can buy.
#[derive(Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
pub struct StoreItem {
    pub id: String,
    pub name: String,
    /// Price in points, always above 0
    pub cost: u32,
    /// Locked items are shown but cannot be selected
    pub unlocked: bool,
    pub description: String,
}

/// Points available to spend.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PointsBalance {
    pub total_points: u32,
}

impl PointsBalance {
    pub fn new(total_points: u32) -> Self {
        PointsBalance { total_points }
    }
}

/// Item ids picked during one store visit.
pub type Selection = BTreeSet<String>;

/// Why a purchase was turned down. The balance is untouched in every case.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum PurchaseRejection {
    #[error("No items selected")]
    EmptySelection,

    #[error("Not enough points (needed: {needed}, available: {available})")]
    InsufficientPoints { needed: u64, available: u32 },
}

/// A completed purchase.
#[derive(Debug, PartialEq, Clone)]
pub struct Purchase {
    /// Balance after the cost was deducted
    pub balance: PointsBalance,
    pub items: Vec<StoreItem>,
    pub total_cost: u32,
}

fn parse_bool(ess: &str) -> bool {
    matches!(
        ess.trim().to_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}

/// The fixed list of items offered in the store.
#[derive(Debug, PartialEq, Clone)]
pub struct Catalog {
    items: Vec<StoreItem>,
}

impl Catalog {
    /// Catalog built from the embedded default CSV.
    pub fn default_catalog() -> Result<Catalog> {
        Catalog::parse_catalog_csv(CATALOG_CSV)
    }

    /// Build a catalog from items, rejecting duplicate ids and free items.
    pub fn new(items: Vec<StoreItem>) -> Result<Catalog> {
        let mut seen = BTreeSet::new();
        for item in &items {
            if item.cost == 0 {
                return Err(SappyError::InvalidCatalogEntry(format!(
                    "{} has no cost",
                    item.id
                )));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(SappyError::InvalidCatalogEntry(format!(
                    "duplicate id {}",
                    item.id
                )));
            }
        }
        Ok(Catalog { items })
    }

    /// Parse a CSV string of store items into a Catalog.
    ///
    /// Expected CSV columns: id, name, cost, unlocked, description
    pub fn parse_catalog_csv(csv_object: &str) -> Result<Catalog> {
        let mut items: Vec<StoreItem> = Vec::new();
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .from_reader(csv_object.as_bytes());
        for row in rdr.records() {
            let rho = row?;
            let field = |idx: usize, name: &str| {
                rho.get(idx)
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| SappyError::InvalidCatalogEntry(format!("missing {}", name)))
            };
            let id = field(0, "id")?;
            let cost = field(2, "cost")?
                .parse::<u32>()
                .map_err(|e| SappyError::InvalidCatalogEntry(format!("{}: {}", id, e)))?;
            items.push(StoreItem {
                name: field(1, "name")?,
                cost,
                unlocked: parse_bool(&field(3, "unlocked")?),
                description: field(4, "description").unwrap_or_default(),
                id,
            });
        }
        Catalog::new(items)
    }

    pub fn items(&self) -> &[StoreItem] {
        &self.items
    }

    pub fn get(&self, item_id: &str) -> Option<&StoreItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Mark an item as purchasable. Returns false for unknown ids.
    pub fn unlock(&mut self, item_id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == item_id) {
            Some(item) => {
                item.unlocked = true;
                true
            }
            None => false,
        }
    }

    fn selected_items<'a>(&'a self, selection: &'a Selection) -> impl Iterator<Item = &'a StoreItem> {
        self.items
            .iter()
            .filter(move |item| item.unlocked && selection.contains(&item.id))
    }

    /// Total cost of the selected unlocked items.
    ///
    /// Summed as u64 so any number of u32-priced items fits.
    pub fn quote(&self, selection: &Selection) -> u64 {
        self.selected_items(selection)
            .map(|item| u64::from(item.cost))
            .sum()
    }

    pub fn can_purchase(&self, selection: &Selection, balance: &PointsBalance) -> bool {
        self.check_purchase(selection, balance).is_ok()
    }

    fn check_purchase(
        &self,
        selection: &Selection,
        balance: &PointsBalance,
    ) -> std::result::Result<u32, PurchaseRejection> {
        if self.selected_items(selection).next().is_none() {
            return Err(PurchaseRejection::EmptySelection);
        }
        let needed = self.quote(selection);
        match u32::try_from(needed) {
            Ok(cost) if cost <= balance.total_points => Ok(cost),
            _ => Err(PurchaseRejection::InsufficientPoints {
                needed,
                available: balance.total_points,
            }),
        }
    }

    /// Buy everything in the selection or nothing at all.
    pub fn purchase(
        &self,
        selection: &Selection,
        balance: PointsBalance,
    ) -> std::result::Result<Purchase, PurchaseRejection> {
        let total_cost = self.check_purchase(selection, &balance)?;
        Ok(Purchase {
            balance: PointsBalance::new(balance.total_points - total_cost),
            items: self.selected_items(selection).cloned().collect(),
            total_cost,
        })
    }
}

/// The store as seen by one user: catalog, balance and the open selection.
#[derive(Debug, Clone)]
pub struct StoreLedger {
    catalog: Catalog,
    balance: PointsBalance,
    selection: Selection,
}

impl StoreLedger {
    pub fn new(catalog: Catalog, balance: PointsBalance) -> Self {
        StoreLedger {
            catalog,
            balance,
            selection: Selection::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn balance(&self) -> PointsBalance {
        self.balance
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Add earned points to the balance.
    pub fn credit(&mut self, points: u32) -> PointsBalance {
        self.balance.total_points = self.balance.total_points.saturating_add(points);
        self.balance
    }

    /// Select or deselect an item. Locked and unknown items are ignored.
    pub fn toggle_selection(&mut self, item_id: &str) -> &Selection {
        match self.catalog.get(item_id) {
            Some(item) if item.unlocked => {
                if !self.selection.remove(item_id) {
                    self.selection.insert(item_id.to_string());
                }
            }
            Some(_) => debug!("Ignoring locked item {}", item_id),
            None => debug!("Ignoring unknown item {}", item_id),
        }
        &self.selection
    }

    pub fn quote(&self) -> u64 {
        self.catalog.quote(&self.selection)
    }

    pub fn can_purchase(&self) -> bool {
        self.catalog.can_purchase(&self.selection, &self.balance)
    }

    /// Label for the buy button in the current state.
    pub fn purchase_label(&self) -> &'static str {
        if self.selection.is_empty() {
            "Select items to buy"
        } else if self.can_purchase() {
            "Buy now"
        } else {
            "Not enough points"
        }
    }

    /// Buy the open selection. On success the balance is debited and the
    /// selection cleared; on rejection nothing changes.
    pub fn purchase(&mut self) -> std::result::Result<Purchase, PurchaseRejection> {
        let purchase = self.catalog.purchase(&self.selection, self.balance)?;
        self.balance = purchase.balance;
        self.selection.clear();
        info!(
            "Purchased {} item(s) for {} points, {} left",
            purchase.items.len(),
            purchase.total_cost,
            purchase.balance.total_points
        );
        Ok(purchase)
    }

    /// Leave the store without buying; the selection is discarded.
    pub fn close(&mut self) {
        self.selection.clear();
    }
}
