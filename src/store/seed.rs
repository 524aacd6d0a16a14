//! Built-in fallback data for first-run bootstrap.
//!
//! The read contract returns these when a collection is empty and persists
//! them back, so a fresh store comes up with a workable catalog instead of
//! a blank screen.

use rust_decimal_macros::dec;

use crate::models::{CatalogItem, Customer};

pub fn catalog_seed() -> Vec<CatalogItem> {
    let mut items = vec![
        CatalogItem::new("Apollo", "Premium", "Amazer 4G Life", "Tyre", dec!(3450)),
        CatalogItem::new("Apollo", "Standard", "Alnac 4G", "Tyre", dec!(4100)),
        CatalogItem::new("CEAT", "Premium", "SecuraDrive", "Tyre", dec!(3900)),
        CatalogItem::new("MRF", "Standard", "ZVTV", "Tyre", dec!(3650)),
        CatalogItem::new("Exide", "Premium", "Mileage ML38B20L", "Battery", dec!(4800)),
    ];
    for item in &mut items {
        item.quantity = 10;
    }
    items
}

pub fn customer_seed() -> Vec<Customer> {
    vec![
        Customer::new("Walk-in", ""),
        Customer::new("Sharma Tyres", "NH-8 service road"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_items_are_active_and_stocked() {
        for item in catalog_seed() {
            assert!(item.is_active());
            assert!(item.quantity > 0);
        }
    }
}
