//! Cart pricing rules.
//!
//! Pure functions: a line's unit price is fixed when the line is created,
//! and cart totals are re-derived from the lines on every read.
//!
//! | Rule | Amount |
//! |------|--------|
//! | Name and/or number printed | +3.00€ per line |
//! | Each patch | +2.00€ per line |
//! | 3 to 5 units in cart | −3.00€ per unit |
//! | 6 to 8 units in cart | −6.00€ per unit |
//! | 9+ units in cart | −9.00€ per unit |

use serde::Serialize;

use crate::types::{CartLineItem, Price};

/// Surcharge for a printed name and/or number.
pub const CUSTOMIZATION_SURCHARGE: Price = Price::from_cents(300);

/// Surcharge per selected patch.
pub const PATCH_SURCHARGE: Price = Price::from_cents(200);

/// Quantity discount tiers as `(minimum units, discount per unit)`, highest
/// threshold first.
pub const DISCOUNT_TIERS: [(u32, Price); 3] = [
    (9, Price::from_cents(900)),
    (6, Price::from_cents(600)),
    (3, Price::from_cents(300)),
];

/// Derived cart figures handed to the cart drawer and to checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    /// Sum of all quantities.
    pub total_items: u32,
    /// `Σ final_unit_price × quantity`.
    pub subtotal: Price,
    /// Discount applied to every unit at the current tier.
    pub discount_per_unit: Price,
    /// `discount_per_unit × total_items`.
    pub total_discount: Price,
    /// `max(0, subtotal − total_discount)`.
    pub final_total: Price,
}

impl CartTotals {
    /// Totals of an empty cart.
    pub const EMPTY: Self = Self {
        total_items: 0,
        subtotal: Price::ZERO,
        discount_per_unit: Price::ZERO,
        total_discount: Price::ZERO,
        final_total: Price::ZERO,
    };
}

/// Unit price of a new line: base price plus personalisation and patch
/// surcharges. Surcharges apply once per line, not per unit.
#[must_use]
pub fn compute_unit_price(base_price: Price, has_customization: bool, patch_count: usize) -> Price {
    let mut price = base_price;
    if has_customization {
        price += CUSTOMIZATION_SURCHARGE;
    }
    for _ in 0..patch_count {
        price += PATCH_SURCHARGE;
    }
    price
}

/// Per-unit discount for a cart holding `total_quantity` units.
#[must_use]
pub fn discount_per_unit(total_quantity: u32) -> Price {
    DISCOUNT_TIERS
        .iter()
        .find(|(min_units, _)| total_quantity >= *min_units)
        .map_or(Price::ZERO, |(_, discount)| *discount)
}

/// Derive all cart figures from its lines.
#[must_use]
pub fn compute_totals(items: &[CartLineItem]) -> CartTotals {
    let total_items = items
        .iter()
        .fold(0_u32, |sum, item| sum.saturating_add(item.quantity()));
    let subtotal: Price = items.iter().map(CartLineItem::line_total).sum();
    let discount_per_unit = discount_per_unit(total_items);
    let total_discount = discount_per_unit * total_items;

    CartTotals {
        total_items,
        subtotal,
        discount_per_unit,
        total_discount,
        final_total: (subtotal - total_discount).floor_at_zero(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::{
        Customization, Jersey, JerseyId, JerseyType, JerseyTypeId, PatchSet, Size, TeamId,
    };

    fn jersey(id: i32, price_cents: i64) -> Jersey {
        Jersey {
            id: JerseyId::new(id),
            team_id: TeamId::new(1),
            team_name: None,
            season: "2024/25".to_owned(),
            jersey_type_id: JerseyTypeId::new(1),
            jersey_type: Some(JerseyType {
                id: None,
                name: "Home".to_owned(),
                original_price: Price::from_cents(price_cents),
                current_price: Price::from_cents(price_cents),
                description: None,
            }),
            main_color: "white".to_owned(),
            description: None,
            images: Vec::new(),
        }
    }

    fn line(id: i32, price_cents: i64, quantity: u32) -> CartLineItem {
        let mut item = CartLineItem::new(
            jersey(id, price_cents),
            Size::M,
            Customization::none(),
            PatchSet::new(),
        );
        for _ in 1..quantity {
            item.increment();
        }
        item
    }

    #[test]
    fn test_unit_price_base_only() {
        assert_eq!(
            compute_unit_price(Price::from_cents(2000), false, 0),
            Price::from_cents(2000)
        );
    }

    #[test]
    fn test_unit_price_with_extras() {
        assert_eq!(
            compute_unit_price(Price::from_cents(2000), true, 3),
            Price::from_cents(2900)
        );
    }

    #[test]
    fn test_discount_breakpoints() {
        assert_eq!(discount_per_unit(0), Price::ZERO);
        assert_eq!(discount_per_unit(2), Price::ZERO);
        assert_eq!(discount_per_unit(3), Price::from_cents(300));
        assert_eq!(discount_per_unit(5), Price::from_cents(300));
        assert_eq!(discount_per_unit(6), Price::from_cents(600));
        assert_eq!(discount_per_unit(8), Price::from_cents(600));
        assert_eq!(discount_per_unit(9), Price::from_cents(900));
        assert_eq!(discount_per_unit(250), Price::from_cents(900));
    }

    #[test]
    fn test_totals_two_items_no_discount() {
        let items = [line(1, 2000, 1), line(2, 2000, 1)];
        let totals = compute_totals(&items);
        assert_eq!(totals.total_items, 2);
        assert_eq!(totals.subtotal, Price::from_cents(4000));
        assert_eq!(totals.discount_per_unit, Price::ZERO);
        assert_eq!(totals.total_discount, Price::ZERO);
        assert_eq!(totals.final_total, Price::from_cents(4000));
    }

    #[test]
    fn test_totals_three_identical_items() {
        let items = [line(1, 2000, 3)];
        let totals = compute_totals(&items);
        assert_eq!(totals.total_items, 3);
        assert_eq!(totals.discount_per_unit, Price::from_cents(300));
        assert_eq!(totals.total_discount, Price::from_cents(900));
        assert_eq!(totals.final_total, Price::from_cents(5100));
    }

    #[test]
    fn test_totals_floor_at_zero() {
        // Nine free jerseys: a 9€/unit discount cannot make the total negative.
        let items = [line(1, 0, 9)];
        let totals = compute_totals(&items);
        assert_eq!(totals.total_discount, Price::from_cents(8100));
        assert_eq!(totals.final_total, Price::ZERO);
    }

    #[test]
    fn test_totals_empty_cart() {
        assert_eq!(compute_totals(&[]), CartTotals::EMPTY);
    }

    proptest! {
        #[test]
        fn prop_unit_price_formula(base in 0_i64..100_000, custom: bool, patches in 0_usize..10) {
            let price = compute_unit_price(Price::from_cents(base), custom, patches);
            let extra = if custom { 300 } else { 0 } + 200 * i64::try_from(patches).unwrap();
            prop_assert_eq!(price, Price::from_cents(base + extra));
        }

        #[test]
        fn prop_discount_is_monotonic(q in 0_u32..1_000) {
            prop_assert!(discount_per_unit(q) <= discount_per_unit(q + 1));
        }

        #[test]
        fn prop_final_total_never_negative(
            lines in proptest::collection::vec((0_i64..5_000, 1_u32..12), 0..8)
        ) {
            let items: Vec<CartLineItem> = lines
                .iter()
                .enumerate()
                .map(|(i, (cents, qty))| line(i32::try_from(i).unwrap(), *cents, *qty))
                .collect();
            let totals = compute_totals(&items);
            prop_assert!(totals.final_total >= Price::ZERO);
            prop_assert!(totals.final_total <= totals.subtotal);
        }
    }
}
