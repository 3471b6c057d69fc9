//! Property-based tests for derived cart state.
//!
//! Whatever sequence of mutations is applied, every item's subtotal and
//! discount and the cart total must agree with the raw prices, quantities
//! and promotions.

use proptest::prelude::*;
use rust_decimal::Decimal;

use cart::prelude::*;

/// A single cart mutation
#[derive(Debug, Clone)]
enum Op {
    Update { id: i64, qty: Option<i64> },
    Asset { id: i64, asset_qty: Option<i64> },
    Price { id: i64, cents: i64 },
    Promote { id: i64, cents: Vec<i64> },
    Push { id: i64, cents: i64, qty: i64 },
    Order { cents: Vec<i64> },
}

fn cents() -> impl Strategy<Value = i64> {
    0i64..10_000
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let id = 0i64..5;

    prop_oneof![
        (id.clone(), prop::option::of(0i64..20)).prop_map(|(id, qty)| Op::Update { id, qty }),
        (id.clone(), prop::option::of(-2i64..6))
            .prop_map(|(id, asset_qty)| Op::Asset { id, asset_qty }),
        (id.clone(), cents()).prop_map(|(id, cents)| Op::Price { id, cents }),
        (id.clone(), prop::collection::vec(cents(), 0..3))
            .prop_map(|(id, cents)| Op::Promote { id, cents }),
        (id, cents(), 1i64..10).prop_map(|(id, cents, qty)| Op::Push { id, cents, qty }),
        prop::collection::vec(cents(), 0..3).prop_map(|cents| Op::Order { cents }),
    ]
}

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn promotions(cents: &[i64]) -> Vec<Promotion> {
    cents
        .iter()
        .zip(1i64..)
        .map(|(cents, id)| Promotion::new(id, "Promo", money(*cents)))
        .collect()
}

fn apply(cart: &mut Cart<&MemoryStorage>, op: &Op) {
    match op {
        Op::Update { id, qty } => {
            cart.update_item_with(*id, qty.map(Decimal::from), || {
                ItemDraft::new("Item", money(999))
            });
        }
        Op::Asset { id, asset_qty } => {
            cart.update_asset_item_with(*id, asset_qty.map(Decimal::from), || {
                ItemDraft::new("Asset", money(500))
            });
        }
        Op::Price { id, cents } => {
            cart.update_price(*id, money(*cents));
        }
        Op::Promote { id, cents } => {
            cart.set_item_promotions(*id, promotions(cents));
        }
        Op::Push { id, cents, qty } => {
            cart.push_item(CartItem::new(*id, "Pushed", money(*cents), Decimal::from(*qty)));
        }
        Op::Order { cents } => cart.set_promotions(promotions(cents)),
    }
}

proptest! {
    #[test]
    fn derived_fields_hold_after_any_mutations(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let storage = MemoryStorage::new();
        let mut cart = Cart::new("USD", "en", &storage);

        for op in &ops {
            apply(&mut cart, op);
        }

        for item in cart.items() {
            let multiplier = item.asset_qty.unwrap_or(Decimal::ONE);
            let discount: Decimal = item.promotions.iter().map(|promotion| promotion.amount).sum();

            prop_assert_eq!(item.subtotal, item.price * item.qty * multiplier);
            prop_assert_eq!(item.discount, discount);
        }

        let lines: Decimal = cart.items().iter().map(|item| item.subtotal - item.discount).sum();
        let order: Decimal = cart.promotions().iter().map(|promotion| promotion.amount).sum();

        prop_assert_eq!(cart.total_amount(), lines - order);
    }

    #[test]
    fn push_item_never_duplicates_ids(ids in prop::collection::vec(0i64..6, 0..30)) {
        let storage = MemoryStorage::new();
        let mut cart = Cart::new("USD", "en", &storage);

        for id in &ids {
            cart.push_item(CartItem::new(*id, "Item", Decimal::ONE, Decimal::ONE));
        }

        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();

        prop_assert_eq!(cart.lines(), unique.len());
    }

    #[test]
    fn identifier_separates_owner_kinds(id in any::<i64>()) {
        let storage = MemoryStorage::new();
        let mut customer = Cart::new("USD", "en", &storage);
        let mut supplier = Cart::new("USD", "en", &storage);

        customer.set_owner(Some(CartOwner::customer(id)));
        supplier.set_owner(Some(CartOwner::supplier(id)));

        prop_assert_ne!(customer.identifier(), supplier.identifier());
    }
}
