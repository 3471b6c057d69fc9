//! Pricing

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso};

use crate::{items::CartItem, promotions::Promotion};

/// Calculates a line subtotal, `price * qty * asset_qty` with a missing asset qty counting as one.
pub fn line_subtotal(price: Decimal, qty: Decimal, asset_qty: Option<Decimal>) -> Decimal {
    price * qty * asset_qty.unwrap_or(Decimal::ONE)
}

/// Calculates the amount payable for a list of items and order-level promotions.
///
/// Every item contributes its subtotal less its own discount; order-level
/// promotions are then taken off the sum.
pub fn total_amount(items: &[CartItem], promotions: &[Promotion]) -> Decimal {
    let lines: Decimal = items.iter().map(|item| item.subtotal - item.discount).sum();

    lines - crate::promotions::total_amount(promotions)
}

/// Looks up the symbol of an ISO currency code.
pub fn currency_symbol(currency_code: &str) -> Option<&'static str> {
    iso::find(currency_code).map(|currency| currency.symbol)
}

/// Formats an amount in the given currency.
///
/// Known ISO currencies are rendered through [`Money`]; anything else falls
/// back to the amount with two decimal places followed by the code.
pub fn format_money(amount: Decimal, currency_code: &str) -> String {
    let Some(currency) = iso::find(currency_code) else {
        return format!(
            "{} {currency_code}",
            amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        );
    };

    to_minor_units(amount, currency.exponent).map_or_else(
        || format!("{amount} {currency_code}"),
        |minor| Money::from_minor(minor, currency).to_string(),
    )
}

fn to_minor_units(amount: Decimal, exponent: u32) -> Option<i64> {
    let mut scaled =
        amount.round_dp_with_strategy(exponent, RoundingStrategy::MidpointAwayFromZero);
    scaled.rescale(exponent);

    i64::try_from(scaled.mantissa()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_subtotal_defaults_asset_qty_to_one() {
        let price = Decimal::from(10);

        assert_eq!(line_subtotal(price, Decimal::from(2), None), Decimal::from(20));
        assert_eq!(
            line_subtotal(price, Decimal::from(2), Some(Decimal::from(3))),
            Decimal::from(60)
        );
    }

    #[test]
    fn total_amount_takes_off_item_and_order_discounts() {
        let mut first = CartItem::new(1, "Widget", Decimal::from(10), Decimal::from(2));
        first.promotions.push(Promotion::new(1, "Item", Decimal::from(3)));
        first.recompute();

        let second = CartItem::new(2, "Gadget", Decimal::from(5), Decimal::ONE).recomputed();
        let order = [Promotion::new(9, "Order", Decimal::from(2))];

        // (20 - 3) + 5 - 2
        assert_eq!(total_amount(&[first, second], &order), Decimal::from(20));
    }

    #[test]
    fn to_minor_units_rounds_half_away_from_zero() {
        assert_eq!(to_minor_units(Decimal::new(12345, 3), 2), Some(1235));
        assert_eq!(to_minor_units(Decimal::from(24), 2), Some(2400));
        assert_eq!(to_minor_units(Decimal::from(7), 0), Some(7));
    }

    #[test]
    fn format_money_uses_iso_currency() {
        let formatted = format_money(Decimal::from(24), "USD");

        assert!(formatted.contains("24.00"), "unexpected format {formatted}");
        assert!(formatted.contains('$'), "unexpected format {formatted}");
    }

    #[test]
    fn format_money_falls_back_for_unknown_currency() {
        assert_eq!(format_money(Decimal::new(1005, 3), "XYZ1"), "1.01 XYZ1");
    }

    #[test]
    fn currency_symbol_lookup() {
        assert_eq!(currency_symbol("USD"), Some("$"));
        assert_eq!(currency_symbol("NOPE"), None);
    }
}
