//! Derived monetary summary of a financial document.

use crate::models::{LineItem, Payment};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Totals attached to every financial document. Always a pure function of
/// (line items, tax rate, payments); any mutation to any input rebuilds the
/// whole object via [`calculate_totals`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub balance: Decimal,
}

/// Compute totals from scratch. Line amounts are re-derived from
/// `quantity * unit_price`, never read from the stored `amount`. The balance
/// clamps at zero on overpayment; `amount_paid` stays unclamped so the
/// overpaid figure remains visible.
pub fn calculate_totals(
    line_items: &[LineItem],
    tax_rate: Decimal,
    payments: &[Payment],
) -> DocumentTotals {
    let mut subtotal = Decimal::ZERO;
    let mut taxable_amount = Decimal::ZERO;
    for item in line_items {
        let amount = item.quantity * item.unit_price;
        subtotal += amount;
        if item.taxable {
            taxable_amount += amount;
        }
    }

    let tax_amount = taxable_amount * tax_rate / Decimal::ONE_HUNDRED;
    let total = subtotal + tax_amount;

    let amount_paid: Decimal = payments.iter().map(|p| p.amount).sum();
    let balance = (total - amount_paid).max(Decimal::ZERO);

    DocumentTotals {
        subtotal,
        taxable_amount,
        tax_amount,
        total,
        amount_paid,
        balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateLineItem;

    fn item(quantity: i64, unit_price: i64, taxable: bool) -> LineItem {
        let mut input = CreateLineItem::new("test", quantity.into(), unit_price.into());
        input.taxable = Some(taxable);
        LineItem::from_input(&input, 0)
    }

    #[test]
    fn splits_taxable_and_non_taxable_amounts() {
        let items = vec![item(2, 50, true), item(1, 100, false)];
        let totals = calculate_totals(&items, Decimal::from(6), &[]);

        assert_eq!(totals.subtotal, Decimal::from(200));
        assert_eq!(totals.taxable_amount, Decimal::from(100));
        assert_eq!(totals.tax_amount, Decimal::from(6));
        assert_eq!(totals.total, Decimal::from(206));
        assert_eq!(totals.balance, Decimal::from(206));
    }

    #[test]
    fn ignores_stale_stored_amounts() {
        let mut stale = item(3, 10, true);
        stale.amount = Decimal::from(9999);
        let totals = calculate_totals(&[stale], Decimal::ZERO, &[]);
        assert_eq!(totals.subtotal, Decimal::from(30));
    }

    #[test]
    fn identical_inputs_yield_identical_totals() {
        let items = vec![item(7, 13, true), item(1, 2, false)];
        let rate = Decimal::new(825, 2);
        assert_eq!(
            calculate_totals(&items, rate, &[]),
            calculate_totals(&items, rate, &[])
        );
    }

    #[test]
    fn empty_inputs_yield_zero_totals() {
        assert_eq!(
            calculate_totals(&[], Decimal::from(6), &[]),
            DocumentTotals::default()
        );
    }
}
