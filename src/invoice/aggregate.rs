use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{DairyError, Result};
use crate::model::{CustomerId, Entry, MilkType, Payment};
use crate::period::Month;
use crate::store::RecordStore;

/// Accumulated deliveries of one milk type over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilkTotals {
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
    /// Rate of the last line seen for this type, in date order.
    pub representative_rate: Decimal,
}

/// Billing totals for one customer over a date window.
///
/// Map keys keep the order in which they were first seen while scanning
/// entries by ascending date, which fixes invoice row order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PeriodSummary {
    pub milk: IndexMap<MilkType, MilkTotals>,
    /// Extra item name to the sum of its rates.
    pub extras: IndexMap<String, Decimal>,
    /// Sum of the stored entry totals, as charged at creation.
    pub total_charges: Decimal,
    pub total_paid: Decimal,
    /// `total_charges - total_paid` for this period only. Unlike the
    /// customer's lifetime due it is not clamped and may be negative.
    pub period_due: Decimal,
}

impl PeriodSummary {
    pub fn extras_total(&self) -> Decimal {
        self.extras
            .values()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
    }
}

fn add(acc: &mut Decimal, value: Decimal) -> Result<()> {
    *acc = acc
        .checked_add(value)
        .ok_or_else(|| DairyError::invalid_amount(value, "period total is out of range"))?;
    Ok(())
}

/// Fold entries and payments into a [`PeriodSummary`].
///
/// Entries are scanned in ascending date order (stable for equal dates)
/// whatever order they are passed in. Sums that leave the range of
/// `Decimal` fail with `InvalidAmount`.
pub fn summarize(entries: &[Entry], payments: &[Payment]) -> Result<PeriodSummary> {
    let mut ordered: Vec<&Entry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.date);

    let mut summary = PeriodSummary::default();

    for entry in ordered {
        for line in &entry.milk {
            let amount = line.amount().ok_or_else(|| {
                DairyError::invalid_amount(line.quantity(), "line amount is out of range")
            })?;
            let totals = summary
                .milk
                .entry(line.milk_type)
                .or_insert_with(|| MilkTotals {
                    total_quantity: Decimal::ZERO,
                    total_amount: Decimal::ZERO,
                    representative_rate: Decimal::ZERO,
                });
            add(&mut totals.total_quantity, line.quantity())?;
            add(&mut totals.total_amount, amount)?;
            totals.representative_rate = line.rate();
        }

        for extra in &entry.extras {
            let sum = summary
                .extras
                .entry(extra.name.clone())
                .or_insert(Decimal::ZERO);
            add(sum, extra.charge())?;
        }

        add(&mut summary.total_charges, entry.total)?;
    }

    for payment in payments {
        add(&mut summary.total_paid, payment.amount)?;
    }
    summary.period_due = summary
        .total_charges
        .checked_sub(summary.total_paid)
        .ok_or_else(|| DairyError::invalid_amount(summary.total_paid, "period due is out of range"))?;
    Ok(summary)
}

/// Reads a customer's records for a window and summarizes them.
pub struct PeriodAggregator<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> PeriodAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Entries and payments of `month`, each in ascending date order.
    pub fn records(&self, customer: CustomerId, month: Month) -> Result<(Vec<Entry>, Vec<Payment>)> {
        if self.store.customer(customer)?.is_none() {
            return Err(DairyError::CustomerNotFound(customer.to_string()));
        }
        let entries = self
            .store
            .entries_between(customer, month.start(), month.end())?;
        let payments = self
            .store
            .payments_between(customer, month.start(), month.end())?;
        Ok((entries, payments))
    }

    pub fn aggregate(&self, customer: CustomerId, month: Month) -> Result<PeriodSummary> {
        let (entries, payments) = self.records(customer, month)?;
        summarize(&entries, &payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryId, ExtraLine, MilkLine, PaymentId};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn entry(date: NaiveDate, milk: Vec<MilkLine>, extras: Vec<ExtraLine>) -> Entry {
        let total = crate::ledger::entry_total(&milk, &extras).unwrap();
        Entry {
            id: EntryId(Uuid::new_v4()),
            customer_id: CustomerId::new(),
            date,
            milk,
            extras,
            total,
            created_at: Utc::now(),
        }
    }

    fn payment(amount: Decimal) -> Payment {
        Payment {
            id: PaymentId(Uuid::new_v4()),
            customer_id: CustomerId::new(),
            date: day(10),
            amount,
            method: None,
            reference: None,
        }
    }

    #[test]
    fn same_type_accumulates_into_one_row() {
        let entries = vec![
            entry(day(1), vec![MilkLine::new(MilkType::Cow, dec!(5), dec!(50))], vec![]),
            entry(day(5), vec![MilkLine::new(MilkType::Cow, dec!(3), dec!(50))], vec![]),
        ];
        let summary = summarize(&entries, &[]).unwrap();

        assert_eq!(summary.milk.len(), 1);
        let cow = &summary.milk[&MilkType::Cow];
        assert_eq!(cow.total_quantity, dec!(8));
        assert_eq!(cow.total_amount, dec!(400));
        assert_eq!(cow.representative_rate, dec!(50));
        assert_eq!(summary.total_charges, dec!(400));
    }

    #[test]
    fn last_rate_in_date_order_wins() {
        // Passed out of order on purpose.
        let entries = vec![
            entry(day(9), vec![MilkLine::new(MilkType::Buffalo, dec!(1), dec!(70))], vec![]),
            entry(day(2), vec![MilkLine::new(MilkType::Buffalo, dec!(2), dec!(60))], vec![]),
        ];
        let summary = summarize(&entries, &[]).unwrap();

        let buffalo = &summary.milk[&MilkType::Buffalo];
        assert_eq!(buffalo.representative_rate, dec!(70));
        assert_eq!(buffalo.total_amount, dec!(190));
    }

    #[test]
    fn keys_follow_first_seen_order() {
        let entries = vec![
            entry(
                day(1),
                vec![MilkLine::new(MilkType::Buffalo, dec!(1), dec!(60))],
                vec![ExtraLine::new("paneer", dec!(30))],
            ),
            entry(
                day(2),
                vec![MilkLine::new(MilkType::Cow, dec!(1), dec!(50))],
                vec![ExtraLine::new("ghee", dec!(100)), ExtraLine::new("paneer", dec!(30))],
            ),
        ];
        let summary = summarize(&entries, &[]).unwrap();

        let milk: Vec<_> = summary.milk.keys().copied().collect();
        assert_eq!(milk, vec![MilkType::Buffalo, MilkType::Cow]);
        let extras: Vec<_> = summary.extras.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(extras, vec![("paneer", dec!(60)), ("ghee", dec!(100))]);
        assert_eq!(summary.extras_total(), dec!(160));
    }

    #[test]
    fn charges_come_from_stored_totals() {
        let mut edited = entry(day(3), vec![MilkLine::new(MilkType::Cow, dec!(2), dec!(50))], vec![]);
        edited.total = dec!(90);
        let summary = summarize(&[edited], &[payment(dec!(40))]).unwrap();

        assert_eq!(summary.total_charges, dec!(90));
        assert_eq!(summary.milk[&MilkType::Cow].total_amount, dec!(100));
        assert_eq!(summary.total_paid, dec!(40));
        assert_eq!(summary.period_due, dec!(50));
    }

    #[test]
    fn period_due_may_go_negative() {
        let entries = vec![entry(day(1), vec![], vec![ExtraLine::new("curd", dec!(20))])];
        let summary = summarize(&entries, &[payment(dec!(50))]).unwrap();
        assert_eq!(summary.period_due, dec!(-30));
    }

    #[test]
    fn empty_period_is_all_zero() {
        let summary = summarize(&[], &[]).unwrap();
        assert!(summary.milk.is_empty());
        assert!(summary.extras.is_empty());
        assert_eq!(summary.total_charges, Decimal::ZERO);
        assert_eq!(summary.period_due, Decimal::ZERO);
    }

    #[test]
    fn overflowing_payments_are_an_invalid_amount() {
        let err = summarize(&[], &[payment(Decimal::MAX), payment(Decimal::MAX)]).unwrap_err();
        assert!(matches!(err, DairyError::InvalidAmount { .. }));
    }
}
