use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{DairyError, Result};
use crate::model::CustomerId;
use crate::store::RecordStore;

/// Applies charges and payments to a customer's running `due` balance.
///
/// Every change goes through [`RecordStore::update_due`], so concurrent
/// charges and payments on one customer are applied one after another and
/// none is lost.
pub struct DueLedger<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> DueLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// `due += amount`. Returns the balance after the charge.
    pub fn apply_charge(&self, customer: CustomerId, amount: Decimal) -> Result<Decimal> {
        if amount < Decimal::ZERO {
            return Err(DairyError::invalid_amount(amount, "charge cannot be negative"));
        }
        let due = self.store.update_due(customer, &|due| {
            due.checked_add(amount)
                .ok_or_else(|| DairyError::invalid_amount(amount, "balance would be out of range"))
        })?;
        debug!(%customer, %amount, %due, "charge applied");
        Ok(due)
    }

    /// `due = max(due - amount, 0)`. Overpayment is absorbed, never turned
    /// into credit. Returns the balance after the payment.
    pub fn apply_payment(&self, customer: CustomerId, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(DairyError::NonPositivePayment);
        }
        let due = self
            .store
            .update_due(customer, &|due| {
                // due is never negative, so this cannot leave the range.
                Ok(due.saturating_sub(amount).max(Decimal::ZERO))
            })?;
        debug!(%customer, %amount, %due, "payment applied");
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Customer;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn store_with_customer() -> (MemoryStore, CustomerId) {
        let store = MemoryStore::new();
        let customer = Customer {
            id: CustomerId::new(),
            name: "Meena".into(),
            phone: "9000000020".into(),
            created_at: Utc::now(),
            due: Decimal::ZERO,
        };
        let id = customer.id;
        store.insert_customer(customer).unwrap();
        (store, id)
    }

    #[test]
    fn overpayment_clamps_to_zero() {
        let (store, id) = store_with_customer();
        let ledger = DueLedger::new(&store);

        assert_eq!(ledger.apply_charge(id, dec!(500)).unwrap(), dec!(500));
        assert_eq!(ledger.apply_charge(id, dec!(20)).unwrap(), dec!(520));
        assert_eq!(ledger.apply_payment(id, dec!(600)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn non_positive_payment_is_rejected() {
        let (store, id) = store_with_customer();
        let ledger = DueLedger::new(&store);

        for amount in [Decimal::ZERO, dec!(-5)] {
            let err = ledger.apply_payment(id, amount).unwrap_err();
            assert!(matches!(err, DairyError::NonPositivePayment));
        }
    }

    #[test]
    fn negative_charge_is_rejected() {
        let (store, id) = store_with_customer();
        let err = DueLedger::new(&store).apply_charge(id, dec!(-1)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidAmount);
    }

    #[test]
    fn unknown_customer_is_not_found() {
        let store = MemoryStore::new();
        let err = DueLedger::new(&store)
            .apply_charge(CustomerId::new(), dec!(10))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }

    #[test]
    fn overflowing_charge_leaves_due_untouched() {
        let (store, id) = store_with_customer();
        let ledger = DueLedger::new(&store);
        ledger.apply_charge(id, Decimal::MAX).unwrap();

        let err = ledger.apply_charge(id, dec!(1)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidAmount);
        assert_eq!(store.customer(id).unwrap().unwrap().due, Decimal::MAX);
    }
}
