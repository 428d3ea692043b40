use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{DairyError, Result};
use crate::model::{ExtraLine, MilkLine};

const MONEY_DP: u32 = 2;

/// Round half-up to two decimal places.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Charge for one delivery: litres times rate for each milk line, plus the
/// rate of each extra. Rounded once, on the final sum.
///
/// Fails with `InvalidAmount` when a line or the sum leaves the range of
/// `Decimal`.
pub fn entry_total(milk: &[MilkLine], extras: &[ExtraLine]) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    for line in milk {
        let amount = line
            .amount()
            .ok_or_else(|| out_of_range(line.quantity()))?;
        total = total.checked_add(amount).ok_or_else(|| out_of_range(amount))?;
    }
    for extra in extras {
        let charge = extra.charge();
        total = total.checked_add(charge).ok_or_else(|| out_of_range(charge))?;
    }
    Ok(round_money(total))
}

fn out_of_range(value: Decimal) -> DairyError {
    DairyError::invalid_amount(value, "entry total is out of range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MilkType;
    use rust_decimal_macros::dec;

    #[test]
    fn milk_and_extras_are_summed() {
        let milk = vec![
            MilkLine::new(MilkType::Cow, dec!(10), dec!(50)),
            MilkLine::new(MilkType::Buffalo, dec!(2), dec!(65)),
        ];
        let extras = vec![ExtraLine::new("cleaning", dec!(20))];
        assert_eq!(entry_total(&milk, &extras).unwrap(), dec!(650));
    }

    #[test]
    fn extra_quantity_does_not_scale_the_charge() {
        let extras = vec![ExtraLine {
            name: "paneer".into(),
            qty: Some(dec!(3)),
            rate: Some(dec!(30)),
        }];
        assert_eq!(entry_total(&[], &extras).unwrap(), dec!(30));
    }

    #[test]
    fn missing_fields_charge_zero() {
        let milk = vec![
            MilkLine {
                milk_type: MilkType::Cow,
                qty: None,
                rate_per_litre: Some(dec!(50)),
            },
            MilkLine {
                milk_type: MilkType::Buffalo,
                qty: Some(dec!(4)),
                rate_per_litre: None,
            },
        ];
        let extras = vec![ExtraLine {
            name: "ghee".into(),
            qty: Some(dec!(1)),
            rate: None,
        }];
        assert_eq!(entry_total(&milk, &extras).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn rounding_happens_once_on_the_sum() {
        // 0.0025 per line rounds to zero alone; the 0.005 sum rounds up.
        let milk = vec![
            MilkLine::new(MilkType::Cow, dec!(0.001), dec!(2.5)),
            MilkLine::new(MilkType::Cow, dec!(0.001), dec!(2.5)),
        ];
        assert_eq!(entry_total(&milk, &[]).unwrap(), dec!(0.01));

        let half = vec![MilkLine::new(MilkType::Cow, dec!(1), dec!(0.125))];
        assert_eq!(entry_total(&half, &[]).unwrap(), dec!(0.13));
    }

    #[test]
    fn empty_entry_is_zero() {
        assert_eq!(entry_total(&[], &[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn oversized_quantity_is_an_invalid_amount() {
        let milk = vec![MilkLine::new(MilkType::Cow, Decimal::MAX, dec!(2))];
        let err = entry_total(&milk, &[]).unwrap_err();
        assert!(matches!(err, DairyError::InvalidAmount { .. }));
    }

    #[test]
    fn overflowing_sum_is_an_invalid_amount() {
        let milk = vec![MilkLine::new(MilkType::Cow, Decimal::MAX, dec!(1))];
        let extras = vec![ExtraLine::new("ghee", Decimal::MAX)];
        let err = entry_total(&milk, &extras).unwrap_err();
        assert!(matches!(err, DairyError::InvalidAmount { .. }));
    }
}
