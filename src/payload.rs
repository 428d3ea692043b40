//! Entry payloads from the command line: `--milk cow:10@50`,
//! `--extra paneer:1@30`, or a JSON file in the wire shape.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DairyError, Result};
use crate::model::{ExtraLine, MilkLine, MilkType, NewEntry};

fn parse_amount(raw: &str) -> Result<Option<Decimal>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value = Decimal::from_str(raw)
        .map_err(|_| DairyError::invalid_amount(raw, "must be a number"))?;
    if value < Decimal::ZERO {
        return Err(DairyError::invalid_amount(raw, "cannot be negative"));
    }
    Ok(Some(value))
}

/// Split `QTY@RATE`; either side may be empty.
fn parse_qty_rate(raw: &str) -> Result<(Option<Decimal>, Option<Decimal>)> {
    match raw.split_once('@') {
        Some((qty, rate)) => Ok((parse_amount(qty)?, parse_amount(rate)?)),
        None => Ok((parse_amount(raw)?, None)),
    }
}

/// `TYPE[:QTY][@RATE]`, e.g. `cow:10@50`. Missing numbers charge zero.
pub fn parse_milk_arg(input: &str) -> Result<MilkLine> {
    let (kind, numbers) = split_label(input);
    let milk_type = MilkType::from_str(kind).map_err(|reason| DairyError::InvalidLine {
        input: input.to_string(),
        reason,
    })?;
    let (qty, rate_per_litre) = parse_qty_rate(numbers)?;
    Ok(MilkLine {
        milk_type,
        qty,
        rate_per_litre,
    })
}

/// Split `LABEL[:QTY][@RATE]` into the label and the numeric tail.
fn split_label(input: &str) -> (&str, &str) {
    let end = input.find([':', '@']).unwrap_or(input.len());
    let rest = &input[end..];
    (input[..end].trim(), rest.strip_prefix(':').unwrap_or(rest))
}

/// `NAME[:QTY][@RATE]`, e.g. `paneer:1@30`. Only the rate is charged.
pub fn parse_extra_arg(input: &str) -> Result<ExtraLine> {
    let (name, numbers) = split_label(input);
    if name.is_empty() {
        return Err(DairyError::InvalidLine {
            input: input.to_string(),
            reason: "extra item needs a name".to_string(),
        });
    }
    let (qty, rate) = parse_qty_rate(numbers)?;
    Ok(ExtraLine {
        name: name.to_string(),
        qty,
        rate,
    })
}

/// Read a JSON entry payload:
/// `{"date": "2026-03-01", "milk": [{"type": "cow", "qty": 10, "ratePerLitre": 50}], "extras": [...]}`
pub fn load_entry_payload(path: &Path) -> Result<NewEntry> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| DairyError::PayloadParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn full_milk_shorthand() {
        let line = parse_milk_arg("cow:10@50").unwrap();
        assert_eq!(line, MilkLine::new(MilkType::Cow, dec!(10), dec!(50)));
    }

    #[test]
    fn partial_milk_shorthand_leaves_gaps() {
        let line = parse_milk_arg("buffalo:4").unwrap();
        assert_eq!(line.qty, Some(dec!(4)));
        assert_eq!(line.rate_per_litre, None);

        let line = parse_milk_arg("cow@55").unwrap();
        assert_eq!(line.qty, None);
        assert_eq!(line.rate_per_litre, Some(dec!(55)));

        let line = parse_milk_arg("cow").unwrap();
        assert_eq!(line.amount(), Some(Decimal::ZERO));
    }

    #[test]
    fn unknown_milk_type_is_a_validation_error() {
        let err = parse_milk_arg("goat:1@40").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn garbage_number_is_an_invalid_amount() {
        let err = parse_milk_arg("cow:ten@50").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidAmount);
        let err = parse_extra_arg("ghee@-5").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidAmount);
    }

    #[test]
    fn extra_shorthand() {
        let line = parse_extra_arg("paneer:2@30").unwrap();
        assert_eq!(line.name, "paneer");
        assert_eq!(line.qty, Some(dec!(2)));
        assert_eq!(line.charge(), dec!(30));

        let line = parse_extra_arg("cleaning@20").unwrap();
        assert_eq!(line.qty, None);
        assert_eq!(line.charge(), dec!(20));

        assert!(parse_extra_arg("@20").is_err());
    }

    #[test]
    fn json_payload_tolerates_missing_numbers() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("entry.json");
        fs::write(
            &path,
            r#"{"date": "2026-03-04", "milk": [{"type": "cow", "qty": 2}], "extras": [{"name": "curd", "rate": 15.5}]}"#,
        )
        .unwrap();

        let entry = load_entry_payload(&path).unwrap();
        assert_eq!(entry.milk[0].rate_per_litre, None);
        assert_eq!(entry.extras[0].charge(), dec!(15.5));
    }
}
