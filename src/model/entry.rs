use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::CustomerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilkType {
    Cow,
    Buffalo,
}

impl fmt::Display for MilkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MilkType::Cow => write!(f, "cow"),
            MilkType::Buffalo => write!(f, "buffalo"),
        }
    }
}

impl FromStr for MilkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cow" => Ok(MilkType::Cow),
            "buffalo" => Ok(MilkType::Buffalo),
            other => Err(format!("unknown milk type '{other}' (expected cow or buffalo)")),
        }
    }
}

/// One milk delivery line. Missing quantity or rate charges nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MilkLine {
    #[serde(rename = "type")]
    pub milk_type: MilkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<Decimal>,
    #[serde(default, rename = "ratePerLitre", skip_serializing_if = "Option::is_none")]
    pub rate_per_litre: Option<Decimal>,
}

impl MilkLine {
    pub fn new(milk_type: MilkType, qty: Decimal, rate_per_litre: Decimal) -> Self {
        Self {
            milk_type,
            qty: Some(qty),
            rate_per_litre: Some(rate_per_litre),
        }
    }

    pub fn quantity(&self) -> Decimal {
        self.qty.unwrap_or(Decimal::ZERO)
    }

    pub fn rate(&self) -> Decimal {
        self.rate_per_litre.unwrap_or(Decimal::ZERO)
    }

    /// `quantity × rate`, or `None` if the product overflows.
    pub fn amount(&self) -> Option<Decimal> {
        self.quantity().checked_mul(self.rate())
    }
}

/// An extra item (paneer, ghee, ...). Its charge is `rate` alone;
/// `qty` is recorded for reference only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtraLine {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
}

impl ExtraLine {
    pub fn new(name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            name: name.into(),
            qty: None,
            rate: Some(rate),
        }
    }

    pub fn charge(&self) -> Decimal {
        self.rate.unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub customer_id: CustomerId,
    pub date: NaiveDate,
    #[serde(default)]
    pub milk: Vec<MilkLine>,
    #[serde(default)]
    pub extras: Vec<ExtraLine>,
    /// Charge computed once at creation; never recomputed from the lines.
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Delivery payload as accepted at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub milk: Vec<MilkLine>,
    #[serde(default)]
    pub extras: Vec<ExtraLine>,
}

impl NewEntry {
    /// Reject negative quantities and rates; absent values are fine.
    pub fn validate(&self) -> crate::error::Result<()> {
        let milk = self
            .milk
            .iter()
            .flat_map(|m| [m.qty, m.rate_per_litre]);
        let extras = self.extras.iter().flat_map(|x| [x.qty, x.rate]);
        match milk.chain(extras).flatten().find(|v| *v < Decimal::ZERO) {
            Some(value) => Err(crate::error::DairyError::invalid_amount(
                value,
                "quantities and rates cannot be negative",
            )),
            None => Ok(()),
        }
    }
}
