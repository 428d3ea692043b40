mod due;
mod total;

pub use due::DueLedger;
pub use total::{entry_total, round_money};
