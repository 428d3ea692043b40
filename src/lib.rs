pub mod billing;
pub mod config;
pub mod error;
pub mod invoice;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod notify;
pub mod payload;
pub mod pdf;
pub mod period;
pub mod store;

pub use billing::{Billing, MonthStatement, RecordedEntry, RecordedPayment};
pub use config::{Config, Dairy, InvoiceSettings};
pub use error::{DairyError, ErrorKind, Result};
pub use invoice::{InvoiceDocument, PeriodSummary};
pub use ledger::{entry_total, DueLedger};
pub use period::Month;
pub use store::{FileStore, MemoryStore, RecordStore};
