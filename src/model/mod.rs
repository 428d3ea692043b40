mod customer;
mod entry;
mod payment;

pub use customer::{Customer, CustomerId, NewCustomer};
pub use entry::{Entry, EntryId, ExtraLine, MilkLine, MilkType, NewEntry};
pub use payment::{NewPayment, Payment, PaymentId};
