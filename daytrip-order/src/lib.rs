pub mod booking;
pub mod settlement;

#[cfg(test)]
pub(crate) mod test_support;

pub use booking::{BookingError, BookingService};
pub use settlement::{OrderError, OrderReceipt, PaymentSummary, SettlementService};
