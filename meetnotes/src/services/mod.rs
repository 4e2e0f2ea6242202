mod delivery;
mod summary;

pub use delivery::{DeliveryService, DEFAULT_SUBJECT, REQUIRED_FIELDS_MESSAGE};
pub use summary::{SummaryService, NO_SUMMARY_PLACEHOLDER};
