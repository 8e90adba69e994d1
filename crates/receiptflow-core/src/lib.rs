//! Annotation export decoding and date/merchant grouping for receiptflow.

mod error;
pub mod grouping;
pub mod normalize;
pub mod payload;
pub mod schema;

pub use error::PayloadError;
pub use grouping::{GroupedTransactions, ItemRecord, MerchantGroups};
pub use normalize::{normalize, normalize_str, normalize_value};
pub use payload::{ExportPayload, ItemField, UNKNOWN_STORE};
pub use schema::items;
