//! Document extraction service client: login, receipt upload, annotation export.

mod config;
mod error;

pub use config::ClientConfig;
pub use error::ClientError;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{DocumentClient, UploadReceipt};
