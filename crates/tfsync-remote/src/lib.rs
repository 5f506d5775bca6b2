//! tfsync Remote - access to hosted transformations and libraries
//!
//! - [`TransformationStore`]: async store trait (mockable with the `mock` feature)
//! - [`HttpTransformationStore`]: reqwest implementation
//! - [`types`]: camelCase wire types shared by both

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod http;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use http::{HttpStoreConfig, HttpTransformationStore};
#[cfg(feature = "mock")]
pub use store::MockTransformationStore;
pub use store::TransformationStore;
pub use types::*;
