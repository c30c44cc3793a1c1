pub mod aggregate;
pub mod audience;
pub mod campaign;
pub mod columns;
pub mod engine;
pub mod export;
pub mod format;
pub mod pipeline;
pub mod resolve;
pub mod stats;

pub use crate::domain::model::{Collection, Record, TransformResult};
pub use crate::domain::ports::{BulkSender, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
