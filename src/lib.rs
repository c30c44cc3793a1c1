pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{cli::LocalStorage, CliConfig};

pub use crate::config::toml_config::ReportConfig;
pub use crate::core::{
    aggregate::{GroupKey, GroupSpec},
    campaign::{run_campaign, HttpBulkSender},
    engine::ReportEngine,
    export::CsvExporter,
    pipeline::ExportPipeline,
    stats::{waitlist_summary, CampaignStats},
};
pub use crate::domain::model::{CampaignOutcome, Collection, Record, TargetAudience};
pub use crate::utils::error::{ReportError, Result};
