pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_collection_name, validate_path, validate_range, validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "doorbel-reports")]
#[command(about = "Export DoorBel admin collections as dated CSV reports")]
pub struct CliConfig {
    #[arg(long, default_value = "https://api.doorbel.app/v1")]
    pub api_base_url: String,

    /// Bearer token for the admin API; falls back to DOORBEL_API_TOKEN
    #[arg(long)]
    pub api_token: Option<String>,

    /// Collection to export: orders, riders, transactions, kyc, tickets, waitlist
    #[arg(long, default_value = "orders")]
    pub collection: String,

    #[arg(long, default_value = "./exports")]
    pub output_path: String,

    #[arg(long, default_value = "200")]
    pub page_size: usize,

    /// Stop fetching after this many records
    #[arg(long)]
    pub max_records: Option<usize>,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log system resource usage between phases")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 沒給 --api-token 時改讀環境變數，讓排程不用把密鑰寫進命令列
    pub fn resolve_token_from_env(&mut self) {
        if self.api_token.is_none() {
            self.api_token = std::env::var("DOORBEL_API_TOKEN").ok();
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_base_url", &self.api_base_url)?;
        validate_path("output_path", &self.output_path)?;
        validate_collection_name("collection", &self.collection)?;
        validate_range("page_size", self.page_size, 1, 500)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn max_records(&self) -> Option<usize> {
        self.max_records
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}
