use crate::domain::model::{CampaignMessage, Recipient, Record, SendOutcome, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn api_token(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn page_size(&self) -> usize;
    fn max_records(&self) -> Option<usize>;
    fn request_timeout_seconds(&self) -> u64;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}

/// Delivery channel for campaign blasts. Implementations return one
/// outcome per recipient they were handed.
#[async_trait]
pub trait BulkSender: Send + Sync {
    async fn send_bulk(
        &self,
        recipients: &[Recipient],
        message: &CampaignMessage,
    ) -> Result<Vec<SendOutcome>>;
}
