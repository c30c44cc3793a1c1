use crate::core::resolve::resolve_str;
use crate::domain::model::{
    CampaignMessage, CampaignOutcome, CampaignResult, Recipient, Record, TargetAudience,
};
use crate::domain::ports::BulkSender;
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Turns matched waitlist records into recipients. Records without a
/// usable email cannot be delivered to and are skipped with a warning.
pub fn build_recipients(matched: &[&Record]) -> Vec<Recipient> {
    let mut recipients = Vec::with_capacity(matched.len());
    let mut skipped = 0usize;

    for record in matched {
        let email = resolve_str(record, "email").map(str::trim).unwrap_or("");
        if email.is_empty() {
            skipped += 1;
            continue;
        }
        recipients.push(Recipient {
            email: email.to_string(),
            first_name: resolve_str(record, "firstName").unwrap_or("").to_string(),
            city: resolve_str(record, "city").unwrap_or("").to_string(),
            role: resolve_str(record, "role").unwrap_or("").to_string(),
        });
    }

    if skipped > 0 {
        tracing::warn!("⚠️ Skipped {} matched users without an email address", skipped);
    }

    recipients
}

/// Selects the audience, builds recipients and hands them to the sender.
/// A campaign that ends up with nobody to send to reports `NoRecipients`
/// and never touches the sender.
pub async fn run_campaign<M: BulkSender>(
    sender: &M,
    waitlist: &[Record],
    audience: &TargetAudience,
    message: &CampaignMessage,
) -> Result<CampaignOutcome> {
    let matched = audience.select(waitlist);
    tracing::info!(
        "🎯 Audience matched {} of {} waitlist users",
        matched.len(),
        waitlist.len()
    );

    let recipients = build_recipients(&matched);
    if recipients.is_empty() {
        tracing::warn!("📭 No recipients match the target audience");
        return Ok(CampaignOutcome::NoRecipients);
    }

    let outcomes = sender.send_bulk(&recipients, message).await?;
    let total = recipients.len();
    let sent = outcomes.iter().filter(|outcome| outcome.result.success).count();
    let failed = total - sent;

    tracing::info!("📨 Campaign delivered: {}/{} sent, {} failed", sent, total, failed);

    Ok(CampaignOutcome::Sent(CampaignResult {
        total,
        sent,
        failed,
        results: outcomes,
    }))
}

#[derive(Serialize)]
struct BlastPayload<'a> {
    recipients: &'a [Recipient],
    #[serde(flatten)]
    message: &'a CampaignMessage,
}

/// 將整批收件人一次 POST 給平台的通知服務，由它處理逐封寄送
pub struct HttpBulkSender {
    client: Client,
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpBulkSender {
    pub fn new(endpoint: String, token: Option<String>, timeout_seconds: u64) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            token,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

#[async_trait]
impl BulkSender for HttpBulkSender {
    async fn send_bulk(
        &self,
        recipients: &[Recipient],
        message: &CampaignMessage,
    ) -> Result<Vec<crate::domain::model::SendOutcome>> {
        tracing::debug!(
            "Posting campaign blast for {} recipients to {}",
            recipients.len(),
            self.endpoint
        );

        let payload = BlastPayload {
            recipients,
            message,
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&payload);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        tracing::debug!("Notify service response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ReportError::ProcessingError {
                message: format!("Bulk send failed with status: {}", response.status()),
            });
        }

        let outcomes = response.json().await?;
        Ok(outcomes)
    }
}
