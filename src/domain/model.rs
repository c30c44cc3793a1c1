use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One document fetched from the admin API, kept as raw JSON fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn from_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            data: object.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub processed_records: Vec<Record>,
    pub csv_output: String,
    pub row_count: usize,
}

/// The admin collections that can be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Orders,
    Riders,
    Transactions,
    Kyc,
    Tickets,
    Waitlist,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Orders,
        Collection::Riders,
        Collection::Transactions,
        Collection::Kyc,
        Collection::Tickets,
        Collection::Waitlist,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "orders" => Some(Collection::Orders),
            "riders" => Some(Collection::Riders),
            "transactions" => Some(Collection::Transactions),
            "kyc" => Some(Collection::Kyc),
            "tickets" => Some(Collection::Tickets),
            "waitlist" => Some(Collection::Waitlist),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Orders => "orders",
            Collection::Riders => "riders",
            Collection::Transactions => "transactions",
            Collection::Kyc => "kyc",
            Collection::Tickets => "tickets",
            Collection::Waitlist => "waitlist",
        }
    }

    /// Path under the API base URL that serves this collection.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            Collection::Orders => "orders",
            Collection::Riders => "riders",
            Collection::Transactions => "transactions",
            Collection::Kyc => "kyc/applications",
            Collection::Tickets => "support/tickets",
            Collection::Waitlist => "waitlist/users",
        }
    }

    /// Stem of the export filename; the date and extension get appended.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Collection::Orders => "doorbel_orders",
            Collection::Riders => "doorbel_riders",
            Collection::Transactions => "doorbel_transactions",
            Collection::Kyc => "doorbel_kyc",
            Collection::Tickets => "doorbel_tickets",
            Collection::Waitlist => "doorbel_waitlist",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a campaign goes to. An omitted or empty dimension places no
/// constraint; a populated one requires membership.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetAudience {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<String>>,
}

/// One group produced by an aggregation run. Lives only for the duration
/// of the call that built it.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationBucket {
    pub key: String,
    pub count: usize,
    pub derived_counts: HashMap<String, usize>,
}

impl AggregationBucket {
    pub fn derived(&self, name: &str) -> usize {
        self.derived_counts.get(name).copied().unwrap_or(0)
    }

    /// Share of this bucket matching a derived predicate. Zero-member
    /// buckets rate as 0.0 rather than dividing by zero.
    pub fn rate(&self, name: &str) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.derived(name) as f64 / self.count as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    pub city: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendReceipt {
    pub success: bool,
    #[serde(
        rename = "messageId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOutcome {
    pub recipient: Recipient,
    pub result: SendReceipt,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignResult {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<SendOutcome>,
}

/// Message content for a campaign blast. Either free-form subject/content
/// or a pre-registered template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        rename = "templateId",
        alias = "template_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub template_id: Option<String>,
}

/// A campaign that matched nobody is a distinct outcome, not an error.
#[derive(Debug)]
pub enum CampaignOutcome {
    NoRecipients,
    Sent(CampaignResult),
}
