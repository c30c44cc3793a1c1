use crate::core::format::Column;
use crate::core::ConfigProvider;
use crate::domain::model::{CampaignMessage, Collection, TargetAudience};
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{
    validate_collection_name, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 排程報表任務的 TOML 設定檔
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub job: JobSection,
    pub api: ApiSection,
    pub export: ExportSection,
    pub campaign: Option<CampaignSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSection {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub page_size: Option<usize>,
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSection {
    pub output_path: String,
    pub collections: Vec<String>,
    pub columns: Option<Vec<ColumnSpec>>,
}

/// Custom column from a job file. Uses default stringification; the
/// built-in formatters stay tied to the fixed column sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub path: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSection {
    pub notify_endpoint: Option<String>,
    #[serde(default)]
    pub audience: TargetAudience,
    #[serde(default)]
    pub message: CampaignMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl ReportConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DOORBEL_API_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReportError::ProcessingError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("job.name", &self.job.name)?;
        validate_url("api.base_url", &self.api.base_url)?;
        validate_path("export.output_path", &self.export.output_path)?;

        // 環境變數沒替換成功時佔位符會留在原地
        if let Some(token) = &self.api.token {
            if token.contains("${") {
                return Err(ReportError::MissingConfigError {
                    field: "api.token".to_string(),
                });
            }
        }

        if let Some(page_size) = self.api.page_size {
            validate_range("api.page_size", page_size, 1, 500)?;
        }
        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 600)?;
        }
        if let Some(max_records) = self.api.max_records {
            validate_positive_number("api.max_records", max_records, 1)?;
        }

        if self.export.collections.is_empty() {
            return Err(ReportError::ConfigValidationError {
                field: "export.collections".to_string(),
                message: "At least one collection must be listed".to_string(),
            });
        }
        for name in &self.export.collections {
            validate_collection_name("export.collections", name)?;
        }

        if let Some(columns) = &self.export.columns {
            // 自訂欄位只對單一 collection 的任務有意義
            if self.export.collections.len() != 1 {
                return Err(ReportError::ConfigValidationError {
                    field: "export.columns".to_string(),
                    message: "Custom columns require exactly one collection".to_string(),
                });
            }
            for column in columns {
                validate_non_empty_string("export.columns.path", &column.path)?;
                validate_non_empty_string("export.columns.label", &column.label)?;
            }
        }

        if let Some(campaign) = &self.campaign {
            if let Some(endpoint) = &campaign.notify_endpoint {
                validate_url("campaign.notify_endpoint", endpoint)?;
            }
        }

        Ok(())
    }

    /// 取得要匯出的 collections
    pub fn collections(&self) -> Result<Vec<Collection>> {
        self.export
            .collections
            .iter()
            .map(|name| validate_collection_name("export.collections", name))
            .collect()
    }

    /// 取得自訂欄位（若有）
    pub fn custom_columns(&self) -> Option<Vec<Column>> {
        self.export.columns.as_ref().map(|columns| {
            columns
                .iter()
                .map(|column| Column::new(column.path.clone(), column.label.clone()))
                .collect()
        })
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for ReportConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn api_token(&self) -> Option<&str> {
        self.api.token.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn page_size(&self) -> usize {
        self.api.page_size.unwrap_or(200)
    }

    fn max_records(&self) -> Option<usize> {
        self.api.max_records
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(30)
    }
}

impl Validate for ReportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_report_config() {
        let toml_content = r#"
[job]
name = "nightly-orders"
description = "Nightly orders export"
version = "1.0.0"

[api]
base_url = "https://api.doorbel.app/v1"
page_size = 100

[export]
output_path = "./exports"
collections = ["orders", "riders"]
"#;

        let config = ReportConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.job.name, "nightly-orders");
        assert_eq!(config.api.base_url, "https://api.doorbel.app/v1");
        assert_eq!(config.page_size(), 100);
        assert_eq!(config.request_timeout_seconds(), 30);
        assert_eq!(
            config.collections().unwrap(),
            vec![Collection::Orders, Collection::Riders]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_DOORBEL_TOKEN", "secret-token");

        let toml_content = r#"
[job]
name = "with-token"

[api]
base_url = "https://api.doorbel.app/v1"
token = "${TEST_DOORBEL_TOKEN}"

[export]
output_path = "./exports"
collections = ["orders"]
"#;

        let config = ReportConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.token.as_deref(), Some("secret-token"));
        assert!(config.validate().is_ok());

        std::env::remove_var("TEST_DOORBEL_TOKEN");
    }

    #[test]
    fn test_unresolved_token_placeholder_fails_validation() {
        let toml_content = r#"
[job]
name = "missing-token"

[api]
base_url = "https://api.doorbel.app/v1"
token = "${DEFINITELY_NOT_SET_ANYWHERE_12345}"

[export]
output_path = "./exports"
collections = ["orders"]
"#;

        let config = ReportConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ReportError::MissingConfigError { .. }));
    }

    #[test]
    fn test_unknown_collection_fails_validation() {
        let toml_content = r#"
[job]
name = "bad-collection"

[api]
base_url = "https://api.doorbel.app/v1"

[export]
output_path = "./exports"
collections = ["orders", "payments"]
"#;

        let config = ReportConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_columns_require_single_collection() {
        let toml_content = r#"
[job]
name = "custom-columns"

[api]
base_url = "https://api.doorbel.app/v1"

[export]
output_path = "./exports"
collections = ["orders", "riders"]

[[export.columns]]
path = "orderId"
label = "Order ID"
"#;

        let config = ReportConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_columns_parse() {
        let toml_content = r#"
[job]
name = "custom-columns"

[api]
base_url = "https://api.doorbel.app/v1"

[export]
output_path = "./exports"
collections = ["orders"]

[[export.columns]]
path = "orderId"
label = "Order ID"

[[export.columns]]
path = "customer.phone"
label = "Phone"
"#;

        let config = ReportConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let columns = config.custom_columns().unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].path, "customer.phone");
        assert!(columns[1].formatter.is_none());
    }

    #[test]
    fn test_campaign_section_parses() {
        let toml_content = r#"
[job]
name = "launch-campaign"

[api]
base_url = "https://api.doorbel.app/v1"

[export]
output_path = "./exports"
collections = ["waitlist"]

[campaign]
notify_endpoint = "https://notify.doorbel.app/v1/email/bulk"

[campaign.audience]
cities = ["accra", "kumasi"]
status = ["confirmed"]

[campaign.message]
subject = "DoorBel is live!"
template_id = "launch-v1"
"#;

        let config = ReportConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let campaign = config.campaign.unwrap();
        assert_eq!(
            campaign.audience.cities,
            Some(vec!["accra".to_string(), "kumasi".to_string()])
        );
        assert_eq!(campaign.audience.roles, None);
        assert_eq!(campaign.message.template_id.as_deref(), Some("launch-v1"));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[job]
name = "file-test"

[api]
base_url = "https://api.doorbel.app/v1"

[export]
output_path = "./exports"
collections = ["tickets"]
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = ReportConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.job.name, "file-test");
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_zero_max_records_rejected() {
        let toml_content = r#"
[job]
name = "zero-max"

[api]
base_url = "https://api.doorbel.app/v1"
max_records = 0

[export]
output_path = "./exports"
collections = ["orders"]
"#;

        let config = ReportConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_collections_rejected() {
        let toml_content = r#"
[job]
name = "empty"

[api]
base_url = "https://api.doorbel.app/v1"

[export]
output_path = "./exports"
collections = []
"#;

        let config = ReportConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }
}
