use crate::core::columns::columns_for;
use crate::core::export::{render_csv, CsvExporter};
use crate::core::format::Column;
use crate::domain::model::{Collection, Record, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{ReportError, Result};
use reqwest::Client;
use std::time::Duration;

/// Fetches one admin collection page by page, projects it through its
/// column set and writes the dated CSV.
pub struct ExportPipeline<S: Storage, C: ConfigProvider> {
    exporter: CsvExporter<S>,
    config: C,
    client: Client,
    collection: Collection,
    columns: Vec<Column>,
}

impl<S: Storage, C: ConfigProvider> ExportPipeline<S, C> {
    pub fn new(storage: S, config: C, collection: Collection) -> Self {
        Self {
            exporter: CsvExporter::new(storage),
            config,
            client: Client::new(),
            collection,
            columns: columns_for(collection),
        }
    }

    /// Replaces the default column set, e.g. with columns from a job file.
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }
}

/// 解開 API 的分頁回應：裸陣列、{data: [...]} 包裝、或單一物件
fn page_items(json_data: serde_json::Value) -> Result<Vec<serde_json::Map<String, serde_json::Value>>> {
    match json_data {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::Object(object) => Some(object),
                _ => None,
            })
            .collect()),
        serde_json::Value::Object(mut wrapper) => {
            match wrapper.remove("data") {
                Some(serde_json::Value::Array(items)) => Ok(items
                    .into_iter()
                    .filter_map(|item| match item {
                        serde_json::Value::Object(object) => Some(object),
                        _ => None,
                    })
                    .collect()),
                // 沒有 data 欄位時當成單一記錄
                None => Ok(vec![wrapper]),
                Some(other) => {
                    wrapper.insert("data".to_string(), other);
                    Ok(vec![wrapper])
                }
            }
        }
        other => Err(ReportError::ProcessingError {
            message: format!("Unexpected API payload shape: {}", value_kind(&other)),
        }),
    }
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ExportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let base = self.config.api_base_url().trim_end_matches('/');
        let url = format!("{}/{}", base, self.collection.endpoint_path());
        let limit = self.config.page_size();

        let mut records = Vec::new();
        let mut page = 1usize;

        loop {
            tracing::debug!("Fetching {} page {} (limit {})", self.collection, page, limit);

            let mut request = self
                .client
                .get(&url)
                .query(&[("page", page.to_string()), ("limit", limit.to_string())])
                .timeout(Duration::from_secs(self.config.request_timeout_seconds()));

            if let Some(token) = self.config.api_token() {
                request = request.header("Authorization", format!("Bearer {}", token));
            }

            let response = request.send().await?;
            tracing::debug!("API response status: {}", response.status());

            if !response.status().is_success() {
                return Err(ReportError::ProcessingError {
                    message: format!("API request failed with status: {}", response.status()),
                });
            }

            let json_data: serde_json::Value = response.json().await?;
            let items = page_items(json_data)?;
            let fetched = items.len();

            for object in items {
                records.push(Record::from_object(object));
            }

            if let Some(max) = self.config.max_records() {
                if records.len() >= max {
                    records.truncate(max);
                    tracing::debug!("Reached max_records limit of {}", max);
                    break;
                }
            }

            // 短頁或空頁代表已到最後一頁
            if fetched == 0 || fetched < limit {
                break;
            }
            page += 1;
        }

        tracing::info!("📡 Fetched {} {} records", records.len(), self.collection);
        Ok(records)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        let csv_output = render_csv(&data, &self.columns)?;
        tracing::debug!("Rendered {} rows into CSV", data.len());

        Ok(TransformResult {
            row_count: data.len(),
            processed_records: data,
            csv_output,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let filename = self
            .exporter
            .write_document(&result.csv_output, self.collection.file_stem())
            .await?;

        Ok(format!(
            "{}/{}",
            self.config.output_path().trim_end_matches('/'),
            filename
        ))
    }
}
