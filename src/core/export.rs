use crate::core::columns::columns_for;
use crate::core::format::{escape_csv_field, format_cell, Column};
use crate::core::resolve::resolve;
use crate::domain::model::{Collection, Record};
use crate::domain::ports::Storage;
use crate::utils::error::{ReportError, Result};
use chrono::Utc;

/// One record projected through a column set into a single CSV line.
pub fn project_row(record: &Record, columns: &[Column]) -> Result<String> {
    let mut fields = Vec::with_capacity(columns.len());
    for column in columns {
        let value = resolve(record, &column.path);
        let text = format_cell(value, record, column)?;
        fields.push(escape_csv_field(&text));
    }
    Ok(fields.join(","))
}

pub fn header_row(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|column| escape_csv_field(&column.label))
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders a full CSV document: header plus one line per record, in input
/// order. An empty dataset is refused before anything is produced.
pub fn render_csv(data: &[Record], columns: &[Column]) -> Result<String> {
    if data.is_empty() {
        return Err(ReportError::EmptyDataset);
    }

    let mut lines = Vec::with_capacity(data.len() + 1);
    lines.push(header_row(columns));
    for record in data {
        lines.push(project_row(record, columns)?);
    }
    Ok(lines.join("\n"))
}

/// `{stem}_{YYYY-MM-DD}.csv`, dated in UTC so a nightly job cannot split
/// one run across two filenames depending on the host timezone.
pub fn export_filename(filename_stem: &str) -> String {
    format!("{}_{}.csv", filename_stem, Utc::now().format("%Y-%m-%d"))
}

pub struct CsvExporter<S: Storage> {
    storage: S,
}

impl<S: Storage> CsvExporter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Renders and writes in one step. Nothing is written when the dataset
    /// is empty; the caller gets `EmptyDataset` instead.
    pub async fn export(
        &self,
        data: &[Record],
        filename_stem: &str,
        columns: &[Column],
    ) -> Result<String> {
        let document = render_csv(data, columns)?;
        self.write_document(&document, filename_stem).await
    }

    /// Writes an already-rendered document under the dated filename and
    /// returns that filename.
    pub async fn write_document(&self, document: &str, filename_stem: &str) -> Result<String> {
        let filename = export_filename(filename_stem);
        self.storage.write_file(&filename, document.as_bytes()).await?;
        tracing::info!("💾 Export written: {}", filename);
        Ok(filename)
    }

    pub async fn export_collection(&self, collection: Collection, data: &[Record]) -> Result<String> {
        self.export(data, collection.file_stem(), &columns_for(collection))
            .await
    }

    pub async fn export_orders(&self, data: &[Record]) -> Result<String> {
        self.export_collection(Collection::Orders, data).await
    }

    pub async fn export_riders(&self, data: &[Record]) -> Result<String> {
        self.export_collection(Collection::Riders, data).await
    }

    pub async fn export_transactions(&self, data: &[Record]) -> Result<String> {
        self.export_collection(Collection::Transactions, data).await
    }

    pub async fn export_kyc(&self, data: &[Record]) -> Result<String> {
        self.export_collection(Collection::Kyc, data).await
    }

    pub async fn export_tickets(&self, data: &[Record]) -> Result<String> {
        self.export_collection(Collection::Tickets, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::money;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn record_from(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => Record::from_object(map),
            _ => panic!("fixture must be a JSON object"),
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MemoryStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ReportError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    path.to_string(),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn failing_formatter(
        _value: Option<&serde_json::Value>,
        _record: &Record,
    ) -> Result<String> {
        Err(ReportError::FormatterFailure {
            column: "Custom".to_string(),
            message: "boom".to_string(),
        })
    }

    #[test]
    fn test_project_row_resolves_and_formats() {
        let record = record_from(json!({
            "orderId": "DB-1",
            "pickupLocation": { "address": "12 Oxford St, Osu" },
            "pricing": { "totalPrice": 35.5 }
        }));
        let columns = vec![
            Column::new("orderId", "Order ID"),
            Column::new("pickupLocation.address", "Pickup Address"),
            Column::with_formatter("pricing.totalPrice", "Amount (GHS)", money),
            Column::new("missing.path", "Missing"),
        ];

        let row = project_row(&record, &columns).unwrap();
        assert_eq!(row, "DB-1,\"12 Oxford St, Osu\",35.50,");
    }

    #[test]
    fn test_project_row_propagates_formatter_failure() {
        let record = record_from(json!({ "orderId": "DB-1" }));
        let columns = vec![Column::with_formatter("orderId", "Custom", failing_formatter)];

        let err = project_row(&record, &columns).unwrap_err();
        assert!(matches!(err, ReportError::FormatterFailure { .. }));
    }

    #[test]
    fn test_render_csv_line_count_and_order() {
        let data = vec![
            record_from(json!({ "orderId": "DB-1" })),
            record_from(json!({ "orderId": "DB-2" })),
            record_from(json!({ "orderId": "DB-3" })),
        ];
        let columns = vec![Column::new("orderId", "Order ID")];

        let document = render_csv(&data, &columns).unwrap();
        let lines: Vec<&str> = document.split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Order ID");
        assert_eq!(lines[1], "DB-1");
        assert_eq!(lines[3], "DB-3");
    }

    #[test]
    fn test_render_csv_rejects_empty_dataset() {
        let columns = vec![Column::new("orderId", "Order ID")];
        let err = render_csv(&[], &columns).unwrap_err();
        assert!(matches!(err, ReportError::EmptyDataset));
    }

    #[test]
    fn test_header_row_escapes_labels() {
        let columns = vec![Column::new("amount", "Amount, net")];
        assert_eq!(header_row(&columns), "\"Amount, net\"");
    }

    #[test]
    fn test_export_filename_shape() {
        let filename = export_filename("doorbel_orders");
        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(filename, format!("doorbel_orders_{}.csv", today));
    }

    #[tokio::test]
    async fn test_export_orders_writes_dated_file() {
        let storage = MemoryStorage::default();
        let exporter = CsvExporter::new(storage.clone());
        let data = vec![record_from(json!({
            "orderId": "DB-1",
            "status": "delivered"
        }))];

        let filename = exporter.export_orders(&data).await.unwrap();
        assert_eq!(filename, export_filename("doorbel_orders"));

        let content = String::from_utf8(storage.read_file(&filename).await.unwrap()).unwrap();
        assert!(content.starts_with("Order ID,"));
        assert!(content.contains("DB-1"));
    }

    #[tokio::test]
    async fn test_export_empty_collection_writes_nothing() {
        let storage = MemoryStorage::default();
        let exporter = CsvExporter::new(storage.clone());

        let err = exporter.export_tickets(&[]).await.unwrap_err();
        assert!(matches!(err, ReportError::EmptyDataset));
        assert!(storage.files.lock().await.is_empty());
    }
}
