//! Barcode label viewing and printing for inventory items

use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::external::{encode_barcode, render_label, LabelError, LabelImage, LabelPrinter, PrintDispatch};
use crate::models::{label_payload, LabelKind};

/// Label service: payload lookup, rendering and dispatch to the printer
#[derive(Clone)]
pub struct LabelService {
    db: PgPool,
    printer: Arc<LabelPrinter>,
}

/// Outcome of a print request, reported in the response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintReport {
    pub success: bool,
    pub message: String,
    pub payload: Option<String>,
}

impl PrintReport {
    fn from_dispatch(payload: String, result: Result<PrintDispatch, LabelError>) -> Self {
        match result {
            Ok(PrintDispatch::Sent { address, bytes }) => {
                tracing::info!(payload = %payload, address = %address, bytes, "Label printed");
                Self {
                    success: true,
                    message: format!("Label {} sent to printer at {}", payload, address),
                    payload: Some(payload),
                }
            }
            Ok(PrintDispatch::Skipped) => {
                tracing::warn!(payload = %payload, "Printing disabled, label not sent");
                Self {
                    success: false,
                    message: format!(
                        "Label {} was rendered but printing is disabled",
                        payload
                    ),
                    payload: Some(payload),
                }
            }
            Err(e) => {
                tracing::error!(payload = %payload, error = %e, "Label print failed");
                Self {
                    success: false,
                    message: format!("Failed to print label: {}", e),
                    payload: Some(payload),
                }
            }
        }
    }
}

impl LabelService {
    pub fn new(db: PgPool, printer: Arc<LabelPrinter>) -> Self {
        Self { db, printer }
    }

    /// Text encoded on the label for `item_id`
    pub async fn payload(&self, item_id: i64, kind: LabelKind) -> AppResult<String> {
        let upc = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.upc
            FROM inventory_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Inventory item {}", item_id)))?;

        Ok(label_payload(kind, item_id, &upc))
    }

    /// Render the label without printing it
    pub fn render(&self, payload: &str) -> Result<LabelImage, LabelError> {
        let barcode = encode_barcode(payload)?;
        render_label(&barcode, self.printer.media())
    }

    /// Render `payload` to PNG bytes; never contacts the printer
    pub fn render_png(&self, payload: &str) -> Result<Vec<u8>, LabelError> {
        self.render(payload)?.to_png()
    }

    /// PNG of the label for on-screen display
    pub async fn view_png(&self, item_id: i64, kind: LabelKind) -> AppResult<Vec<u8>> {
        let payload = self.payload(item_id, kind).await?;
        let png = self
            .render_png(&payload)
            .map_err(|e| AppError::LabelGeneration(e.to_string()))?;
        tracing::debug!(item_id, kind = %kind, "Barcode rendered for viewing");
        Ok(png)
    }

    /// Render and print; rendering and printer failures are reported, not raised
    pub async fn print(&self, item_id: i64, kind: LabelKind) -> AppResult<PrintReport> {
        let payload = self.payload(item_id, kind).await?;
        let result = match self.render(&payload) {
            Ok(label) => self.printer.print(&label).await,
            Err(e) => Err(e),
        };
        Ok(PrintReport::from_dispatch(payload, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrinterConfig;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    #[tokio::test]
    async fn test_view_render_never_connects_to_printer() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = PrinterConfig {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: listener.local_addr().unwrap().port(),
            model: "QL-810W".to_string(),
            label: "17x54".to_string(),
            timeout_secs: 1,
        };
        let printer = LabelPrinter::from_config(&config).unwrap();
        assert!(matches!(printer, LabelPrinter::Network(_)));

        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/filament_inventory")
            .unwrap();
        let service = LabelService::new(db, Arc::new(printer));

        let png = service.render_png("INV-232").unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        let accepted = tokio::time::timeout(Duration::from_millis(200), listener.accept()).await;
        assert!(accepted.is_err(), "viewing a label opened a printer connection");
    }

    #[test]
    fn test_report_for_sent_label() {
        let report = PrintReport::from_dispatch(
            "INV-232".to_string(),
            Ok(PrintDispatch::Sent {
                address: "10.0.0.5:9100".to_string(),
                bytes: 51_000,
            }),
        );
        assert!(report.success);
        assert_eq!(report.payload.as_deref(), Some("INV-232"));
        assert!(report.message.contains("10.0.0.5:9100"));
    }

    #[test]
    fn test_report_for_skipped_label() {
        let report = PrintReport::from_dispatch("ABC123".to_string(), Ok(PrintDispatch::Skipped));
        assert!(!report.success);
        assert!(report.message.contains("disabled"));
    }

    #[test]
    fn test_report_for_failure_is_descriptive() {
        let report = PrintReport::from_dispatch(
            "INV-1".to_string(),
            Err(LabelError::PrinterTimeout {
                address: "10.0.0.5:9100".to_string(),
                seconds: 5,
            }),
        );
        assert!(!report.success);
        assert!(report.message.contains("did not respond within 5s"));
    }
}
