//! Brother QL network label printer
//!
//! Converts a [`LabelImage`] into the QL raster command stream and writes it
//! to the printer's raw TCP port.

use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::barcode::{LabelError, LabelImage, LabelMedia};
use crate::config::PrinterConfig;
use crate::error::{AppError, AppResult};

const ESC: u8 = 0x1B;

/// Pixels darker than this are printed (70% threshold)
const DARK_THRESHOLD: u8 = 76;

const MEDIA_TYPE_CONTINUOUS: u8 = 0x0A;
const MEDIA_TYPE_DIE_CUT: u8 = 0x0B;

/// Supported printer models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterModel {
    Ql700,
    Ql800,
    Ql810w,
    Ql820nwb,
}

impl PrinterModel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QL-700" => Some(PrinterModel::Ql700),
            "QL-800" => Some(PrinterModel::Ql800),
            "QL-810W" => Some(PrinterModel::Ql810w),
            "QL-820NWB" => Some(PrinterModel::Ql820nwb),
            _ => None,
        }
    }

    /// Dots across the print head
    pub fn head_width(&self) -> u32 {
        720
    }

    fn bytes_per_row(&self) -> usize {
        (self.head_width() / 8) as usize
    }

    fn invalidate_bytes(&self) -> usize {
        match self {
            PrinterModel::Ql700 => 200,
            _ => 400,
        }
    }

    fn supports_compression(&self) -> bool {
        !matches!(self, PrinterModel::Ql700)
    }
}

/// Raster command builder for one model and media
#[derive(Debug, Clone, Copy)]
pub struct RasterJob {
    model: PrinterModel,
    media: &'static LabelMedia,
}

impl RasterJob {
    pub fn new(model: PrinterModel, media: &'static LabelMedia) -> Self {
        Self { model, media }
    }

    pub fn media(&self) -> &'static LabelMedia {
        self.media
    }

    /// Build the full command stream for a single cut label
    pub fn encode(&self, label: &LabelImage) -> Result<Vec<u8>, LabelError> {
        if label.width() != self.media.printable_width {
            return Err(LabelError::WrongWidth {
                media: self.media.id,
                expected: self.media.printable_width,
                actual: label.width(),
            });
        }

        let rows = label.height();
        let mut out = vec![0u8; self.model.invalidate_bytes()];

        // Initialize, then switch to raster mode
        out.extend_from_slice(&[ESC, b'@']);
        out.extend_from_slice(&[ESC, b'i', b'a', 0x01]);
        // Status information request
        out.extend_from_slice(&[ESC, b'i', b'S']);

        // Media and quality: media type, width and length valid, high quality
        let media_type = if self.media.die_cut {
            MEDIA_TYPE_DIE_CUT
        } else {
            MEDIA_TYPE_CONTINUOUS
        };
        out.extend_from_slice(&[
            ESC,
            b'i',
            b'z',
            0x80 | 0x02 | 0x04 | 0x08 | 0x40,
            media_type,
            self.media.width_mm,
            self.media.length_mm,
        ]);
        out.extend_from_slice(&rows.to_le_bytes());
        out.extend_from_slice(&[0x00, 0x00]);

        // Autocut after every label
        out.extend_from_slice(&[ESC, b'i', b'M', 0x40]);
        out.extend_from_slice(&[ESC, b'i', b'A', 0x01]);
        // Expanded mode: cut at end
        out.extend_from_slice(&[ESC, b'i', b'K', 0x08]);
        // Feed margin
        out.extend_from_slice(&[ESC, b'i', b'd']);
        out.extend_from_slice(&self.media.feed_margin_dots.to_le_bytes());

        if self.model.supports_compression() {
            out.extend_from_slice(&[b'M', 0x00]);
        }

        for y in 0..rows {
            let row = self.raster_row(label, y);
            out.extend_from_slice(&[b'g', 0x00, row.len() as u8]);
            out.extend_from_slice(&row);
        }

        // Print with feeding
        out.push(0x1A);
        Ok(out)
    }

    /// One head-width row, label right-aligned and mirrored as the printer expects
    fn raster_row(&self, label: &LabelImage, y: u32) -> Vec<u8> {
        let head = self.model.head_width();
        let offset = head - self.media.printable_width - self.media.right_margin_dots;
        let mut row = vec![0u8; self.model.bytes_per_row()];

        for x in 0..label.width() {
            if label.pixel(x, y) < DARK_THRESHOLD {
                let dot = (head - 1 - (offset + x)) as usize;
                row[dot / 8] |= 0x80 >> (dot % 8);
            }
        }
        row
    }
}

/// Write a command stream and close the connection
pub async fn write_job<W>(writer: &mut W, job: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(job).await?;
    writer.flush().await?;
    writer.shutdown().await
}

/// Printer reachable over raw TCP (port 9100)
#[derive(Debug, Clone)]
pub struct BrotherQlPrinter {
    address: String,
    timeout: Duration,
    job: RasterJob,
}

impl BrotherQlPrinter {
    pub fn new(address: String, timeout: Duration, job: RasterJob) -> Self {
        Self {
            address,
            timeout,
            job,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Send a label; returns the number of bytes written
    pub async fn print(&self, label: &LabelImage) -> Result<usize, LabelError> {
        let bytes = self.job.encode(label)?;

        let mut stream = tokio::time::timeout(self.timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|source| LabelError::PrinterUnreachable {
                address: self.address.clone(),
                source,
            })?;

        tokio::time::timeout(self.timeout, write_job(&mut stream, &bytes))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|source| LabelError::PrinterIo {
                address: self.address.clone(),
                source,
            })?;

        tracing::debug!(
            payload = label.payload(),
            media = label.media(),
            address = %self.address,
            bytes = bytes.len(),
            "Raster job written"
        );
        Ok(bytes.len())
    }

    fn timeout_error(&self) -> LabelError {
        LabelError::PrinterTimeout {
            address: self.address.clone(),
            seconds: self.timeout.as_secs(),
        }
    }
}

/// What happened to a print request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintDispatch {
    Sent { address: String, bytes: usize },
    /// Printing is disabled in configuration
    Skipped,
}

/// The configured label printer
#[derive(Debug, Clone)]
pub enum LabelPrinter {
    Network(BrotherQlPrinter),
    Disabled(RasterJob),
}

impl LabelPrinter {
    pub fn from_config(config: &PrinterConfig) -> AppResult<Self> {
        let model = PrinterModel::parse(&config.model).ok_or_else(|| {
            AppError::Configuration(format!("unsupported printer model '{}'", config.model))
        })?;
        let media = LabelMedia::find(&config.label).ok_or_else(|| {
            AppError::Configuration(format!("unknown label media '{}'", config.label))
        })?;
        let job = RasterJob::new(model, media);

        if !config.enabled {
            return Ok(LabelPrinter::Disabled(job));
        }

        Ok(LabelPrinter::Network(BrotherQlPrinter::new(
            format!("{}:{}", config.host, config.port),
            Duration::from_secs(config.timeout_secs),
            job,
        )))
    }

    pub fn media(&self) -> &'static LabelMedia {
        match self {
            LabelPrinter::Network(printer) => printer.job.media(),
            LabelPrinter::Disabled(job) => job.media(),
        }
    }

    pub async fn print(&self, label: &LabelImage) -> Result<PrintDispatch, LabelError> {
        match self {
            LabelPrinter::Network(printer) => {
                let bytes = printer.print(label).await?;
                Ok(PrintDispatch::Sent {
                    address: printer.address().to_string(),
                    bytes,
                })
            }
            LabelPrinter::Disabled(job) => {
                // Still build the job so layout problems surface without a printer
                let bytes = job.encode(label)?;
                tracing::debug!(
                    payload = label.payload(),
                    media = label.media(),
                    bytes = bytes.len(),
                    "Raster job encoded but not sent"
                );
                Ok(PrintDispatch::Skipped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::barcode::{encode_barcode, render_label};

    fn job() -> RasterJob {
        RasterJob::new(PrinterModel::Ql810w, LabelMedia::find("17x54").unwrap())
    }

    fn label(payload: &str) -> LabelImage {
        render_label(&encode_barcode(payload).unwrap(), LabelMedia::find("17x54").unwrap())
            .unwrap()
    }

    fn printer_config(enabled: bool, model: &str, label: &str) -> PrinterConfig {
        PrinterConfig {
            enabled,
            host: "127.0.0.1".to_string(),
            port: 9100,
            model: model.to_string(),
            label: label.to_string(),
            timeout_secs: 1,
        }
    }

    #[test]
    fn test_model_parse() {
        assert_eq!(PrinterModel::parse("ql-810w"), Some(PrinterModel::Ql810w));
        assert_eq!(PrinterModel::parse("QL-1100"), None);
    }

    #[test]
    fn test_command_stream_layout() {
        let label = label("INV-232");
        let bytes = job().encode(&label).unwrap();

        let invalidate = PrinterModel::Ql810w.invalidate_bytes();
        assert!(bytes[..invalidate].iter().all(|b| *b == 0));
        assert_eq!(&bytes[invalidate..invalidate + 2], &[ESC, b'@']);
        assert_eq!(&bytes[invalidate + 2..invalidate + 6], &[ESC, b'i', b'a', 0x01]);

        let media_start = invalidate + 9;
        assert_eq!(&bytes[media_start..media_start + 3], &[ESC, b'i', b'z']);
        assert_eq!(bytes[media_start + 4], MEDIA_TYPE_DIE_CUT);
        assert_eq!(bytes[media_start + 5], 17);
        assert_eq!(bytes[media_start + 6], 54);
        assert_eq!(
            &bytes[media_start + 7..media_start + 11],
            &(label.height()).to_le_bytes()
        );

        assert_eq!(*bytes.last().unwrap(), 0x1A);

        let row_count = bytes.windows(3).filter(|w| w == &[b'g', 0x00, 90]).count();
        assert!(row_count >= label.height() as usize);
    }

    #[test]
    fn test_row_is_mirrored_into_head() {
        let label = label("INV-232");
        let job = job();
        // Find a row with ink
        let y = (0..label.height())
            .find(|y| (0..label.width()).any(|x| label.pixel(x, *y) == 0))
            .unwrap();
        let row = job.raster_row(&label, y);
        assert_eq!(row.len(), 90);

        let head = 720u32;
        let offset = head - 165;
        for x in 0..label.width() {
            let dot = (head - 1 - (offset + x)) as usize;
            let set = row[dot / 8] & (0x80 >> (dot % 8)) != 0;
            assert_eq!(set, label.pixel(x, y) == 0);
        }
        // Label occupies only the first 165 dots after mirroring
        assert!(row[21..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_wrong_width_rejected() {
        let wide = render_label(
            &encode_barcode("INV-1").unwrap(),
            LabelMedia::find("29x90").unwrap(),
        )
        .unwrap();
        assert!(matches!(
            job().encode(&wide),
            Err(LabelError::WrongWidth { expected: 165, .. })
        ));
    }

    #[test]
    fn test_ql700_has_no_compression_command() {
        let label = label("INV-1");
        let ql700 = RasterJob::new(PrinterModel::Ql700, LabelMedia::find("17x54").unwrap());
        let with = job().encode(&label).unwrap();
        let without = ql700.encode(&label).unwrap();
        // 200 fewer invalidate bytes and no 'M 00'
        assert_eq!(with.len() - without.len(), 200 + 2);
    }

    #[tokio::test]
    async fn test_write_job_sends_exact_bytes() {
        let bytes = job().encode(&label("ABC123")).unwrap();
        let mut mock = tokio_test::io::Builder::new().write(&bytes).build();
        write_job(&mut mock, &bytes).await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_printer_skips() {
        let printer = LabelPrinter::from_config(&printer_config(false, "QL-810W", "17x54")).unwrap();
        let dispatch = printer.print(&label("INV-9")).await.unwrap();
        assert_eq!(dispatch, PrintDispatch::Skipped);
    }

    #[tokio::test]
    async fn test_unreachable_printer_is_reported() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut config = printer_config(true, "QL-810W", "17x54");
        config.port = port;
        let printer = LabelPrinter::from_config(&config).unwrap();
        let err = printer.print(&label("INV-9")).await.unwrap_err();
        assert!(matches!(
            err,
            LabelError::PrinterUnreachable { .. } | LabelError::PrinterTimeout { .. }
        ));
    }

    #[tokio::test]
    async fn test_network_printer_receives_job() {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let mut config = printer_config(true, "QL-810W", "17x54");
        config.port = port;
        let printer = LabelPrinter::from_config(&config).unwrap();
        let label = label("INV-9");
        let dispatch = printer.print(&label).await.unwrap();

        let received = server.await.unwrap();
        assert_eq!(received, job().encode(&label).unwrap());
        assert_eq!(
            dispatch,
            PrintDispatch::Sent {
                address: format!("127.0.0.1:{}", port),
                bytes: received.len(),
            }
        );
    }

    #[test]
    fn test_bad_config_is_rejected() {
        assert!(LabelPrinter::from_config(&printer_config(true, "QL-9000", "17x54")).is_err());
        assert!(LabelPrinter::from_config(&printer_config(true, "QL-810W", "1x1")).is_err());
    }
}
