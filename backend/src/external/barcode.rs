//! Barcode encoding and label layout
//!
//! Encoding always yields a [`BarcodeImage`]; layout always yields a
//! [`LabelImage`]. Viewing and printing only accept a `LabelImage`.

use std::io::Cursor;

use barcoders::sym::code128::Code128;
use image::{imageops, DynamicImage, GrayImage, ImageFormat, Luma};
use thiserror::Error;

/// Selects Code128 character set B (printable ASCII)
const CODE128_SET_B: char = 'Ɓ';

/// Quiet zone on each side of the symbol, in modules
const QUIET_ZONE_MODULES: u32 = 10;

/// Bar height before scaling (about 10 mm at 300 dpi)
const BAR_HEIGHT: u32 = 118;

/// White border kept around the symbol on the label, in dots
const LABEL_MARGIN: u32 = 5;

const WHITE: Luma<u8> = Luma([255]);
const BLACK: Luma<u8> = Luma([0]);

/// Label generation and printing errors
#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Cannot generate barcode: empty data provided")]
    EmptyPayload,

    #[error("Barcode encoding failed for '{payload}': {reason}")]
    Encoding { payload: String, reason: String },

    #[error("Barcode '{payload}' needs {needed} dots but the label fits {available}")]
    PayloadTooLong {
        payload: String,
        needed: u32,
        available: u32,
    },

    #[error("Label is {actual} dots wide but {media} media needs {expected}")]
    WrongWidth {
        media: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("Label image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Printer at {address} is unreachable: {source}")]
    PrinterUnreachable {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Printer at {address} did not respond within {seconds}s")]
    PrinterTimeout { address: String, seconds: u64 },

    #[error("Sending label to printer at {address} failed: {source}")]
    PrinterIo {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Physical label media: printable area in printer dots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMedia {
    pub id: &'static str,
    pub width_mm: u8,
    pub length_mm: u8,
    pub die_cut: bool,
    /// Dots across the print head
    pub printable_width: u32,
    /// Dots along the feed direction
    pub printable_length: u32,
    pub right_margin_dots: u32,
    pub feed_margin_dots: u16,
}

pub const MEDIA: [LabelMedia; 3] = [
    LabelMedia {
        id: "17x54",
        width_mm: 17,
        length_mm: 54,
        die_cut: true,
        printable_width: 165,
        printable_length: 566,
        right_margin_dots: 0,
        feed_margin_dots: 0,
    },
    LabelMedia {
        id: "29x90",
        width_mm: 29,
        length_mm: 90,
        die_cut: true,
        printable_width: 306,
        printable_length: 991,
        right_margin_dots: 6,
        feed_margin_dots: 0,
    },
    LabelMedia {
        id: "62x29",
        width_mm: 62,
        length_mm: 29,
        die_cut: true,
        printable_width: 696,
        printable_length: 271,
        right_margin_dots: 12,
        feed_margin_dots: 0,
    },
];

impl LabelMedia {
    pub fn find(id: &str) -> Option<&'static LabelMedia> {
        MEDIA.iter().find(|m| m.id == id)
    }
}

/// A rendered barcode symbol, one pixel per module
#[derive(Debug, Clone)]
pub struct BarcodeImage {
    payload: String,
    image: GrayImage,
}

impl BarcodeImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A finished label in print orientation (width = printable width)
#[derive(Debug, Clone)]
pub struct LabelImage {
    payload: String,
    media: &'static str,
    image: GrayImage,
}

impl LabelImage {
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn media(&self) -> &'static str {
        self.media
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y).0[0]
    }

    /// Encode as PNG for on-screen display
    pub fn to_png(&self) -> Result<Vec<u8>, LabelError> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(self.image.clone()).write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

/// Encode `payload` as a Code128 symbol
pub fn encode_barcode(payload: &str) -> Result<BarcodeImage, LabelError> {
    if payload.is_empty() {
        return Err(LabelError::EmptyPayload);
    }

    let symbol = Code128::new(format!("{}{}", CODE128_SET_B, payload)).map_err(|e| {
        LabelError::Encoding {
            payload: payload.to_string(),
            reason: e.to_string(),
        }
    })?;
    let modules = symbol.encode();

    let width = modules.len() as u32 + 2 * QUIET_ZONE_MODULES;
    let mut image = GrayImage::from_pixel(width, BAR_HEIGHT, WHITE);
    for (i, module) in modules.iter().enumerate() {
        if *module == 1 {
            let x = QUIET_ZONE_MODULES + i as u32;
            for y in 0..BAR_HEIGHT {
                image.put_pixel(x, y, BLACK);
            }
        }
    }

    Ok(BarcodeImage {
        payload: payload.to_string(),
        image,
    })
}

/// Lay a barcode out on `media` and rotate it into print orientation.
///
/// Bars are scaled by a whole number so every module keeps the same width.
pub fn render_label(barcode: &BarcodeImage, media: &LabelMedia) -> Result<LabelImage, LabelError> {
    // Landscape canvas: the feed direction is horizontal until rotation
    let canvas_width = media.printable_length;
    let canvas_height = media.printable_width;
    let available = canvas_width.saturating_sub(2 * LABEL_MARGIN);

    let scale = available / barcode.width();
    if scale == 0 {
        return Err(LabelError::PayloadTooLong {
            payload: barcode.payload.clone(),
            needed: barcode.width(),
            available,
        });
    }

    let bar_height = barcode
        .height()
        .min(canvas_height.saturating_sub(2 * LABEL_MARGIN))
        .max(1);
    let scaled = imageops::resize(
        &barcode.image,
        barcode.width() * scale,
        bar_height,
        imageops::FilterType::Nearest,
    );

    let mut canvas = GrayImage::from_pixel(canvas_width, canvas_height, WHITE);
    let x = (canvas_width - scaled.width()) / 2;
    let y = (canvas_height - scaled.height()) / 2;
    imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);

    Ok(LabelImage {
        payload: barcode.payload.clone(),
        media: media.id,
        image: imageops::rotate90(&canvas),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media_17x54() -> &'static LabelMedia {
        LabelMedia::find("17x54").unwrap()
    }

    #[test]
    fn test_encode_unique_payload() {
        let barcode = encode_barcode("INV-232").unwrap();
        // at least 11 modules per data character plus quiet zones
        assert!(barcode.width() > 11 * 7 + 2 * QUIET_ZONE_MODULES);
        assert_eq!(barcode.height(), BAR_HEIGHT);
        assert_eq!(barcode.payload, "INV-232");
    }

    #[test]
    fn test_quiet_zone_is_white() {
        let barcode = encode_barcode("6975337031234").unwrap();
        for x in 0..QUIET_ZONE_MODULES {
            assert_eq!(barcode.image.get_pixel(x, 0), &WHITE);
            assert_eq!(barcode.image.get_pixel(barcode.width() - 1 - x, 0), &WHITE);
        }
        // Code128 symbols start with a bar
        assert_eq!(barcode.image.get_pixel(QUIET_ZONE_MODULES, 0), &BLACK);
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(matches!(encode_barcode(""), Err(LabelError::EmptyPayload)));
    }

    #[test]
    fn test_non_ascii_payload_rejected() {
        assert!(matches!(
            encode_barcode("Ünïcode"),
            Err(LabelError::Encoding { .. })
        ));
    }

    #[test]
    fn test_label_is_in_print_orientation() {
        let barcode = encode_barcode("INV-232").unwrap();
        let label = render_label(&barcode, media_17x54()).unwrap();
        assert_eq!(label.width(), 165);
        assert_eq!(label.height(), 566);
        assert_eq!(label.payload(), "INV-232");
        assert_eq!(label.media(), "17x54");
        // Border stays white
        assert_eq!(label.pixel(0, 0), 255);
        assert_eq!(label.pixel(164, 565), 255);
    }

    #[test]
    fn test_label_contains_bars() {
        let barcode = encode_barcode("ABC123").unwrap();
        let label = render_label(&barcode, media_17x54()).unwrap();
        let column = label.width() / 2;
        let dark = (0..label.height()).filter(|y| label.pixel(column, *y) == 0).count();
        assert!(dark > 0);
    }

    #[test]
    fn test_payload_too_long_for_media() {
        let barcode = encode_barcode(&"X".repeat(50)).unwrap();
        assert!(matches!(
            render_label(&barcode, media_17x54()),
            Err(LabelError::PayloadTooLong { .. })
        ));
    }

    #[test]
    fn test_png_output() {
        let barcode = encode_barcode("INV-7").unwrap();
        let png = render_label(&barcode, media_17x54()).unwrap().to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_media_lookup() {
        assert!(LabelMedia::find("29x90").is_some());
        assert!(LabelMedia::find("100x100").is_none());
    }
}
