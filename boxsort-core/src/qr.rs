use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::QrCode;
use qrcode::render::unicode;
use tracing::warn;
use uuid::Uuid;

use crate::domain::StorageBox;
use crate::error::{BoxSortError, Result};
use crate::link::{HOST, SCHEME, UUID_PARAM};

const MODULE_PX: u32 = 8;
const PLACEHOLDER_PX: u32 = 64;

pub fn deep_link_for(id: &Uuid) -> String {
    format!("{SCHEME}://{HOST}?{UUID_PARAM}={id}")
}

/// `boxsort://box?uuid=<id>` for `b`.
pub fn encode_deep_link(b: &StorageBox) -> String {
    deep_link_for(&b.id)
}

/// PNG of `payload` as a QR code at the default error-correction level (M).
/// Same payload, same bytes.
pub fn try_render_qr_png(payload: &str) -> Result<Vec<u8>> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| BoxSortError::Format(format!("qr encode: {e}")))?;
    let img = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PX, MODULE_PX)
        .quiet_zone(true)
        .build();
    png_bytes(img)
}

/// Like [`try_render_qr_png`], but a payload that cannot be encoded yields a
/// placeholder glyph instead of an error.
pub fn render_qr_png(payload: &str) -> Vec<u8> {
    match try_render_qr_png(payload) {
        Ok(png) => png,
        Err(e) => {
            warn!(error = %e, len = payload.len(), "qr unavailable, using placeholder");
            placeholder_png()
        }
    }
}

/// Terminal rendering using half-block characters.
pub fn render_qr_text(payload: &str) -> Option<String> {
    let code = QrCode::new(payload.as_bytes()).ok()?;
    Some(
        code.render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build(),
    )
}

/// Framed cross, clearly not a scannable code.
pub fn placeholder_png() -> Vec<u8> {
    let n = PLACEHOLDER_PX;
    let img = GrayImage::from_fn(n, n, |x, y| {
        let border = x < 4 || y < 4 || x >= n - 4 || y >= n - 4;
        let diagonal = x.abs_diff(y) < 3 || x.abs_diff(n - 1 - y) < 3;
        if border || diagonal {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });
    png_bytes(img).unwrap_or_else(|e| {
        warn!(error = %e, "placeholder encode failed");
        Vec::new()
    })
}

fn png_bytes(img: GrayImage) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| BoxSortError::Format(format!("png encode: {e}")))?;
    Ok(out)
}
