//! Tesseract OCR over embedded document images.
//!
//! Compiled only with the `ocr` feature, which needs the system tesseract
//! and leptonica libraries.

use anyhow::{Context, Result};
use tesseract::Tesseract;

/// Recognize text in one image. The bytes may be any container the image
/// crate can decode (PDF image streams are usually JPEG); they are
/// re-encoded as PNG before being handed to leptonica.
pub fn recognize(image_bytes: &[u8], datapath: Option<&str>, lang: &str) -> Result<String> {
    let decoded = image::load_from_memory(image_bytes).context("undecodable image stream")?;

    let mut png = Vec::new();
    decoded
        .write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageOutputFormat::Png,
        )
        .context("failed to re-encode image as PNG")?;

    let mut tess = Tesseract::new(datapath, Some(lang))
        .context("failed to initialize tesseract")?
        .set_image_from_mem(&png)
        .context("tesseract rejected image")?;

    tess.get_text().context("tesseract recognition failed")
}
