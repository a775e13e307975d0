#![forbid(unsafe_code)]

use image::RgbaImage;
use std::io::Write;
use std::path::Path;

use crate::pak::{self, PakResult};

/// TEX0 texture magic.
pub const TEX_MAGIC: [u8; 4] = *b"TEX0";

/// TEX0 layout:
/// - [MAGIC "TEX0"]
/// - [u32 width]
/// - [u32 height]
/// - width * height RGBA8 pixels, row-major
///
/// Pixels with zero alpha are written as all-zero so transparent regions are
/// uniform (and compress well in the archive).
pub fn encode(img: &RgbaImage, out: &mut dyn Write) -> PakResult<()> {
    out.write_all(&TEX_MAGIC)?;
    pak::write_u32(out, img.width())?;
    pak::write_u32(out, img.height())?;

    for px in img.pixels() {
        let rgba = if px[3] == 0 { [0u8; 4] } else { px.0 };
        out.write_all(&rgba)?;
    }
    Ok(())
}

/// Converts any image the `image` crate can decode into a TEX0 file.
pub fn convert(input: &Path, output: &Path) -> PakResult<()> {
    let img = image::open(input)?.to_rgba8();
    tracing::info!(
        width = img.width(),
        height = img.height(),
        "{} -> {}",
        input.display(),
        output.display()
    );
    pak::write_atomic(output, |w| encode(&img, w))
}
