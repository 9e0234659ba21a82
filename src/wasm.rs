//! Browser entry points.

use wasm_bindgen::prelude::*;

use crate::dimensions::{resolve, Dimensions, Edit, Field};
use crate::encode::{ImageEncoder, SourceImage};
use crate::format::OutputFormat;
use crate::request::{compress, CompressOptions, CompressionRequest};
use crate::KIB;

/// Compress `input` to roughly `target_kb` kilobytes.
///
/// `format` is a MIME type (`image/jpeg`, `image/png`, `image/webp`,
/// `application/pdf`). A zero `width` or `height` keeps the natural size of
/// that side; both are ignored for PDF output.
#[wasm_bindgen]
pub fn compress_to_target(
    input: &[u8],
    format: &str,
    target_kb: u32,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, JsError> {
    let output_format = OutputFormat::from_mime(format)
        .ok_or_else(|| JsError::new(&format!("Unsupported output format: {}", format)))?;
    let source = SourceImage::from_bytes(input)?;
    let natural = source.natural_size().unwrap_or(Dimensions::new(0, 0));
    let size = Dimensions::new(
        if width == 0 { natural.width } else { width },
        if height == 0 { natural.height } else { height },
    );

    let request = CompressionRequest::new(source, output_format, target_kb as u64 * KIB)
        .with_output_size(size);
    let output = compress(&ImageEncoder, &request, &CompressOptions::default())?;
    Ok(output.bytes)
}

/// The other side after the user typed `value` into the width (or height) box.
#[wasm_bindgen]
pub fn resolve_paired_dimension(
    natural_width: u32,
    natural_height: u32,
    edited_is_width: bool,
    value: u32,
    current_other: u32,
    lock_aspect: bool,
) -> u32 {
    let natural = Dimensions::new(natural_width, natural_height);
    let (field, current) = if edited_is_width {
        (Field::Width, Dimensions::new(value, current_other))
    } else {
        (Field::Height, Dimensions::new(current_other, value))
    };
    let resolved = resolve(Some(natural), current, Edit { field, value }, lock_aspect);
    match field {
        Field::Width => resolved.height,
        Field::Height => resolved.width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paired_dimension_follows_lock() {
        assert_eq!(
            resolve_paired_dimension(4000, 3000, true, 1200, 3000, true),
            900
        );
        assert_eq!(
            resolve_paired_dimension(4000, 3000, false, 300, 4000, true),
            400
        );
        assert_eq!(
            resolve_paired_dimension(4000, 3000, true, 1200, 3000, false),
            3000
        );
    }

    #[test]
    fn unknown_natural_size_leaves_other_side() {
        assert_eq!(resolve_paired_dimension(0, 0, true, 500, 321, true), 321);
    }
}
