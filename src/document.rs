//! Single-page PDF around one JPEG raster.
//!
//! The page is exactly the raster's size. Pixels are converted to points at
//! 96 dpi (0.75 pt per px), the same mapping browser PDF writers use for a
//! `px` page unit.

use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::dimensions::Dimensions;
use crate::error::CompressError;
use crate::format::OutputFormat;

/// Points per device pixel.
pub const PX_TO_PT: f32 = 72.0 / 96.0;

const IMAGE_NAME: &str = "Im0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn of(size: Dimensions) -> Self {
        if size.is_landscape() {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Page size in points for a raster of `size` pixels.
///
/// The long edge follows the orientation, so a landscape page is never taller
/// than wide.
pub fn page_size(size: Dimensions) -> (f32, f32) {
    let w = size.width as f32 * PX_TO_PT;
    let h = size.height as f32 * PX_TO_PT;
    match Orientation::of(size) {
        Orientation::Landscape => (w.max(h), w.min(h)),
        Orientation::Portrait => (w.min(h), w.max(h)),
    }
}

/// Wrap `jpeg` (already encoded, `size` pixels) into a one-page PDF.
///
/// Deterministic: the same inputs produce the same bytes. No info dictionary
/// or timestamps are written.
pub fn assemble(jpeg: &[u8], size: Dimensions) -> Result<Vec<u8>, CompressError> {
    if size.width == 0 || size.height == 0 {
        return Err(CompressError::InvalidDimensions {
            width: size.width,
            height: size.height,
        });
    }
    let (page_w, page_h) = page_size(size);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => size.width as i64,
            "Height" => size.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
            "Length" => jpeg.len() as i64,
        },
        jpeg.to_vec(),
    );
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(page_w),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page_h),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let raw_content = content
        .encode()
        .map_err(|e| CompressError::encode(OutputFormat::Pdf, e))?;

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::best());
    encoder
        .write_all(&raw_content)
        .map_err(|e| CompressError::encode(OutputFormat::Pdf, e))?;
    let compressed = encoder
        .finish()
        .map_err(|e| CompressError::encode(OutputFormat::Pdf, e))?;
    let content_id = doc.add_object(Stream::new(
        dictionary! {
            "Filter" => "FlateDecode",
            "Length" => compressed.len() as i64,
        },
        compressed,
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page_w),
            Object::Real(page_h),
        ],
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| CompressError::encode(OutputFormat::Pdf, e))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Not a valid JPEG, the assembler never decodes it.
    const FAKE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4, 0xFF, 0xD9];

    fn page_dict(doc: &Document) -> lopdf::Dictionary {
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        doc.get_object(page_id).unwrap().as_dict().unwrap().clone()
    }

    fn media_box(doc: &Document) -> Vec<f32> {
        page_dict(doc)
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect()
    }

    #[test]
    fn single_page_sized_to_raster() {
        let bytes = assemble(FAKE_JPEG, Dimensions::new(400, 300)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(media_box(&doc), vec![0.0, 0.0, 300.0, 225.0]);
    }

    #[test]
    fn embeds_the_raster_untouched() {
        let bytes = assemble(FAKE_JPEG, Dimensions::new(20, 10)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        let image = doc
            .objects
            .values()
            .find_map(|obj| match obj {
                Object::Stream(s)
                    if s.dict.get(b"Subtype").and_then(Object::as_name).ok()
                        == Some(b"Image".as_slice()) =>
                {
                    Some(s.clone())
                }
                _ => None,
            })
            .expect("image xobject");
        assert_eq!(image.content, FAKE_JPEG);
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 20);
        assert_eq!(image.dict.get(b"Height").unwrap().as_i64().unwrap(), 10);
        assert_eq!(
            image.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"DCTDecode"
        );
    }

    #[test]
    fn content_draws_full_page() {
        let bytes = assemble(FAKE_JPEG, Dimensions::new(96, 192)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();

        let ops: Vec<&str> = content
            .operations
            .iter()
            .map(|op| op.operator.as_str())
            .collect();
        assert_eq!(ops, vec!["q", "cm", "Do", "Q"]);
        let cm: Vec<f32> = content.operations[1]
            .operands
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect();
        assert_eq!(cm, vec![72.0, 0.0, 0.0, 144.0, 0.0, 0.0]);
    }

    #[test]
    fn same_input_same_bytes() {
        let a = assemble(FAKE_JPEG, Dimensions::new(640, 480)).unwrap();
        let b = assemble(FAKE_JPEG, Dimensions::new(640, 480)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn document_grows_with_raster() {
        let small = assemble(&[0u8; 100], Dimensions::new(10, 10)).unwrap();
        let large = assemble(&[0u8; 5000], Dimensions::new(10, 10)).unwrap();
        // Only the raster and its Length digits differ
        let growth = large.len() - small.len();
        assert!((4900..4910).contains(&growth), "grew by {growth}");
    }

    #[test]
    fn orientation_from_dimensions() {
        assert_eq!(
            Orientation::of(Dimensions::new(300, 200)),
            Orientation::Landscape
        );
        assert_eq!(
            Orientation::of(Dimensions::new(200, 200)),
            Orientation::Portrait
        );
        assert_eq!(page_size(Dimensions::new(200, 300)), (150.0, 225.0));
    }

    #[test]
    fn zero_sized_page_is_rejected() {
        let err = assemble(FAKE_JPEG, Dimensions::new(0, 10)).unwrap_err();
        assert!(matches!(err, CompressError::InvalidDimensions { .. }));
    }
}
