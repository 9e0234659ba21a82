//! Output encodings and the names they travel under.

use std::fmt;
use std::path::Path;

/// Raster encodings the quality search can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    Jpeg,
    Png,
    Webp,
}

/// Every encoding a request can ask for.
///
/// `Pdf` is a single-page document wrapping a JPEG raster; it is reached via
/// the scale search rather than the quality search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
    Pdf,
}

impl OutputFormat {
    pub fn raster(self) -> Option<RasterFormat> {
        match self {
            OutputFormat::Jpeg => Some(RasterFormat::Jpeg),
            OutputFormat::Png => Some(RasterFormat::Png),
            OutputFormat::Webp => Some(RasterFormat::Webp),
            OutputFormat::Pdf => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Pdf => "application/pdf",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(OutputFormat::Jpeg),
            "image/png" => Some(OutputFormat::Png),
            "image/webp" => Some(OutputFormat::Webp),
            "application/pdf" => Some(OutputFormat::Pdf),
            _ => None,
        }
    }

    /// Guess the format from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::Webp),
            "pdf" => Some(OutputFormat::Pdf),
            _ => None,
        }
    }
}

impl From<RasterFormat> for OutputFormat {
    fn from(format: RasterFormat) -> Self {
        match format {
            RasterFormat::Jpeg => OutputFormat::Jpeg,
            RasterFormat::Png => OutputFormat::Png,
            RasterFormat::Webp => OutputFormat::Webp,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::Webp => "WebP",
            OutputFormat::Pdf => "PDF",
        };
        f.write_str(name)
    }
}

/// File name offered for a result: `ImageResizer_<stem>.<ext>`.
pub fn default_output_name(stem: &str, format: OutputFormat) -> String {
    format!("ImageResizer_{}.{}", stem, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_round_trip() {
        for format in [
            OutputFormat::Jpeg,
            OutputFormat::Png,
            OutputFormat::Webp,
            OutputFormat::Pdf,
        ] {
            assert_eq!(OutputFormat::from_mime(format.mime_type()), Some(format));
        }
        assert_eq!(OutputFormat::from_mime("image/gif"), None);
    }

    #[test]
    fn extension_guess_ignores_case() {
        assert_eq!(
            OutputFormat::from_path(Path::new("photo.JPG")),
            Some(OutputFormat::Jpeg)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("scan.pdf")),
            Some(OutputFormat::Pdf)
        );
        assert_eq!(OutputFormat::from_path(Path::new("notes")), None);
    }

    #[test]
    fn only_pdf_has_no_raster_encoding() {
        assert_eq!(OutputFormat::Pdf.raster(), None);
        assert_eq!(OutputFormat::Webp.raster(), Some(RasterFormat::Webp));
    }

    #[test]
    fn download_name_uses_prefix_and_extension() {
        assert_eq!(
            default_output_name("holiday", OutputFormat::Webp),
            "ImageResizer_holiday.webp"
        );
    }
}
