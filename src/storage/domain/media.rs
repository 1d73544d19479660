//! Media-type classification of object keys.

use mime_guess::mime;
use std::path::Path;

/// Extensions of office documents that are converted to a PDF preview.
const OFFICE_EXTENSIONS: &[&str] = &[
    "doc", "docx", "docm", "dot", "dotx", "odt", "ott", "rtf", "xls", "xlsx", "xlsm", "ods",
    "ots", "ppt", "pptx", "pptm", "odp", "otp", "odg", "pages", "numbers", "key",
];

/// Classifies object keys by their extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaIdentifier;

impl MediaIdentifier {
    /// Creates an identifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns whether the key names a raster image.
    #[must_use]
    pub fn is_image(self, key: &str) -> bool {
        mime_guess::from_path(key)
            .first()
            .is_some_and(|guess| guess.type_() == mime::IMAGE && guess.subtype() != mime::SVG)
    }

    /// Returns whether the key names an office document.
    #[must_use]
    pub fn is_office(self, key: &str) -> bool {
        extension(key).is_some_and(|ext| OFFICE_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Returns whether the key names a plain-text document.
    #[must_use]
    pub fn is_plain_text(self, key: &str) -> bool {
        if self.is_office(key) {
            return false;
        }
        mime_guess::from_path(key).first().is_some_and(|guess| {
            guess.type_() == mime::TEXT
                || (guess.type_() == mime::APPLICATION && guess.subtype() == mime::JSON)
        })
    }
}

fn extension(key: &str) -> Option<String> {
    Path::new(key)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
