//! Upload constants and extension checks

// ============================================================================
// Constants
// ============================================================================

/// Extensions accepted by `/extract-text`, in the order they are reported.
pub static ALLOWED_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "pdf"];

/// Maximum request size: 16MB
pub const MAX_FILE_SIZE: usize = 16 * 1024 * 1024;

/// Human-readable form of `MAX_FILE_SIZE`
pub const MAX_FILE_SIZE_LABEL: &str = "16MB";

// ============================================================================
// Extension handling
// ============================================================================

/// How an accepted upload is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Rasterized page by page, then recognized
    Pdf,
    /// Decoded as a single image and recognized once
    Image,
}

impl FileKind {
    pub fn from_extension(extension: &str) -> Self {
        if extension.eq_ignore_ascii_case("pdf") {
            Self::Pdf
        } else {
            Self::Image
        }
    }
}

/// Lowercased text after the last `.`, if the name has one.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// Check the extension of `filename` against the allow-list.
pub fn allowed_file(filename: &str) -> bool {
    file_extension(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
