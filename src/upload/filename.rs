//! Client filename sanitizing

use super::types::file_extension;

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// Path separators become whitespace, whitespace runs become a single `_`,
/// anything outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`
/// and `_` are stripped. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Sanitized name for an upload whose extension already passed validation.
///
/// Falls back to `upload.<ext>` when sanitizing loses the extension.
pub fn sanitized_upload_name(filename: &str, extension: &str) -> String {
    let name = secure_filename(filename);
    match file_extension(&name) {
        Some(ext) if ext == extension => name,
        _ => format!("upload.{}", extension),
    }
}
