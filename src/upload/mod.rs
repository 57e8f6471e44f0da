//! Upload validation
//!
//! Decides whether an uploaded file can be processed and how:
//! - extension allow-list checks
//! - PDF vs. image dispatch
//! - filename sanitizing before the name is echoed back to clients

mod filename;
mod types;

pub use filename::{sanitized_upload_name, secure_filename};
pub use types::{
    allowed_file, file_extension, FileKind, ALLOWED_EXTENSIONS, MAX_FILE_SIZE,
    MAX_FILE_SIZE_LABEL,
};
