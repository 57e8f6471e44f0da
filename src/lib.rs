//! OCR Server Library
//!
//! Text extraction over HTTP for uploaded images, PDFs and remote image URLs.
//! The server binary is in main.rs.
//!
//! # Modules
//!
//! - `upload`: upload validation (allow-list, filename sanitizing, size limit)
//! - `ocr`: recognition engine, PDF rasterizer and the dispatching service
//! - `routes`: HTTP handlers and router assembly

pub mod config;
pub mod error;
pub mod ocr;
pub mod routes;
pub mod state;
pub mod upload;

#[cfg(test)]
mod test_support;
