//! Configuration management for the OCR server

use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// External tool settings for recognition and rasterization
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Path or name of the tesseract binary
    pub tesseract_cmd: String,
    /// Tesseract language pack (e.g. "eng", "eng+deu")
    pub language: String,
    /// Path or name of the pdftoppm binary
    pub pdftoppm_cmd: String,
    /// Resolution used when rasterizing PDF pages
    pub pdf_dpi: u32,
}

/// Remote image download settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8900,
            },
            ocr: OcrConfig {
                tesseract_cmd: "tesseract".to_string(),
                language: "eng".to_string(),
                pdftoppm_cmd: "pdftoppm".to_string(),
                pdf_dpi: 200,
            },
            fetch: FetchConfig { timeout_secs: 30 },
        }
    }
}

impl Config {
    /// Build configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port),
            },
            ocr: OcrConfig {
                tesseract_cmd: env::var("TESSERACT_CMD").unwrap_or(defaults.ocr.tesseract_cmd),
                language: env::var("OCR_LANGUAGE").unwrap_or(defaults.ocr.language),
                pdftoppm_cmd: env::var("PDFTOPPM_CMD").unwrap_or(defaults.ocr.pdftoppm_cmd),
                pdf_dpi: parse_var("PDF_DPI", defaults.ocr.pdf_dpi),
            },
            fetch: FetchConfig {
                timeout_secs: parse_var("URL_FETCH_TIMEOUT_SECS", defaults.fetch.timeout_secs),
            },
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match env::var(name) {
        Ok(raw) => parse_or(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T>(name: &str, raw: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid value '{}' for {}, using default {}", raw, name, default);
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8900);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.pdf_dpi, 200);
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn test_parse_or_valid() {
        assert_eq!(parse_or("SERVER_PORT", " 9000 ", 8900u16), 9000);
    }

    #[test]
    fn test_parse_or_invalid_falls_back() {
        assert_eq!(parse_or("SERVER_PORT", "not-a-port", 8900u16), 8900);
        assert_eq!(parse_or("PDF_DPI", "-5", 200u32), 200);
    }
}
