use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::models::Language;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

pub const DEFAULT_OCR_ENDPOINT: &str = "http://localhost:5001/ocr";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub processing: ProcessingConfig,
    pub speech: SpeechConfig,
    pub export: ExportConfig,
}

/// Remote text-extraction service settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    pub language: Language,
    /// Refuse a new submission while the item is still `processing`.
    pub guard_duplicates: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    pub command: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub download_dir: PathBuf,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            guard_duplicates: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig {
                endpoint: env::var("PIC2TEXT_OCR_URL")
                    .unwrap_or_else(|_| DEFAULT_OCR_ENDPOINT.to_string()),
                timeout_secs: parse_env_or("PIC2TEXT_OCR_TIMEOUT", 60),
            },
            processing: ProcessingConfig {
                language: parse_env_or("PIC2TEXT_LANG", Language::default()),
                guard_duplicates: parse_env_or("PIC2TEXT_GUARD_DUPLICATES", false),
            },
            speech: SpeechConfig {
                command: env::var("PIC2TEXT_SPEECH_COMMAND")
                    .unwrap_or_else(|_| "espeak-ng".to_string()),
            },
            export: ExportConfig {
                download_dir: parse_env_opt("PIC2TEXT_DOWNLOAD_DIR")
                    .or_else(dirs::download_dir)
                    .unwrap_or_else(|| PathBuf::from(".")),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_extraction_config_defaults() {
        std::env::remove_var("PIC2TEXT_OCR_URL");
        std::env::remove_var("PIC2TEXT_OCR_TIMEOUT");

        let config = Config::default();
        assert_eq!(config.extraction.endpoint, DEFAULT_OCR_ENDPOINT);
        assert_eq!(config.extraction.timeout_secs, 60);
    }

    #[test]
    #[serial]
    fn test_processing_config_from_env() {
        std::env::set_var("PIC2TEXT_LANG", "tam");
        std::env::set_var("PIC2TEXT_GUARD_DUPLICATES", "true");

        let config = Config::default();
        assert_eq!(config.processing.language, Language::Tamil);
        assert!(config.processing.guard_duplicates);

        std::env::remove_var("PIC2TEXT_LANG");
        std::env::remove_var("PIC2TEXT_GUARD_DUPLICATES");
    }

    #[test]
    #[serial]
    fn test_invalid_language_falls_back_to_default() {
        std::env::set_var("PIC2TEXT_LANG", "klingon");
        let config = Config::default();
        assert_eq!(config.processing.language, Language::English);
        std::env::remove_var("PIC2TEXT_LANG");
    }

    #[test]
    #[serial]
    fn test_download_dir_from_env() {
        std::env::set_var("PIC2TEXT_DOWNLOAD_DIR", "/tmp/pic2text-out");
        let config = Config::default();
        assert_eq!(config.export.download_dir, PathBuf::from("/tmp/pic2text-out"));
        std::env::remove_var("PIC2TEXT_DOWNLOAD_DIR");
    }

    #[test]
    #[serial]
    fn test_parse_env_or_valid_value() {
        std::env::set_var("__TEST_PIC2TEXT_TIMEOUT", "15");
        let result: u64 = parse_env_or("__TEST_PIC2TEXT_TIMEOUT", 60);
        assert_eq!(result, 15);
        std::env::remove_var("__TEST_PIC2TEXT_TIMEOUT");
    }

    #[test]
    fn test_parse_env_opt_missing_is_none() {
        let result: Option<u64> = parse_env_opt("__TEST_PIC2TEXT_UNSET_VAR");
        assert!(result.is_none());
    }
}
