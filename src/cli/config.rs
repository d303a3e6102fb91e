// FILE: src/cli/config.rs

use crate::analysis::AnalyzerOptions;
use crate::cli::OutputFormat;
use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extra_builtins: Option<Vec<String>>,
    pub expression_types: Option<Vec<String>>,
    pub extra_static_types: Option<Vec<String>>,
    pub format: Option<OutputFormat>,
}

impl ConfigFile {
    /// Analyzer options with every configured table applied over the defaults
    pub fn analyzer_options(&self) -> AnalyzerOptions {
        let mut options = AnalyzerOptions::default();
        if let Some(builtins) = &self.extra_builtins {
            options.extra_builtins = builtins.clone();
        }
        if let Some(types) = &self.expression_types {
            options.expression_types = types.clone();
        }
        if let Some(types) = &self.extra_static_types {
            options.extra_static_types = types.clone();
        }
        options
    }
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    let config_content = fs::read_to_string(config_path).map_err(|e| ScanError::FileNotFound {
        path: format!("Config file {}: {}", config_path, e),
    })?;

    let config: ConfigFile = if config_path.ends_with(".json") {
        serde_json::from_str(&config_content).map_err(|e| ScanError::InvalidFormat {
            message: format!("Invalid JSON config: {}", e),
        })?
    } else if config_path.ends_with(".toml") {
        toml::from_str(&config_content).map_err(|e| ScanError::InvalidFormat {
            message: format!("Invalid TOML config: {}", e),
        })?
    } else {
        return Err(ScanError::InvalidFormat {
            message: "Config file must be .json or .toml format".to_string(),
        });
    };

    if matches!(&config.expression_types, Some(types) if types.is_empty()) {
        return Err(ScanError::config(
            "expression_types must name at least one schema type",
        ));
    }

    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_toml() {
        let file = config_file(
            ".toml",
            "extra_builtins = [\"locale\"]\nexpression_types = [\"expressionField\", \"formula\"]\nformat = \"json\"\n",
        );
        let config = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.format, Some(OutputFormat::Json));

        let options = config.analyzer_options();
        assert!(options.is_builtin("locale"));
        assert!(options.is_expression_type("formula"));
        assert!(options.extra_static_types.is_empty());
    }

    #[test]
    fn test_load_json() {
        let file = config_file(".json", r#"{"extra_static_types": ["qrcode"]}"#);
        let config = load(file.path().to_str().unwrap()).unwrap();
        let options = config.analyzer_options();
        assert!(options.is_static_type("qrcode"));
        assert!(options.is_expression_type("expressionField"));
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let file = config_file(".yaml", "format: text");
        let err = load(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidFormat { .. }));
    }

    #[test]
    fn test_rejects_empty_expression_types() {
        let file = config_file(".toml", "expression_types = []\n");
        let err = load(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ScanError::Config { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load("/nonexistent/exprscan.toml").unwrap_err();
        assert!(matches!(err, ScanError::FileNotFound { .. }));
    }
}
