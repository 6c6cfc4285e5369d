//! Reading and writing the YAML model configuration

use super::schema::ModelConfig;
use super::validate::validate_config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Load a model configuration from a YAML file and validate it
///
/// # Example
///
/// ```no_run
/// use pronostico::config::load_config;
///
/// let config = load_config("titanic_config.yaml")?;
/// println!("epochs = {}", config.trainer.epochs);
/// # Ok::<(), pronostico::Error>(())
/// ```
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<ModelConfig> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;

    parse_config(&yaml_content)
}

/// Parse and validate a YAML model configuration
pub fn parse_config(yaml: &str) -> Result<ModelConfig> {
    let config: ModelConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))?;

    validate_config(&config).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;

    Ok(config)
}

/// Write a model configuration to a YAML file
pub fn save_config<P: AsRef<Path>>(config: &ModelConfig, path: P) -> Result<()> {
    let yaml = serde_yaml::to_string(config)
        .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?;
    fs::write(path.as_ref(), yaml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builder::titanic_config;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_config() {
        let yaml = r#"
input_features:
  - name: Pclass
    type: category
  - name: Fare
    type: number
output_features:
  - name: Survived
    type: binary
trainer:
  epochs: 3
  batch_size: 8
  learning_rate: 0.01
  optimizer:
    type: adam
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.trainer.optimizer.kind, "adam");
        assert_eq!(config.trainer.batch_size, 8);
        assert_eq!(config.input_features.len(), 2);
    }

    #[test]
    fn test_load_invalid_config() {
        let yaml = r#"
input_features:
  - name: Fare
    type: number
output_features:
  - name: Survived
    type: binary
trainer:
  epochs: 3
  batch_size: 0
  learning_rate: 0.01
  optimizer:
    type: adam
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_malformed_yaml() {
        let result = parse_config("this is not valid yaml: [}");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_save_writes_expected_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("titanic_config.yaml");
        save_config(&titanic_config(), &path).unwrap();

        let raw: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("input_features").is_some());
        assert!(raw.get("output_features").is_some());
        let trainer = raw.get("trainer").unwrap();
        assert_eq!(trainer.get("epochs").and_then(|v| v.as_u64()), Some(10));
        assert_eq!(trainer.get("batch_size").and_then(|v| v.as_u64()), Some(32));
        assert_eq!(
            trainer
                .get("optimizer")
                .and_then(|o| o.get("type"))
                .and_then(|t| t.as_str()),
            Some("adam")
        );

        assert_eq!(load_config(&path).unwrap(), titanic_config());
    }
}
