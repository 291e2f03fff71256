// -- imports
use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::predict::RecognizeArgs;

// -- config

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TomlConfig {
    recognition: RecognizeArgs,
}

impl TomlConfig {
    /// Parse TOML config file with explicit project root for path resolution.
    ///
    /// # Arguments
    ///
    /// * `toml_path` - Path to the TOML config file
    /// * `project_root` - Base directory for resolving relative paths
    ///
    /// # Errors
    ///
    /// Returns `AppError` if:
    /// - The path is not a valid toml file
    /// - File read fails
    /// - TOML parsing fails
    pub fn from_toml(toml_path: &Path, project_root: &Path) -> Result<Self> {
        if !toml_path.is_file() || toml_path.extension().is_none_or(|ext| ext != "toml") {
            return Err(AppError::Config(format!(
                "TOML config path is not a valid .toml file: {:?}",
                toml_path
            )));
        }

        let content = std::fs::read_to_string(toml_path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.resolve_paths(project_root);

        Ok(config)
    }

    /// Resolve relative paths against project root
    fn resolve_paths(&mut self, project_root: &Path) {
        let args = &mut self.recognition;

        // empty stays empty so validation can report it
        if !args.training_set.as_os_str().is_empty() && !args.training_set.is_absolute() {
            args.training_set = project_root.join(&args.training_set);
        }

        // unset means the process working directory, not the project root
        if let Some(save_dir) = &mut args.save_dir {
            if !save_dir.is_absolute() {
                *save_dir = project_root.join(&*save_dir);
            }
        }
    }
}

impl From<TomlConfig> for RecognizeArgs {
    fn from(config: TomlConfig) -> Self {
        config.recognition
    }
}

// -- public API

/// Parse TOML config file and return validated RecognizeArgs.
///
/// # Arguments
///
/// * `toml_path` - Path to the TOML config file
/// * `project_root` - Base directory for resolving relative paths
///
/// # Errors
///
/// Returns `AppError` if TOML parsing fails or a required option is missing.
pub fn parse_toml(toml_path: &Path, project_root: &Path) -> Result<RecognizeArgs> {
    let args: RecognizeArgs = TomlConfig::from_toml(toml_path, project_root)?.into();
    args.validate()?;
    Ok(args)
}

// -- tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Algorithm;
    use crate::infer_fn::RunMode;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_from_toml_with_custom_values() {
        let temp_dir = TempDir::new().unwrap();
        let toml_path = temp_dir.path().join("config.toml");
        let toml_content = r#"
[recognition]
training_set = "faces"
algorithm = "LBPH"
save_images = false
save_dir = "/tmp/recognised"
run_mode = "ChannelPipeline"
workers = 4
channel_capacity = 16
verbose = true
"#;
        fs::write(&toml_path, toml_content).unwrap();

        let config = TomlConfig::from_toml(&toml_path, temp_dir.path()).unwrap();
        let args = config.recognition;

        assert_eq!(args.training_set, temp_dir.path().join("faces"));
        assert_eq!(args.algorithm, Algorithm::Lbph);
        assert!(!args.save_images);
        assert_eq!(args.save_dir, Some(PathBuf::from("/tmp/recognised")));
        assert_eq!(args.run_mode, RunMode::ChannelPipeline);
        assert_eq!(args.workers, 4);
        assert_eq!(args.channel_capacity, Some(16));
        assert!(args.verbose);
    }

    #[test]
    fn test_parse_toml_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let toml_path = temp_dir.path().join("config.toml");
        fs::write(&toml_path, "[recognition]\ntraining_set = \"faces\"\n").unwrap();

        let args = parse_toml(&toml_path, temp_dir.path()).unwrap();

        assert_eq!(args.algorithm, Algorithm::Fisher);
        assert!(args.save_images);
        assert_eq!(args.save_dir, None);
        assert_eq!(args.frame_dir(), Path::new(""));
        assert_eq!(args.run_mode, RunMode::Sequential);
    }

    #[test]
    fn test_unset_save_dir_ignores_project_root() {
        let temp_dir = TempDir::new().unwrap();
        let toml_path = temp_dir.path().join("config.toml");
        fs::write(&toml_path, "[recognition]\ntraining_set = \"faces\"\n").unwrap();

        let args = parse_toml(&toml_path, Path::new("/build/machine/src")).unwrap();

        assert_eq!(args.training_set, PathBuf::from("/build/machine/src/faces"));
        assert_eq!(args.frame_dir(), Path::new(""));
    }

    #[test]
    fn test_relative_save_dir_resolves_against_project_root() {
        let temp_dir = TempDir::new().unwrap();
        let toml_path = temp_dir.path().join("config.toml");
        fs::write(
            &toml_path,
            "[recognition]\ntraining_set = \"faces\"\nsave_dir = \"results\"\n",
        )
        .unwrap();

        let args = parse_toml(&toml_path, temp_dir.path()).unwrap();

        assert_eq!(args.save_dir, Some(temp_dir.path().join("results")));
    }

    #[test]
    fn test_parse_toml_missing_training_set() {
        let temp_dir = TempDir::new().unwrap();
        let toml_path = temp_dir.path().join("config.toml");
        fs::write(&toml_path, "[recognition]\nalgorithm = \"Eigen\"\n").unwrap();

        let err = parse_toml(&toml_path, temp_dir.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_parse_toml_unknown_algorithm() {
        let temp_dir = TempDir::new().unwrap();
        let toml_path = temp_dir.path().join("config.toml");
        fs::write(
            &toml_path,
            "[recognition]\ntraining_set = \"faces\"\nalgorithm = \"lbph\"\n",
        )
        .unwrap();

        let err = parse_toml(&toml_path, temp_dir.path()).unwrap_err();
        match err {
            AppError::TomlConfig(e) => assert!(e.to_string().contains("one of Fisher, Eigen, LBPH")),
            other => panic!("Expected TomlConfig error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_toml_invalid_path() {
        let invalid_path = PathBuf::from("/nonexistent/config.toml");
        let project_root = PathBuf::from("/tmp");
        assert!(TomlConfig::from_toml(&invalid_path, &project_root).is_err());
    }

    #[test]
    fn test_from_toml_invalid_extension() {
        let temp_dir = TempDir::new().unwrap();
        let invalid_path = temp_dir.path().join("config.txt");
        fs::write(&invalid_path, "[recognition]\ntraining_set = \"faces\"\n").unwrap();
        assert!(TomlConfig::from_toml(&invalid_path, temp_dir.path()).is_err());
    }

    #[test]
    fn test_parse_toml_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let invalid_toml_path = temp_dir.path().join("invalid.toml");
        fs::write(&invalid_toml_path, "invalid toml [[[").unwrap();
        assert!(parse_toml(&invalid_toml_path, temp_dir.path()).is_err());
    }
}
