use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{Args, Direction, ModeArg, OutputFormat};
use crate::slicing::{SliceAxis, SliceModeKind};

/// Directory name used under the platform config directory
pub const APP_DIR_NAME: &str = "E-IMG Slices";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Saved preferences. Every field is optional so older or partial files still load.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jpeg_quality: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

/// `<config dir>/E-IMG Slices/config.json`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl Preferences {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load preferences, treating a missing file as empty.
    ///
    /// A file that exists but cannot be read or parsed also yields defaults;
    /// the error is returned alongside so the caller can warn about it.
    pub fn load_or_default(path: &Path) -> (Self, Option<anyhow::Error>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load(path) {
            Ok(preferences) => (preferences, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {:?}", parent)
                })?;
            }
        }

        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize preferences")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// Snapshot of the effective settings of a run.
    ///
    /// The output directory is only stored when one was chosen; the fallback to
    /// the image's own directory is resolved again on every run.
    pub fn from_args(args: &Args) -> Self {
        Self {
            output_path: args.output_dir.as_ref().map(|dir| dir.display().to_string()),
            base_name: Some(args.base_name()),
            format: Some(args.output_format().extension().to_string()),
            direction: Some(args.axis().to_string()),
            mode: Some(args.mode_kind().to_string()),
            value: args.slice_value().ok(),
            jpeg_quality: Some(args.jpeg_quality()),
            jobs: args.jobs,
        }
    }
}

impl Args {
    /// Preferences file to use for this run, if any
    pub fn config_path(&self) -> Option<PathBuf> {
        if self.no_config {
            return None;
        }
        self.config_file.clone().or_else(default_config_path)
    }

    /// Fill settings not given on the command line from saved preferences.
    /// Command-line arguments take precedence over config file values.
    ///
    /// Returns a warning for every preference that was present but unusable.
    pub fn merge_preferences(&mut self, preferences: Preferences) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.output_dir.is_none() {
            if let Some(output) = preferences.output_path {
                self.output_dir = Some(PathBuf::from(output));
            }
        }

        if self.name.is_none() {
            self.name = preferences.base_name;
        }

        if self.format.is_none() {
            if let Some(format) = preferences.format {
                match format.parse::<OutputFormat>() {
                    Ok(parsed) => self.format = Some(parsed),
                    Err(_) => warnings.push(format!("Ignoring unknown format '{}'", format)),
                }
            }
        }

        if self.direction.is_none() {
            if let Some(direction) = preferences.direction {
                match direction.parse::<SliceAxis>() {
                    Ok(axis) => self.direction = Some(Direction::from(axis)),
                    Err(_) => {
                        warnings.push(format!("Ignoring unknown direction '{}'", direction))
                    }
                }
            }
        }

        if self.mode.is_none() {
            if let Some(mode) = preferences.mode {
                match mode.parse::<SliceModeKind>() {
                    Ok(kind) => self.mode = Some(ModeArg::from(kind)),
                    Err(_) => warnings.push(format!("Ignoring unknown mode '{}'", mode)),
                }
            }
        }

        if self.value.is_none() {
            self.value = preferences.value.map(|value| value.to_string());
        }

        if self.quality.is_none() {
            if let Some(quality) = preferences.jpeg_quality {
                if (1..=100).contains(&quality) {
                    self.quality = Some(quality);
                } else {
                    warnings.push(format!("Ignoring out-of-range JPEG quality {}", quality));
                }
            }
        }

        if self.jobs.is_none() {
            self.jobs = preferences.jobs;
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicing::SliceMode;
    use clap::Parser;

    #[test]
    fn test_command_line_wins() {
        let mut args = Args::try_parse_from([
            "eimg-slices",
            "-i",
            "a.png",
            "--mode",
            "count",
            "--value",
            "4",
        ])
        .unwrap();

        let warnings = args.merge_preferences(Preferences {
            mode: Some("size".to_string()),
            value: Some(120),
            direction: Some("horizontal".to_string()),
            base_name: Some("strip".to_string()),
            ..Default::default()
        });

        assert!(warnings.is_empty());
        assert_eq!(args.slice_mode().unwrap(), SliceMode::ByCount(4));
        assert_eq!(args.axis(), SliceAxis::Horizontal);
        assert_eq!(args.base_name(), "strip");
    }

    #[test]
    fn test_unknown_values_are_reported() {
        let mut args = Args::default();
        let warnings = args.merge_preferences(Preferences {
            format: Some("gif".to_string()),
            direction: Some("diagonal".to_string()),
            jpeg_quality: Some(0),
            ..Default::default()
        });

        assert_eq!(warnings.len(), 3);
        assert_eq!(args.format, None);
        assert_eq!(args.direction, None);
        assert_eq!(args.quality, None);
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{ "outputPath": "/tmp/out", "jpegQuality": 80, "baseName": "x" }"#;
        let preferences: Preferences = serde_json::from_str(json).unwrap();
        assert_eq!(preferences.output_path.as_deref(), Some("/tmp/out"));
        assert_eq!(preferences.jpeg_quality, Some(80));
        assert_eq!(preferences.base_name.as_deref(), Some("x"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let args = Args {
            value: Some("64".to_string()),
            format: Some(OutputFormat::Png),
            ..Default::default()
        };
        let preferences = Preferences::from_args(&args);
        preferences.save(&path).unwrap();

        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded, preferences);
        assert_eq!(loaded.value, Some(64));
        assert_eq!(loaded.format.as_deref(), Some("png"));
        assert_eq!(loaded.direction.as_deref(), Some("vertical"));
        assert_eq!(loaded.mode.as_deref(), Some("size"));
    }

    #[test]
    fn test_image_directory_fallback_is_not_saved() {
        let first = Args {
            input: PathBuf::from("photos/a.png"),
            value: Some("10".to_string()),
            ..Default::default()
        };
        let preferences = Preferences::from_args(&first);
        assert_eq!(preferences.output_path, None);

        let mut second = Args {
            input: PathBuf::from("other/b.png"),
            ..Default::default()
        };
        second.merge_preferences(preferences);
        assert_eq!(second.resolved_output_dir(), PathBuf::from("other"));
        assert_eq!(second.slice_value().unwrap(), 10);
    }

    #[test]
    fn test_chosen_output_dir_is_saved() {
        let args = Args {
            input: PathBuf::from("photos/a.png"),
            output_dir: Some(PathBuf::from("exports")),
            ..Default::default()
        };
        let preferences = Preferences::from_args(&args);
        assert_eq!(preferences.output_path.as_deref(), Some("exports"));

        let mut next = Args {
            input: PathBuf::from("other/b.png"),
            ..Default::default()
        };
        next.merge_preferences(preferences);
        assert_eq!(next.resolved_output_dir(), PathBuf::from("exports"));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let (preferences, error) = Preferences::load_or_default(&path);
        assert_eq!(preferences, Preferences::default());
        assert!(error.is_some());

        let (_, error) = Preferences::load_or_default(&dir.path().join("missing.json"));
        assert!(error.is_none());
    }

    #[test]
    fn test_no_config_disables_lookup() {
        let args = Args {
            no_config: true,
            ..Default::default()
        };
        assert_eq!(args.config_path(), None);

        let args = Args {
            config_file: Some(PathBuf::from("custom.json")),
            ..Default::default()
        };
        assert_eq!(args.config_path(), Some(PathBuf::from("custom.json")));
    }
}
