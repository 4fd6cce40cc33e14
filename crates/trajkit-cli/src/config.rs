use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use trajkit::core::dynamics::unwrap::UnwrapMethod;
use trajkit::core::topology::cutoff::CutoffTable;
use trajkit::engine::config::{
    AnalysisConfig, AnalysisConfigBuilder, FrameSelection, IdentityPolicy,
};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialDetectionConfig {
    cutoff: Option<CutoffTable>,
    #[serde(rename = "cutoff-file")]
    cutoff_file: Option<PathBuf>,
    identity: Option<IdentityPolicy>,
    #[serde(rename = "custom-names")]
    custom_names: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialUnwrapConfig {
    method: Option<UnwrapMethod>,
}

/// The analysis configuration as written in a TOML file, before CLI overrides.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAnalysisConfig {
    frames: Option<String>,
    project: Option<String>,
    detection: Option<PartialDetectionConfig>,
    unwrap: Option<PartialUnwrapConfig>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl PartialAnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| CliError::parsing(path, e))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Combines the file values with `--set` entries and explicit CLI flags.
    ///
    /// Precedence, highest first: dedicated flags, `--set`, the file.
    pub fn merge_with_cli(mut self, args: &AnalyzeArgs) -> Result<AnalysisConfig> {
        self.apply_set_values(&args.set_values)?;

        let detection = self.detection.take().unwrap_or_default();
        let unwrap = self.unwrap.take().unwrap_or_default();

        let cutoffs = match (detection.cutoff, detection.cutoff_file) {
            (Some(_), Some(_)) => {
                return Err(CliError::Config(
                    "`detection.cutoff` and `detection.cutoff-file` are mutually exclusive."
                        .to_string(),
                ));
            }
            (Some(table), None) => table,
            (None, Some(file)) => {
                let path = if file.is_absolute() {
                    file
                } else {
                    self.base_dir.join(file)
                };
                CutoffTable::load(&path).map_err(|e| CliError::parsing(&path, e))?
            }
            (None, None) => {
                return Err(CliError::Config(
                    "`detection.cutoff` or `detection.cutoff-file` is required.".to_string(),
                ));
            }
        };

        let frames = match (args.frames, self.frames.as_deref()) {
            (Some(selection), _) => selection,
            (None, Some(text)) => text
                .parse::<FrameSelection>()
                .map_err(|e| CliError::Config(format!("Invalid `frames` value: {}", e)))?,
            (None, None) => FrameSelection::All,
        };

        let builder = AnalysisConfigBuilder::new()
            .cutoffs(cutoffs)
            .frames(frames)
            .method(args.method.or(unwrap.method).unwrap_or_default())
            .identity(
                args.identity
                    .or(detection.identity)
                    .unwrap_or_default(),
            )
            .project(args.project.clone().or(self.project))
            .custom_names(detection.custom_names);

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for set_value in set_values {
            let parts: Vec<&str> = set_value.splitn(2, '=').collect();
            if parts.len() != 2 {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    set_value
                )));
            }
            let key = parts[0].trim();
            let value = parts[1].trim();
            let invalid = |e: &dyn std::fmt::Display| {
                CliError::Config(format!("Invalid value for '{}': {}", key, e))
            };

            match key {
                "frames" => {
                    value.parse::<FrameSelection>().map_err(|e| invalid(&e))?;
                    self.frames = Some(value.to_string());
                }
                "project" => self.project = Some(value.to_string()),
                "detection.cutoff" => {
                    let multiplier = value.parse::<f64>().map_err(|e| invalid(&e))?;
                    let detection = self.detection.get_or_insert_with(Default::default);
                    detection.cutoff = Some(CutoffTable::Uniform(multiplier));
                    detection.cutoff_file = None;
                }
                "detection.cutoff-file" => {
                    let detection = self.detection.get_or_insert_with(Default::default);
                    detection.cutoff_file = Some(PathBuf::from(value));
                    detection.cutoff = None;
                }
                "detection.identity" => {
                    let policy = value.parse::<IdentityPolicy>().map_err(|e| invalid(&e))?;
                    self.detection
                        .get_or_insert_with(Default::default)
                        .identity = Some(policy);
                }
                "unwrap.method" => {
                    let method = value.parse::<UnwrapMethod>().map_err(|e| invalid(&e))?;
                    self.unwrap.get_or_insert_with(Default::default).method = Some(method);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn analyze_args(config_path: &Path, extra: &[&str]) -> AnalyzeArgs {
        let mut args = vec![
            "trajkit".to_string(),
            "analyze".to_string(),
            "-i".to_string(),
            "frames.json".to_string(),
            "-o".to_string(),
            "out".to_string(),
            "-c".to_string(),
            config_path.to_str().unwrap().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        match Cli::parse_from(args).command {
            Commands::Analyze(args) => args,
            _ => panic!("Expected 'analyze' subcommand"),
        }
    }

    fn merge(path: &Path, extra: &[&str]) -> Result<AnalysisConfig> {
        PartialAnalysisConfig::from_file(path)?.merge_with_cli(&analyze_args(path, extra))
    }

    #[test]
    fn file_values_and_defaults_are_merged() {
        let dir = tempdir().unwrap();
        let path = write_config(
            &dir,
            "trajkit.toml",
            r#"
            project = "LiIonSolutions"

            [detection]
            cutoff = 1.2
            custom-names = ["EC", "PF6", "Li"]
            "#,
        );

        let config = merge(&path, &[]).unwrap();
        assert_eq!(config.cutoffs, CutoffTable::Uniform(1.2));
        assert_eq!(config.frames, FrameSelection::All);
        assert_eq!(config.method, UnwrapMethod::Hybrid);
        assert_eq!(config.identity, IdentityPolicy::Reference);
        assert_eq!(config.project.as_deref(), Some("LiIonSolutions"));
        assert_eq!(config.custom_names.unwrap().len(), 3);
    }

    #[test]
    fn per_species_cutoff_table_is_read_inline() {
        let dir = tempdir().unwrap();
        let path = write_config(
            &dir,
            "trajkit.toml",
            r#"
            frames = "0:50:5"

            [detection.cutoff]
            Li = 0.1
            C = 1.0
            O = 1.0

            [unwrap]
            method = "displacement"
            "#,
        );

        let config = merge(&path, &[]).unwrap();
        assert_eq!(
            config.cutoffs,
            CutoffTable::PerSpecies(BTreeMap::from([
                ("C".to_string(), 1.0),
                ("Li".to_string(), 0.1),
                ("O".to_string(), 1.0),
            ]))
        );
        assert_eq!(
            config.frames,
            FrameSelection::Range {
                begin: 0,
                end: Some(50),
                stride: 5
            }
        );
        assert_eq!(config.method, UnwrapMethod::Displacement);
    }

    #[test]
    fn cutoff_file_is_resolved_next_to_the_config() {
        let dir = tempdir().unwrap();
        write_config(&dir, "cutoffs.toml", "Li = 0.1\nH = 1.1\n");
        let path = write_config(
            &dir,
            "trajkit.toml",
            "[detection]\ncutoff-file = \"cutoffs.toml\"\n",
        );

        let config = merge(&path, &[]).unwrap();
        assert_eq!(config.cutoffs.multiplier("Li"), Some(0.1));
        assert_eq!(config.cutoffs.multiplier("H"), Some(1.1));
    }

    #[test]
    fn cli_flags_override_set_values_and_file() {
        let dir = tempdir().unwrap();
        let path = write_config(
            &dir,
            "trajkit.toml",
            r#"
            frames = "all"
            [detection]
            cutoff = 1.0
            [unwrap]
            method = "displacement"
            "#,
        );

        let config = merge(
            &path,
            &[
                "-S",
                "unwrap.method=heuristic",
                "detection.cutoff=0.8",
                "detection.identity=per-frame",
                "--frames",
                "3",
            ],
        )
        .unwrap();
        assert_eq!(config.method, UnwrapMethod::Heuristic);
        assert_eq!(config.cutoffs, CutoffTable::Uniform(0.8));
        assert_eq!(config.identity, IdentityPolicy::PerFrame);
        assert_eq!(config.frames, FrameSelection::Index(3));

        let config = merge(&path, &["-S", "unwrap.method=heuristic", "--method", "hybrid"]).unwrap();
        assert_eq!(config.method, UnwrapMethod::Hybrid);
    }

    #[test]
    fn missing_cutoff_is_an_error() {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, "trajkit.toml", "project = \"p\"\n");
        let err = merge(&path, &[]).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("detection.cutoff")));
    }

    #[test]
    fn cutoff_and_cutoff_file_are_exclusive() {
        let dir = tempdir().unwrap();
        let path = write_config(
            &dir,
            "trajkit.toml",
            "[detection]\ncutoff = 1.0\ncutoff-file = \"c.toml\"\n",
        );
        assert!(matches!(merge(&path, &[]), Err(CliError::Config(_))));
    }

    #[test]
    fn invalid_set_entries_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, "trajkit.toml", "[detection]\ncutoff = 1.0\n");

        let err = merge(&path, &["-S", "unwrap.method"]).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("Expected KEY=VALUE")));

        let err = merge(&path, &["-S", "unwrap.window=3"]).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("Unsupported")));

        let err = merge(&path, &["-S", "unwrap.method=spline"]).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("unwrap.method")));
    }

    #[test]
    fn unknown_fields_fail_to_parse() {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, "trajkit.toml", "[detection]\nradius = 1.0\n");
        assert!(matches!(
            PartialAnalysisConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }
}
