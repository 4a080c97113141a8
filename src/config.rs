use std::collections::HashMap;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::db::models::{Coverage, SourceType};

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Custom database path (overrides XDG default).
    pub db_path: Option<PathBuf>,
    /// Number of parallel workers. 0 = auto-detect (cores / 2, min 1).
    pub workers: usize,
    /// Normalization and analysis thresholds.
    pub thresholds: Thresholds,
    /// Coverage classification rules applied at ingest.
    pub coverage: CoverageRules,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            workers: 0,
            thresholds: Thresholds::default(),
            coverage: CoverageRules::default(),
        }
    }
}

/// Coverage classification rules. Precedence is a strict total order:
/// per-release override, then the scraped tag, then the source-type
/// category default, then `unknown`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CoverageRules {
    /// Per-release overrides keyed on the source-specific recording id.
    pub releases: HashMap<String, Coverage>,
    /// Category defaults per source type, used when the scraped record
    /// carries no usable tag.
    pub source_defaults: HashMap<SourceType, Coverage>,
}

impl CoverageRules {
    /// Resolve a recording's coverage from the rule chain.
    pub fn resolve(&self, source_id: &str, source_type: SourceType, scraped: Coverage) -> Coverage {
        if let Some(&c) = self.releases.get(source_id) {
            return c;
        }
        if scraped != Coverage::Unknown {
            return scraped;
        }
        self.source_defaults
            .get(&source_type)
            .copied()
            .unwrap_or(Coverage::Unknown)
    }
}

/// Tunable pipeline thresholds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Fuzzy similarity at or above this binds a title automatically.
    pub fuzzy_auto: f64,
    /// Fuzzy similarity at or above this (below auto) binds provisionally
    /// and queues the match for review.
    pub fuzzy_flag: f64,
    /// Facts more than this many standard deviations from the song mean
    /// are flagged as outliers (never removed).
    pub outlier_sigma: f64,
    /// Minimum eligible shows before a song gets stats and outlier flags.
    pub min_samples: usize,
    /// Songs below this track count (and absent from the built-in catalog)
    /// are pruned after resolution.
    pub rare_song_min_tracks: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fuzzy_auto: 0.85,
            fuzzy_flag: 0.65,
            outlier_sigma: 3.0,
            min_samples: 3,
            rare_song_min_tracks: 3,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/showtimings/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match config_path {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Resolve worker count: 0 → auto-detect (cores / 2, min 1).
    pub fn resolve_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            let cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2);
            (cores / 2).max(1)
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Resolve the default database path using XDG data directory.
pub fn default_db_path() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", crate::APP_NAME) {
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).ok();
        data_dir.join("showtimings.db")
    } else {
        // Fallback: current directory
        PathBuf::from("showtimings.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_match_pipeline_contract() {
        let t = Thresholds::default();
        assert_eq!(t.fuzzy_auto, 0.85);
        assert_eq!(t.fuzzy_flag, 0.65);
        assert_eq!(t.outlier_sigma, 3.0);
        assert_eq!(t.min_samples, 3);
    }

    #[test]
    fn resolve_workers_explicit_wins() {
        let cfg = AppConfig {
            workers: 5,
            ..Default::default()
        };
        assert_eq!(cfg.resolve_workers(), 5);
    }

    #[test]
    fn resolve_workers_auto_is_at_least_one() {
        let cfg = AppConfig::default();
        assert!(cfg.resolve_workers() >= 1);
    }

    #[test]
    fn coverage_precedence_is_total() {
        let mut rules = CoverageRules::default();
        rules.releases.insert("dp12".to_string(), Coverage::Complete);
        rules
            .source_defaults
            .insert(SourceType::ArchivalAudioSource, Coverage::Unedited);

        // Release override beats everything, even a scraped tag
        assert_eq!(
            rules.resolve("dp12", SourceType::ArchivalAudioSource, Coverage::Edited),
            Coverage::Complete
        );
        // Scraped tag beats the category default
        assert_eq!(
            rules.resolve("other", SourceType::ArchivalAudioSource, Coverage::Edited),
            Coverage::Edited
        );
        // Category default fills an unknown tag
        assert_eq!(
            rules.resolve("other", SourceType::ArchivalAudioSource, Coverage::Unknown),
            Coverage::Unedited
        );
        // No rule at all stays unknown
        assert_eq!(
            rules.resolve("other", SourceType::PrimaryTextSource, Coverage::Unknown),
            Coverage::Unknown
        );
    }

    #[test]
    fn coverage_rules_parse_from_toml() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [coverage.releases]
            "gd77-05-08.sbd.hicks.4982" = "complete"

            [coverage.source_defaults]
            structured_metadata_source = "unedited"
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.coverage.releases["gd77-05-08.sbd.hicks.4982"],
            Coverage::Complete
        );
        assert_eq!(
            cfg.coverage.source_defaults[&SourceType::StructuredMetadataSource],
            Coverage::Unedited
        );
    }
}
