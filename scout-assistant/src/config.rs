// Configuration loading and parsing (club.toml, ratings.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::position::PositionKey;
use crate::rating::{CategoryWeights, WeightTable};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub club: ClubConfig,
    pub ratings: RatingsConfig,
    pub db_path: String,
    pub data_paths: DataPaths,
    pub default_squad: Option<String>,
}

// ---------------------------------------------------------------------------
// club.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[club]` table in club.toml.
#[derive(Debug, Clone, Deserialize)]
struct ClubFile {
    club: ClubConfig,
}

/// The club whose weight table drives every rating.
#[derive(Debug, Clone, Deserialize)]
pub struct ClubConfig {
    /// Key used to look up club-specific weights in the store.
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// ratings.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire ratings.toml file.
#[derive(Debug, Clone, Deserialize)]
struct RatingsFile {
    #[serde(default)]
    ratings: RawRatingsSection,
    database: DatabaseSection,
    #[serde(default)]
    data: DataPaths,
    #[serde(default)]
    squad: SquadSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawRatingsSection {
    #[serde(default)]
    overrides: Vec<RawWeightOverride>,
}

/// Position is kept as text here so that abbreviations ("CB") and names
/// ("centre_back") are both accepted and typos surface as validation errors.
#[derive(Debug, Clone, Deserialize)]
struct RawWeightOverride {
    position: String,
    weights: CategoryWeights,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SquadSection {
    default: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataPaths {
    /// Optional CSV roster; when unset the roster comes from the database.
    pub roster: Option<String>,
    /// Optional squads seed file written to the database by `scoutdesk seed`
    /// or when the database holds no squads.
    pub squads: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightOverride {
    pub position: PositionKey,
    pub weights: CategoryWeights,
}

#[derive(Debug, Clone, Default)]
pub struct RatingsConfig {
    pub overrides: Vec<WeightOverride>,
}

impl RatingsConfig {
    /// Lay the configured overrides over `base`.
    pub fn apply(&self, base: &WeightTable) -> WeightTable {
        base.with_overrides(self.overrides.iter().map(|o| (o.position, &o.weights)))
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/club.toml` and
/// `config/ratings.toml`, relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- club.toml (required) ---
    let club_path = config_dir.join("club.toml");
    let club_text = read_file(&club_path)?;
    let club_file: ClubFile = toml::from_str(&club_text).map_err(|e| ConfigError::ParseError {
        path: club_path.clone(),
        source: e,
    })?;

    // --- ratings.toml (required) ---
    let ratings_path = config_dir.join("ratings.toml");
    let ratings_text = read_file(&ratings_path)?;
    let ratings_file: RatingsFile =
        toml::from_str(&ratings_text).map_err(|e| ConfigError::ParseError {
            path: ratings_path.clone(),
            source: e,
        })?;

    let ratings = parse_overrides(ratings_file.ratings.overrides)?;

    let config = Config {
        club: club_file.club,
        ratings,
        db_path: ratings_file.database.path,
        data_paths: ratings_file.data,
        default_squad: ratings_file.squad.default,
    };

    validate(&config)?;

    Ok(config)
}

/// Files `load_config_from` reads from `config/`.
const CONFIG_FILES: [&str; 2] = ["club.toml", "ratings.toml"];

/// Copy each missing config file from `defaults/` into `config/`. Files that
/// already exist are left as they are. Returns the files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");
    let mut copied = Vec::new();

    for name in CONFIG_FILES {
        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        let source = defaults_dir.join(name);
        if !source.is_file() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "{} is missing and there is no default at {}",
                    target.display(),
                    source.display()
                ),
            });
        }
        std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create config directory: {e}"),
        })?;
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {}: {e}", source.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn parse_overrides(raw: Vec<RawWeightOverride>) -> Result<RatingsConfig, ConfigError> {
    let mut overrides: Vec<WeightOverride> = Vec::with_capacity(raw.len());
    for (i, o) in raw.into_iter().enumerate() {
        let position: PositionKey =
            o.position
                .parse()
                .map_err(|message: String| ConfigError::ValidationError {
                    field: format!("ratings.overrides[{i}].position"),
                    message,
                })?;
        if overrides.iter().any(|existing| existing.position == position) {
            return Err(ConfigError::ValidationError {
                field: format!("ratings.overrides[{i}].position"),
                message: format!("duplicate override for {}", position.name()),
            });
        }
        overrides.push(WeightOverride {
            position,
            weights: o.weights,
        });
    }
    Ok(RatingsConfig { overrides })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.club.id.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "club.id".into(),
            message: "must not be empty".into(),
        });
    }

    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    for o in &config.ratings.overrides {
        let field = format!("ratings.overrides.{}", o.position.name());
        if o.weights.is_empty() {
            return Err(ConfigError::ValidationError {
                field,
                message: "must list at least one metric weight".into(),
            });
        }
        for mw in o.weights.iter() {
            if !mw.weight.is_finite() || mw.weight < 0.0 {
                return Err(ConfigError::ValidationError {
                    field: format!("{field}.{}", mw.metric),
                    message: format!("must be finite and >= 0, got {}", mw.weight),
                });
            }
        }
        if o.weights.iter().all(|mw| mw.weight == 0.0) {
            return Err(ConfigError::ValidationError {
                field,
                message: "at least one weight must be > 0".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
