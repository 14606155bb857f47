//! Config file loading and creation for the fieldrank CLI.
//!
//! Config lives at ~/.config/fieldrank/config.toml.
//! All fields are optional; CLI args override config values.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use fieldrank_core::{RankingMethod, SortDirection, ZeroValueHandling};

use crate::error::{CliError, Result};

/// Default number of rank updates written per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldrankConfig {
    pub source_field: Option<String>,
    pub target_field: Option<String>,
    pub group_field: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub ranking_method: Option<RankingMethod>,
    pub zero_value_handling: Option<ZeroValueHandling>,
    pub batch_size: Option<usize>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# fieldrank configuration
# All values here can be overridden by CLI flags.

# Field holding the numbers to rank
# source_field = \"Score\"

# Field that receives the rank (must differ from source_field)
# target_field = \"Rank\"

# Optional field to rank within (one ranking per distinct value)
# group_field = \"Region\"

# \"asc\" (smallest first) or \"desc\" (largest first)
# sort_direction = \"desc\"

# \"standard\" (1,2,2,4) or \"dense\" (1,2,2,3)
# ranking_method = \"standard\"

# \"skipZero\" leaves zero values unranked, \"includeZero\" ranks them
# zero_value_handling = \"skipZero\"

# Rank updates written per batch
# batch_size = 100
";

/// Returns the default config path: ~/.config/fieldrank/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| CliError::NoHome)?;
    Ok(PathBuf::from(home).join(".config").join("fieldrank").join("config.toml"))
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> Result<FieldrankConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FieldrankConfig::default()),
        Err(source) => Err(CliError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(CliError::ConfigExists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| CliError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}
