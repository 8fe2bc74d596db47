use anyhow::{Context, Result};
use clientsort_sort::SortOptions;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config/clientsort.json";

/// Settings file contents. Keys sit at the top level of the JSON object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub options: SortOptions,
}

impl Config {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    ///
    /// A file that cannot be parsed is moved aside to `<name>.bak` so the next
    /// save does not destroy it.
    pub fn load_from_path(path: &Path) -> Self {
        let mut config = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Config>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    let backup = sibling(path, "bak");
                    match fs::rename(path, &backup) {
                        Ok(()) => info!("Moved unreadable config to {}", backup.display()),
                        Err(err) => warn!(
                            "Failed to move {} aside: {err}",
                            path.display()
                        ),
                    }
                    Config::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("Config not found at {}. Using defaults", path.display());
                Config::default()
            }
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                Config::default()
            }
        };
        config.options.validate();
        config
    }

    /// Save configuration to an explicit path, replacing it atomically.
    pub fn save_to_path(&mut self, path: &Path) -> Result<()> {
        self.options.validate();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let temp = sibling(path, "tmp");
        fs::write(&temp, json).with_context(|| format!("Failed to write {}", temp.display()))?;
        fs::rename(&temp, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

/// `path` with `extension` appended to its file name.
fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(extension);
    path.with_file_name(name)
}
