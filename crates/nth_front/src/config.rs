use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::LevelFilter;
use platform_dirs::AppDirs;

pub const CONFIG_FILE: &str = "config.json";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FrontConfig {
    /// Integer upscale factor of the LCD, must be at least `1`.
    pub scale: u32,
    /// Where battery saves are stored, defaults to the platform data directory.
    pub save_dir: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Default for FrontConfig {
    fn default() -> Self {
        Self {
            scale: nth_host::DEFAULT_SCALE,
            save_dir: None,
            log_level: LevelFilter::Info,
        }
    }
}

impl FrontConfig {
    pub fn save_dir(&self) -> PathBuf {
        self.save_dir.clone().unwrap_or_else(get_save_dir)
    }
}

/// Load the config at the default location, writing the defaults there if it doesn't exist yet.
pub fn load_config() -> anyhow::Result<FrontConfig> {
    let app_dirs = get_app_dirs()?;

    load_config_from(&app_dirs.config_dir.join(CONFIG_FILE))
}

pub fn load_config_from(path: &Path) -> anyhow::Result<FrontConfig> {
    if path.exists() {
        let file = File::open(path).with_context(|| format!("Couldn't open config at {}", path.display()))?;

        serde_json::from_reader(file).with_context(|| format!("Config at {} is malformed", path.display()))
    } else {
        let defaults = FrontConfig::default();
        log::info!("No config exists, creating default at: `{}`", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        serde_json::to_writer_pretty(File::create(path)?, &defaults)?;

        Ok(defaults)
    }
}

pub fn get_save_dir() -> PathBuf {
    match get_app_dirs() {
        Ok(dirs) => dirs.data_dir.join("saves"),
        Err(_) => PathBuf::from("./saves"),
    }
}

pub fn get_app_dirs() -> anyhow::Result<AppDirs> {
    AppDirs::new(Some("nth-boy"), false).context("Couldn't find a home directory for config!")
}
