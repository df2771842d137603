use std::path::PathBuf;

use log::LevelFilter;

use crate::config::FrontConfig;

#[derive(clap::Parser, Debug)]
#[clap(version, about)]
pub struct MainArgs {
    /// The cartridge to start with, more can be loaded by dropping them on the window
    pub rom: Option<PathBuf>,
    /// Integer upscale factor of the display, if not provided the config's value will be used
    #[clap(short, long)]
    pub scale: Option<u32>,
    /// Directory to keep battery saves in, if not provided the config's value will be used
    #[clap(long, env = "NTH_SAVE_DIR")]
    pub save_dir: Option<PathBuf>,
    /// Log level (off, error, warn, info, debug, trace)
    #[clap(long)]
    pub log_level: Option<LevelFilter>,
}

impl MainArgs {
    /// Fold the CLI overrides into the loaded `config`.
    pub fn apply(&self, mut config: FrontConfig) -> FrontConfig {
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(save_dir) = &self.save_dir {
            config.save_dir = Some(save_dir.clone());
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        config
    }
}

/// The cartridge identity of a ROM on disk: its file name.
pub fn cartridge_identity(path: &std::path::Path) -> Option<String> {
    Some(path.file_name()?.to_string_lossy().into_owned())
}
