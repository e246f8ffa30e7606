//! Configuration for the exit dialog
//!
//! There is no config file. Built-in defaults can be overridden through
//! `EXIT_OPTIONS_ICONS_DIR` and `EXIT_OPTIONS_LOCK_WALLPAPER`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment override for the icon directory
pub const ICONS_DIR_VAR: &str = "EXIT_OPTIONS_ICONS_DIR";

/// Environment override for the i3lock wallpaper
pub const LOCK_WALLPAPER_VAR: &str = "EXIT_OPTIONS_LOCK_WALLPAPER";

/// Icons shipped with the source tree, for running from a checkout
const SOURCE_ICONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/icons");

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `<action>_default.svg` / `<action>_hover.svg`
    pub icons_dir: PathBuf,
    /// Image passed to `i3lock -i` when it exists
    pub lock_wallpaper: PathBuf,
    pub layout: LayoutConfig,
}

impl Config {
    /// Build configuration from defaults and the process environment
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        let config = Self::resolve(
            |key| std::env::var(key).ok(),
            &home,
            exe_dir.as_deref(),
            dirs::data_dir().as_deref(),
        );

        info!("Icons directory: {:?}", config.icons_dir);
        debug!("Config: {:?}", config);
        Ok(config)
    }

    /// Resolve paths from an environment lookup and the candidate locations.
    ///
    /// The first existing icon directory wins: next to the executable, the
    /// XDG data directory, then the icons shipped in the source tree.
    /// Empty overrides are ignored.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        home: &Path,
        exe_dir: Option<&Path>,
        data_dir: Option<&Path>,
    ) -> Self {
        let override_path = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };

        let installed = data_dir.unwrap_or(home).join("exit-options").join("icons");
        let icons_dir = override_path(ICONS_DIR_VAR).unwrap_or_else(|| {
            let candidates = [
                exe_dir.map(|dir| dir.join("icons")),
                Some(installed.clone()),
                Some(PathBuf::from(SOURCE_ICONS_DIR)),
            ];
            candidates
                .into_iter()
                .flatten()
                .find(|dir| dir.is_dir())
                .unwrap_or(installed)
        });

        let lock_wallpaper = override_path(LOCK_WALLPAPER_VAR).unwrap_or_else(|| {
            home.join(".local/share/backgrounds/lock_wallpaper_4K.png")
        });

        Self {
            icons_dir,
            lock_wallpaper,
            layout: LayoutConfig::default(),
        }
    }
}

/// Window and button geometry, in logical pixels
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub window_width: f32,
    pub window_height: f32,
    /// Edge length of each icon
    pub button_size: u32,
    /// Gap between icons
    pub spacing: f32,
    pub margin_vertical: f32,
    pub margin_horizontal: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            window_width: 500.0,
            window_height: 80.0,
            button_size: 70,
            spacing: 40.0,
            margin_vertical: 8.0,
            margin_horizontal: 12.0,
        }
    }
}
