//! Button icons
//!
//! Each action has a default and a hover icon. SVGs are handed to the
//! renderer, which rasterises them at the window's physical size. Raster
//! files are resampled here to `button_size × scale` so HiDPI screens get
//! crisp pixels. Anything that fails to load becomes a transparent square.

use iced::widget::image::Handle as ImageHandle;
use iced::widget::svg::Handle as SvgHandle;
use image::RgbaImage;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::session::SessionAction;
use crate::shell::scale;

#[derive(Debug, Error)]
pub enum IconError {
    #[error("no icon at {0:?}")]
    Missing(PathBuf),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A drawable icon
#[derive(Debug, Clone)]
pub enum Icon {
    Vector(SvgHandle),
    Raster(ImageHandle),
}

/// Default and hover icon of one button, with the files they came from
#[derive(Debug, Clone)]
pub struct IconPair {
    pub default: Icon,
    pub hover: Icon,
    pub default_path: PathBuf,
    pub hover_path: PathBuf,
}

impl IconPair {
    fn load(dir: &Path, stem: &str, px: u32) -> Self {
        let default_path = icon_path(dir, &format!("{}_default", stem));
        let hover_path = icon_path(dir, &format!("{}_hover", stem));

        Self {
            default: load_icon(&default_path, px),
            hover: load_icon(&hover_path, px),
            default_path,
            hover_path,
        }
    }

    fn reload(&mut self, px: u32) {
        self.default = load_icon(&self.default_path, px);
        self.hover = load_icon(&self.hover_path, px);
    }

    pub fn get(&self, hovered: bool) -> &Icon {
        if hovered { &self.hover } else { &self.default }
    }
}

/// Icons for every action, in display order
#[derive(Debug, Clone)]
pub struct IconSet {
    button_size: u32,
    pairs: Vec<(SessionAction, IconPair)>,
}

impl IconSet {
    pub fn load(dir: &Path, button_size: u32, scale: f32) -> Self {
        let px = scale::pixel_size(button_size, scale);
        debug!("Loading icons from {:?} at {}px", dir, px);

        let pairs = SessionAction::ALL
            .iter()
            .map(|&action| (action, IconPair::load(dir, action.icon_stem(), px)))
            .collect();

        Self { button_size, pairs }
    }

    /// Reload every icon from its source file for a new render scale
    pub fn rescale(&mut self, scale: f32) {
        let px = scale::pixel_size(self.button_size, scale);
        debug!("Reloading icons at {}px", px);

        for (_, pair) in &mut self.pairs {
            pair.reload(px);
        }
    }

    pub fn pair(&self, action: SessionAction) -> Option<&IconPair> {
        self.pairs
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, pair)| pair)
    }
}

/// Pick `<dir>/<name>.svg`, else `<dir>/<name>.png`.
///
/// When neither exists the SVG path is returned so the failure names it.
pub fn icon_path(dir: &Path, name: &str) -> PathBuf {
    let svg = dir.join(format!("{}.svg", name));
    if svg.is_file() {
        return svg;
    }

    let png = dir.join(format!("{}.png", name));
    if png.is_file() { png } else { svg }
}

/// Load the icon at `path`, falling back to a placeholder
pub fn load_icon(path: &Path, px: u32) -> Icon {
    match try_load(path, px) {
        Ok(icon) => icon,
        Err(e) => {
            warn!("Failed to load icon: {}", e);
            Icon::Raster(placeholder(px))
        }
    }
}

fn try_load(path: &Path, px: u32) -> Result<Icon, IconError> {
    if !path.is_file() {
        return Err(IconError::Missing(path.to_path_buf()));
    }

    if path.extension().is_some_and(|ext| ext == "svg") {
        let bytes = std::fs::read(path).map_err(|source| IconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(Icon::Vector(SvgHandle::from_memory(bytes)));
    }

    let pixels = rasterize(path, px)?;
    Ok(Icon::Raster(ImageHandle::from_rgba(
        pixels.width(),
        pixels.height(),
        pixels.into_raw(),
    )))
}

/// Decode a raster file and resample it to a `px × px` square
pub fn rasterize(path: &Path, px: u32) -> Result<RgbaImage, IconError> {
    let decoded = image::open(path).map_err(|source| IconError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decoded.resize_exact(px, px, FilterType::Triangle).to_rgba8())
}

/// Fully transparent `px × px` square
fn placeholder(px: u32) -> ImageHandle {
    ImageHandle::from_rgba(px, px, placeholder_pixels(px))
}

fn placeholder_pixels(px: u32) -> Vec<u8> {
    vec![0; (px as usize) * (px as usize) * 4]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, w: u32, h: u32) {
        RgbaImage::from_pixel(w, h, image::Rgba([200, 30, 30, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_rasterize_resamples_to_square() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock_default.png");
        write_png(&path, 32, 16);

        let pixels = rasterize(&path, 105).unwrap();
        assert_eq!(pixels.dimensions(), (105, 105));
        assert_eq!(pixels.get_pixel(50, 50).0[3], 255);
    }

    #[test]
    fn test_rasterize_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        assert!(matches!(
            rasterize(&path, 70),
            Err(IconError::Decode { .. })
        ));
    }

    #[test]
    fn test_prefers_svg_over_png() {
        let dir = tempfile::tempdir().unwrap();
        let svg = dir.path().join("reboot_default.svg");
        std::fs::write(
            &svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#,
        )
        .unwrap();
        write_png(&dir.path().join("reboot_default.png"), 4, 4);

        assert_eq!(icon_path(dir.path(), "reboot_default"), svg);
        assert!(matches!(try_load(&svg, 70), Ok(Icon::Vector(_))));
    }

    #[test]
    fn test_png_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("logout_hover.png");
        write_png(&png, 8, 8);

        assert_eq!(icon_path(dir.path(), "logout_hover"), png);
        assert!(matches!(try_load(&png, 140), Ok(Icon::Raster(_))));
    }

    #[test]
    fn test_missing_icon_becomes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = icon_path(dir.path(), "cancel_default");
        assert_eq!(path, dir.path().join("cancel_default.svg"));

        assert!(matches!(
            try_load(&path, 70),
            Err(IconError::Missing(p)) if p == path
        ));
        assert!(matches!(load_icon(&path, 70), Icon::Raster(_)));
        assert_eq!(placeholder_pixels(70).len(), 70 * 70 * 4);
        assert!(placeholder_pixels(2).iter().all(|b| *b == 0));
    }

    #[test]
    fn test_pair_keeps_source_paths_across_rescale() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("lock_default.png"), 8, 8);
        write_png(&dir.path().join("lock_hover.png"), 8, 8);

        let mut set = IconSet::load(dir.path(), 70, 1.0);
        set.rescale(2.0);

        let pair = set.pair(SessionAction::Lock).unwrap();
        assert_eq!(pair.default_path, dir.path().join("lock_default.png"));
        assert_eq!(pair.hover_path, dir.path().join("lock_hover.png"));
        assert!(matches!(pair.get(false), Icon::Raster(_)));
    }

    #[test]
    fn test_shipped_icons_are_vectors() {
        let dir = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/icons"));
        let set = IconSet::load(dir, 70, 2.0);
        for action in SessionAction::ALL {
            let pair = set.pair(action).unwrap();
            assert!(matches!(pair.get(false), Icon::Vector(_)));
            assert!(matches!(pair.get(true), Icon::Vector(_)));
        }
    }

    #[test]
    fn test_icon_set_covers_every_action() {
        let dir = tempfile::tempdir().unwrap();
        let set = IconSet::load(dir.path(), 70, 1.0);
        for action in SessionAction::ALL {
            assert!(set.pair(action).is_some(), "{:?} has no icons", action);
        }
    }
}
