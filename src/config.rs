/// External configuration loader.
///
/// Reads `config.toml` from `--config`, the executable's directory, the CWD
/// or `~/.config/ledbadge-sim`. Missing files and missing keys fall back to
/// defaults. Problems found while loading are kept in `warnings` so they can
/// be logged once the logger (whose filter lives in this file) is up.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::domain::placement::Mode;
use crate::sim::state::Settings;
use crate::ui::palette::{LedColors, Palette, Rgb};

const CONFIG_FILE: &str = "config.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct BadgeConfig {
    pub display: DisplayConfig,
    pub images_dir: PathBuf,
    pub log_filter: String,
    pub palette: Palette,
    /// File the settings came from, if any.
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub viewport_width: usize,
    pub tick_rate_ms: u64,
    pub default_mode: Mode,
    pub default_color: String,
    pub default_brightness: u8,
}

impl DisplayConfig {
    /// Settings an update gets when it overrides nothing.
    pub fn settings(&self) -> Settings {
        Settings {
            mode: self.default_mode,
            color: self.default_color.clone(),
            brightness: self.default_brightness,
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    assets: TomlAssets,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    colors: BTreeMap<String, TomlColor>,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_viewport_width")]
    viewport_width: usize,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default)]
    default_mode: Mode,
    #[serde(default = "default_color")]
    default_color: String,
    #[serde(default = "default_brightness")]
    default_brightness: u8,
}

#[derive(Deserialize, Debug)]
struct TomlAssets {
    #[serde(default = "default_images_dir")]
    images_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

#[derive(Deserialize, Debug)]
struct TomlColor {
    on: String,
    dim: String,
    off: String,
}

// ── Defaults ──

fn default_viewport_width() -> usize { 44 }
fn default_tick_rate() -> u64 { 75 }
fn default_color() -> String { "red".into() }
fn default_brightness() -> u8 { 100 }
fn default_images_dir() -> String { "images".into() }
fn default_log_filter() -> String { "warn".into() }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            viewport_width: default_viewport_width(),
            tick_rate_ms: default_tick_rate(),
            default_mode: Mode::default(),
            default_color: default_color(),
            default_brightness: default_brightness(),
        }
    }
}

impl Default for TomlAssets {
    fn default() -> Self {
        TomlAssets { images_dir: default_images_dir() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { log_filter: default_log_filter() }
    }
}

impl Default for BadgeConfig {
    fn default() -> Self {
        let mut warnings = Vec::new();
        BadgeConfig::from_toml(TomlConfig::default(), &[], &mut warnings)
    }
}

// ── Loading ──

impl BadgeConfig {
    /// Load `config.toml`. An explicit path must exist and parse; a file
    /// found on the search path that fails to parse is reported in
    /// `warnings` and defaults are used.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();

        let (toml_cfg, source) = match explicit {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                let cfg = toml::from_str::<TomlConfig>(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?;
                (cfg, Some(path.to_path_buf()))
            }
            None => load_toml(&search_dirs, &mut warnings),
        };

        let mut config = BadgeConfig::from_toml(toml_cfg, &search_dirs, &mut warnings);
        config.source = source;
        config.warnings = warnings;
        Ok(config)
    }

    /// Parse a config document; relative paths resolve against the CWD.
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let cfg = toml::from_str::<TomlConfig>(text).context("parsing config")?;
        let mut warnings = Vec::new();
        let mut config = BadgeConfig::from_toml(cfg, &[], &mut warnings);
        config.warnings = warnings;
        Ok(config)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> Self {
        let mut palette = Palette::builtin();
        for (name, entry) in &toml_cfg.colors {
            match parse_colors(entry) {
                Some(colors) => palette.insert(name, colors),
                None => warnings.push(format!("color {name:?}: invalid hex value, entry skipped")),
            }
        }

        let d = toml_cfg.display;
        let viewport_width = if d.viewport_width == 0 {
            warnings.push("display.viewport_width must be positive, using 44".into());
            default_viewport_width()
        } else {
            d.viewport_width
        };
        let tick_rate_ms = if d.tick_rate_ms == 0 {
            warnings.push("display.tick_rate_ms must be positive, using 75".into());
            default_tick_rate()
        } else {
            d.tick_rate_ms
        };
        let default_color = if palette.contains(&d.default_color) {
            d.default_color
        } else {
            warnings.push(format!("display.default_color {:?} is not in the palette, using red", d.default_color));
            default_color()
        };
        let default_brightness = if d.default_brightness > 100 {
            warnings.push(format!("display.default_brightness {} clamped to 100", d.default_brightness));
            100
        } else {
            d.default_brightness
        };

        BadgeConfig {
            display: DisplayConfig {
                viewport_width,
                tick_rate_ms,
                default_mode: d.default_mode,
                default_color,
                default_brightness,
            },
            images_dir: resolve_dir(&toml_cfg.assets.images_dir, search_dirs),
            log_filter: toml_cfg.general.log_filter,
            palette,
            source: None,
            warnings: Vec::new(),
        }
    }
}

fn parse_colors(entry: &TomlColor) -> Option<LedColors> {
    Some(LedColors {
        on: Rgb::parse_hex(&entry.on)?,
        dim: Rgb::parse_hex(&entry.dim)?,
        off: Rgb::parse_hex(&entry.off)?,
    })
}

/// Absolute paths are kept; relative ones are looked up in the search dirs
/// and otherwise left relative to the CWD.
fn resolve_dir(dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        return path;
    }
    search_dirs
        .iter()
        .map(|d| d.join(dir))
        .find(|p| p.is_dir())
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir, CWD, user config dir (deduplicated).
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user = PathBuf::from(&home).join(".config/ledbadge-sim");
        if user.is_dir() && !dirs.iter().any(|d| d == &user) {
            dirs.push(user);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First readable `config.toml` in `search_dirs`.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> (TomlConfig, Option<PathBuf>) {
    for dir in search_dirs {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return (cfg, Some(path)),
                Err(e) => {
                    warnings.push(format!("{}: parse error, using defaults: {e}", path.display()));
                    return (TomlConfig::default(), None);
                }
            },
            Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
        }
    }
    (TomlConfig::default(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_badge_hardware() {
        let c = BadgeConfig::default();
        assert_eq!(c.display.viewport_width, 44);
        assert_eq!(c.display.tick_rate_ms, 75);
        assert_eq!(c.display.default_mode, Mode::LeftScroll);
        assert_eq!(c.display.settings(), Settings { mode: Mode::LeftScroll, color: "red".into(), brightness: 100 });
        assert_eq!(c.images_dir, PathBuf::from("images"));
        assert_eq!(c.log_filter, "warn");
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let c = BadgeConfig::from_toml_str(
            r#"
            [display]
            tick_rate_ms = 40
            default_mode = "static"

            [general]
            log_filter = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(c.display.tick_rate_ms, 40);
        assert_eq!(c.display.default_mode, Mode::Static);
        assert_eq!(c.display.viewport_width, 44);
        assert_eq!(c.log_filter, "debug");
    }

    #[test]
    fn custom_colors_join_palette() {
        let c = BadgeConfig::from_toml_str(
            r##"
            [display]
            default_color = "amber"

            [colors.amber]
            on = "#FFBF00"
            dim = "#664C00"
            off = "#1A1300"

            [colors.broken]
            on = "nope"
            dim = "#000000"
            off = "#000000"
            "##,
        )
        .unwrap();
        assert!(c.palette.contains("amber"));
        assert!(!c.palette.contains("broken"));
        assert_eq!(c.display.default_color, "amber");
        assert_eq!(c.palette.colors("amber").on, Rgb::new(0xFF, 0xBF, 0x00));
        assert_eq!(c.warnings.len(), 1);
    }

    #[test]
    fn out_of_range_values_fall_back() {
        let c = BadgeConfig::from_toml_str(
            r#"
            [display]
            viewport_width = 0
            tick_rate_ms = 0
            default_color = "mauve"
            default_brightness = 250
            "#,
        )
        .unwrap();
        assert_eq!(c.display.viewport_width, 44);
        assert_eq!(c.display.tick_rate_ms, 75);
        assert_eq!(c.display.default_color, "red");
        assert_eq!(c.display.default_brightness, 100);
        assert_eq!(c.warnings.len(), 4);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(BadgeConfig::from_toml_str("[display\nviewport_width = ").is_err());
    }

    #[test]
    fn explicit_path_loaded() {
        let path = std::env::temp_dir().join(format!("ledbadge-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[display]\nviewport_width = 32\n").unwrap();
        let c = BadgeConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(c.display.viewport_width, 32);
        assert_eq!(c.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let missing = std::env::temp_dir().join("ledbadge-does-not-exist/config.toml");
        assert!(BadgeConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn absolute_images_dir_kept() {
        let dir = std::env::temp_dir();
        let text = format!("[assets]\nimages_dir = {:?}\n", dir.display().to_string());
        let c = BadgeConfig::from_toml_str(&text).unwrap();
        assert_eq!(c.images_dir, dir);
    }
}
