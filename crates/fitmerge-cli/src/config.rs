//! Settings resolution.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, environment
//! variables, command line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use fitmerge_model::{InterpolationMethod, Settings};

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "fitmerge.toml";
pub const BASE_DIR_ENV: &str = "FITMERGE_BASE_DIR";
pub const INBOX_DIR_ENV: &str = "FITMERGE_INBOX_DIR";
pub const INTERPOLATION_ENV: &str = "FITMERGE_INTERPOLATION";

/// Settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_dir: Option<PathBuf>,
    pub inbox_dir: Option<PathBuf>,
    pub interpolation: Option<InterpolationMethod>,
    pub strict: bool,
    pub fail_fast: bool,
}

/// Resolved settings and the file they came from.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: Option<PathBuf>,
}

/// Defaults with directories under the user's home.
pub fn default_settings() -> Settings {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let base_dir = dirs::document_dir()
        .unwrap_or_else(|| home.clone())
        .join("Training");
    let inbox_dir = dirs::download_dir().unwrap_or_else(|| home.join("Downloads"));
    Settings::with_dirs(base_dir, inbox_dir)
}

/// Parses a settings file. Directories it leaves out get the home defaults.
pub fn parse_settings(text: &str) -> Result<Settings> {
    let table: toml::Table = toml::from_str(text).context("invalid TOML")?;
    let mut settings: Settings = toml::from_str(text).context("invalid settings")?;
    let defaults = default_settings();
    if !table.contains_key("base_dir") {
        settings.base_dir = defaults.base_dir;
    }
    if !table.contains_key("inbox_dir") {
        settings.inbox_dir = defaults.inbox_dir;
    }
    Ok(settings)
}

/// Reads the explicit file, else `fitmerge.toml` in `cwd` when present,
/// else the defaults.
pub fn load_file(explicit: Option<&Path>, cwd: &Path) -> Result<LoadedSettings> {
    let path = match explicit {
        Some(path) if !path.is_file() => bail!("config file not found: {}", path.display()),
        Some(path) => Some(path.to_path_buf()),
        None => Some(cwd.join(CONFIG_FILE_NAME)).filter(|path| path.is_file()),
    };
    let Some(path) = path else {
        debug!("no config file, using defaults");
        return Ok(LoadedSettings {
            settings: default_settings(),
            source: None,
        });
    };

    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let settings =
        parse_settings(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    info!(path = %path.display(), "loaded settings");
    Ok(LoadedSettings {
        settings,
        source: Some(path),
    })
}

/// Parses an interpolation method name for `--interpolation`.
pub fn parse_interpolation(value: &str) -> std::result::Result<InterpolationMethod, String> {
    InterpolationMethod::parse(value).ok_or_else(|| {
        format!("unknown interpolation method '{value}' (none, linear, ffill, bfill)")
    })
}

/// Applies directory and interpolation overrides from the environment.
///
/// An unknown interpolation name is logged and ignored.
pub fn apply_env<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(BASE_DIR_ENV).filter(|value| !value.trim().is_empty()) {
        settings.base_dir = PathBuf::from(dir);
    }
    if let Some(dir) = lookup(INBOX_DIR_ENV).filter(|value| !value.trim().is_empty()) {
        settings.inbox_dir = PathBuf::from(dir);
    }
    if let Some(value) = lookup(INTERPOLATION_ENV).filter(|value| !value.trim().is_empty()) {
        match InterpolationMethod::parse(&value) {
            Some(method) => settings.interpolation.method = method,
            None => warn!(value, "ignoring unknown {INTERPOLATION_ENV}"),
        }
    }
}

pub fn apply_overrides(settings: &mut Settings, overrides: &Overrides) {
    if let Some(dir) = &overrides.base_dir {
        settings.base_dir.clone_from(dir);
    }
    if let Some(dir) = &overrides.inbox_dir {
        settings.inbox_dir.clone_from(dir);
    }
    if let Some(method) = overrides.interpolation {
        settings.interpolation.method = method;
    }
    settings.strict |= overrides.strict;
    settings.fail_fast |= overrides.fail_fast;
}

/// File, then process environment, then `overrides`.
pub fn resolve_settings(explicit: Option<&Path>, overrides: &Overrides) -> Result<LoadedSettings> {
    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    let mut loaded = load_file(explicit, &cwd)?;
    apply_env(&mut loaded.settings, |key| std::env::var(key).ok());
    apply_overrides(&mut loaded.settings, overrides);
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = parse_settings(
            "base_dir = \"/data/training\"\nmax_workers = 2\n\n[interpolation]\nmethod = \"forward_fill\"\n",
        )
        .unwrap();
        assert_eq!(settings.base_dir, PathBuf::from("/data/training"));
        assert_eq!(settings.max_workers, 2);
        assert_eq!(settings.interpolation.method, InterpolationMethod::ForwardFill);
        assert_eq!(settings.interpolation.max_gap, 5);
        assert_eq!(settings.gap_threshold, 10);
        assert_eq!(settings.inbox_dir, default_settings().inbox_dir);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        assert!(parse_settings("max_workers = \"many\"").is_err());
    }

    #[test]
    fn test_interpolation_from_env_and_flag() {
        let mut settings = Settings::with_dirs("/a", "/b");
        apply_env(&mut settings, |key| {
            (key == INTERPOLATION_ENV).then(|| "BFILL".to_string())
        });
        assert_eq!(settings.interpolation.method, InterpolationMethod::BackwardFill);

        apply_env(&mut settings, |key| {
            (key == INTERPOLATION_ENV).then(|| "cubic".to_string())
        });
        assert_eq!(settings.interpolation.method, InterpolationMethod::BackwardFill);

        apply_overrides(
            &mut settings,
            &Overrides {
                interpolation: Some(parse_interpolation("pad").unwrap()),
                ..Default::default()
            },
        );
        assert_eq!(settings.interpolation.method, InterpolationMethod::ForwardFill);
        assert!(parse_interpolation("spline").is_err());
    }

    #[test]
    fn test_env_then_flags() {
        let mut settings = Settings::with_dirs("/a", "/b");
        apply_env(&mut settings, |key| {
            (key == BASE_DIR_ENV).then(|| "/from-env".to_string())
        });
        assert_eq!(settings.base_dir, PathBuf::from("/from-env"));
        assert_eq!(settings.inbox_dir, PathBuf::from("/b"));

        apply_overrides(
            &mut settings,
            &Overrides {
                base_dir: Some(PathBuf::from("/from-flag")),
                strict: true,
                ..Default::default()
            },
        );
        assert_eq!(settings.base_dir, PathBuf::from("/from-flag"));
        assert!(settings.strict);
        assert!(!settings.fail_fast);
    }
}
