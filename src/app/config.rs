use crate::app::models::{ToolCommand, Tools};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    ignore: Option<bool>,
    tree: Option<ToolCommand>,
    du: Option<ToolCommand>,
    git: Option<GitSettings>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct GitSettings {
    program: String,
}

/// Defaults read from the settings file, before CLI flags are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub ignore_missing: bool,
    pub tools: Tools,
}

fn settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("tree_check").join("config.toml"))
}

/// Loads `~/.config/tree_check/config.toml`, falling back to defaults when
/// there is no home directory or no file.
pub fn load_settings() -> Result<Settings> {
    match settings_path() {
        Some(path) => load_settings_from(&path),
        None => {
            log::debug!("No home directory, using default settings");
            Ok(Settings::default())
        }
    }
}

pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path)
        .context(format!("Failed to read settings at {:?}", path))?;
    let parsed: SettingsFile =
        toml::from_str(&content).context(format!("Failed to parse {:?}", path))?;

    log::debug!("Loaded settings from {:?}", path);
    Ok(merge(parsed))
}

fn merge(file: SettingsFile) -> Settings {
    let defaults = Tools::default();
    Settings {
        ignore_missing: file.ignore.unwrap_or(false),
        tools: Tools {
            tree: file.tree.unwrap_or(defaults.tree),
            du: file.du.unwrap_or(defaults.du),
            git: file.git.map(|g| g.program).unwrap_or(defaults.git),
        },
    }
}
