use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::models::schedule::ScheduleConfig;
use crate::utils::row_filter::FilterMode;

const DEFAULT_CONFIG: &str = include_str!("../.config/config.yaml");

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub filter_mode: FilterMode,
    /// footer hint of the "view SQL" key
    #[serde(default)]
    pub show_sql_tooltip: Option<String>,
    #[serde(default)]
    pub scheduled_queries: ScheduleConfig,
}

impl Config {
    /// Loads `path`, or the default config file which is created on first run.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path,
            None => {
                let default_path = get_config_path()?;
                if !default_path.is_file() {
                    fs::write(&default_path, DEFAULT_CONFIG).with_context(|| {
                        format!("Fail to write file `{}`", default_path.display())
                    })?;
                    return Self::from_str(DEFAULT_CONFIG);
                }
                default_path
            }
        };
        Self::from_path(&config_path)
    }

    fn from_path(config_path: &Path) -> Result<Self> {
        let file = fs::File::open(config_path)
            .with_context(|| format!("Fail to open file `{}`", config_path.display()))?;
        serde_yaml_ng::from_reader(file)
            .with_context(|| format!("Fail to deserialize file `{}`", config_path.display()))
    }

    fn from_str(content: &str) -> Result<Self> {
        serde_yaml_ng::from_str(content).context("Fail to deserialize default config")
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let dir = get_project_dir()?.config_dir().to_owned();
    if !dir.is_dir() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Fail to create directory `{}`", dir.display()))?;
    }

    Ok(dir.join("config.yaml"))
}

pub fn get_project_dir() -> Result<ProjectDirs> {
    ProjectDirs::from("io.github", "", env!("CARGO_PKG_NAME"))
        .ok_or_else(|| anyhow!("Fail to get project directory"))
}
