use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::model::card::BoardList;

pub const DEFAULT_TRIGGER_LABEL: &str = "This Week";
pub const TRIGGER_LABEL_COLOR: &str = "orange";

pub const ENV_API_KEY: &str = "TRELLO_API_KEY";
pub const ENV_API_TOKEN: &str = "TRELLO_API_TOKEN";
pub const ENV_BOARD_ID: &str = "WEEKLY_BOARD_ID";

/// On-disk configuration. Every field is optional so the environment can fill the gaps.
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub api_token: Option<String>,
    pub weekly_board_id: Option<String>,
    pub weekly_board_url: Option<String>,
    pub trigger_label: Option<String>,
    #[serde(default)]
    pub lists: HashMap<String, String>,
}

#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub api_key: Option<String>,
    pub api_token: Option<String>,
    pub weekly_board_id: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            api_key: var(ENV_API_KEY),
            api_token: var(ENV_API_TOKEN),
            weekly_board_id: var(ENV_BOARD_ID),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_token: String,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub credentials: Credentials,
    pub weekly_board_id: String,
    pub weekly_board_url: Option<String>,
    pub trigger_label: String,
    /// `None` means the roles are read off the weekly board at the start of a run.
    pub lists: Option<ListRoles>,
}

impl SyncConfig {
    pub fn board_url(&self) -> String {
        self.weekly_board_url
            .clone()
            .unwrap_or_else(|| format!("https://trello.com/b/{}", self.weekly_board_id))
    }
}

impl FileConfig {
    pub fn credentials(&self, env: &EnvOverrides) -> Result<Credentials> {
        let api_key = env.api_key.clone().or_else(|| self.api_key.clone());
        let api_token = env.api_token.clone().or_else(|| self.api_token.clone());
        match (api_key, api_token) {
            (Some(api_key), Some(api_token)) => Ok(Credentials { api_key, api_token }),
            _ => bail!(
                "Trello credentials missing: set {ENV_API_KEY} and {ENV_API_TOKEN} or api_key/api_token in the config file"
            ),
        }
    }

    pub fn into_sync_config(self, env: &EnvOverrides) -> Result<SyncConfig> {
        let credentials = self.credentials(env)?;
        let weekly_board_id = env
            .weekly_board_id
            .clone()
            .or(self.weekly_board_id)
            .with_context(|| {
                format!("Weekly board id missing: set {ENV_BOARD_ID} or weekly_board_id")
            })?;
        let lists = (!self.lists.is_empty()).then(|| ListRoles::from_map(self.lists));

        Ok(SyncConfig {
            credentials,
            weekly_board_id,
            weekly_board_url: self.weekly_board_url,
            trigger_label: self
                .trigger_label
                .unwrap_or_else(|| DEFAULT_TRIGGER_LABEL.to_string()),
            lists,
        })
    }
}

/// Logical list roles on the weekly board mapped to Trello list ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRoles(HashMap<String, String>);

impl ListRoles {
    pub const THIS_WEEK: &'static str = "this_week";
    pub const COMPLETED: &'static str = "completed";

    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self(map)
    }

    /// Keys each list by its lowercased name with spaces turned into underscores.
    /// The first list stands in for `this_week` when no list carries that name.
    pub fn derive(lists: &[BoardList]) -> Self {
        let mut map: HashMap<String, String> = lists
            .iter()
            .map(|l| (l.name.to_lowercase().replace(' ', "_"), l.id.clone()))
            .collect();
        if !map.contains_key(Self::THIS_WEEK) {
            if let Some(first) = lists.first() {
                info!("Using first list '{}' as 'This Week' list", first.name);
                map.insert(Self::THIS_WEEK.to_string(), first.id.clone());
            }
        }
        Self(map)
    }

    pub fn get(&self, role: &str) -> Option<&str> {
        self.0.get(role).map(String::as_str)
    }

    pub fn this_week(&self) -> Result<&str> {
        self.require(Self::THIS_WEEK)
    }

    pub fn completed(&self) -> Result<&str> {
        self.require(Self::COMPLETED)
    }

    fn require(&self, role: &str) -> Result<&str> {
        self.get(role)
            .with_context(|| format!("No '{role}' list found on the weekly board"))
    }
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".weekly-sync")
}

pub fn default_config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Reads the config file if present. JSON is accepted for `.json` paths, TOML otherwise.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        info!(path = %path.display(), "Config file not found, using environment variables");
        return Ok(FileConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents, is_json(path))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

pub fn parse_config(contents: &str, json: bool) -> Result<FileConfig> {
    let config = if json {
        serde_json::from_str(contents)?
    } else {
        toml::from_str(contents)?
    };
    Ok(config)
}
