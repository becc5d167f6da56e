use anyhow::{anyhow, Context, Result};
use canvas_infra::ClientOptions;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const QUALIFIER: &str = "com";
const ORG: &str = "canvas-sync";
const APP: &str = "canvas-sync";

/// Contents of `config.json` in the platform config directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from(QUALIFIER, ORG, APP)
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(Self::at(proj_dirs.config_dir().join("config.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<StoredSettings> {
        if !self.path.exists() {
            return Ok(StoredSettings::default());
        }
        let content = fs::read_to_string(&self.path).context("Failed to read settings")?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(settings)
    }

    pub fn save(&self, settings: &StoredSettings) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        atomic_write(&self.path, json.as_bytes()).context("Failed to write settings")?;
        Ok(())
    }
}

fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = {
        let mut name = path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    };

    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create temp file {}", tmp_path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write temp file {}", tmp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync temp file {}", tmp_path.display()))?;
    drop(file);

    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Flags and environment win over the stored file.
pub fn client_options(
    token: Option<String>,
    base_url: Option<String>,
    stored: &StoredSettings,
) -> Result<ClientOptions> {
    let token = token
        .or_else(|| stored.token.clone())
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            anyhow!(
                "No API token configured: run `canvas-sync config set-token <TOKEN>` or set {}",
                canvas_config::TOKEN_ENV
            )
        })?;

    let mut options = ClientOptions::new(token);
    if let Some(url) = base_url.or_else(|| stored.base_url.clone()) {
        options = options.with_base_url(url);
    }
    Ok(options)
}

fn mask(token: &str) -> String {
    let tail: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{tail}")
    }
}

pub fn handle_set_token(store: &SettingsStore, token: String) -> Result<()> {
    if token.trim().is_empty() {
        return Err(anyhow!("Token cannot be empty"));
    }
    let mut settings = store.load()?;
    settings.token = Some(token.trim().to_string());
    store.save(&settings)?;
    println!("Token saved to {}", store.path().display());
    Ok(())
}

pub fn handle_set_base_url(store: &SettingsStore, url: String) -> Result<()> {
    let mut settings = store.load()?;
    settings.base_url = Some(url.trim_end_matches('/').to_string());
    store.save(&settings)?;
    println!("Base URL saved to {}", store.path().display());
    Ok(())
}

pub fn handle_show(store: &SettingsStore) -> Result<()> {
    let settings = store.load()?;
    println!("Config:   {}", store.path().display());
    println!(
        "Token:    {}",
        settings
            .token
            .as_deref()
            .map(mask)
            .unwrap_or_else(|| "(not set)".into())
    );
    println!(
        "Base URL: {}",
        settings
            .base_url
            .as_deref()
            .unwrap_or(canvas_config::DEFAULT_BASE_URL)
    );
    Ok(())
}
