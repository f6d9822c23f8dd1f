//! `[env]` table of `<config home>/<app>/config.toml`.
//!
//! Config home is `$XDG_CONFIG_HOME` when set, else the platform config dir from `dirs`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

pub(crate) fn config_home() -> Result<PathBuf, LoadError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir().ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into()))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, toml::Value>,
}

/// Scalars become strings; tables and arrays are rejected.
fn scalar_to_string(key: &str, value: toml::Value) -> Result<String, LoadError> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Datetime(d) => Ok(d.to_string()),
        _ => Err(LoadError::XdgValue(key.to_string())),
    }
}

/// Reads `[env]` from `<base>/<app_name>/config.toml`. A missing file is an empty map.
pub fn load_env_map_from(base: &Path, app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = base.join(app_name).join("config.toml");
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;
    config
        .env
        .into_iter()
        .map(|(k, v)| scalar_to_string(&k, v).map(|v| (k, v)))
        .collect()
}
