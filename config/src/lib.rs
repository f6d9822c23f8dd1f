//! Configuration loading for linkpost.
//!
//! Reads the `[env]` table of `$XDG_CONFIG_HOME/<app>/config.toml` and a project `.env`,
//! then sets the variables that are missing from the process environment. Precedence:
//! **existing env > .env > XDG**.

mod dotenv;
mod xdg_toml;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("xdg [env] value for {0} must be a string, number or boolean")]
    XdgValue(String),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Keys set by [`load_and_apply`], by source.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Applied {
    pub from_dotenv: Vec<String>,
    pub from_xdg: Vec<String>,
}

/// Decides what to set given both maps and a lookup of the current environment.
fn resolve(
    xdg: &HashMap<String, String>,
    dotenv: &HashMap<String, String>,
    is_set: impl Fn(&str) -> bool,
) -> (Vec<(String, String)>, Applied) {
    let keys: BTreeSet<&String> = xdg.keys().chain(dotenv.keys()).collect();
    let mut to_set = Vec::new();
    let mut applied = Applied::default();
    for key in keys {
        if is_set(key) {
            continue;
        }
        if let Some(v) = dotenv.get(key) {
            to_set.push((key.clone(), v.clone()));
            applied.from_dotenv.push(key.clone());
        } else if let Some(v) = xdg.get(key) {
            to_set.push((key.clone(), v.clone()));
            applied.from_xdg.push(key.clone());
        }
    }
    (to_set, applied)
}

/// Loads both sources and sets every variable not already present in the environment.
///
/// * `app_name`: directory under the config home, e.g. `"linkpost"`.
/// * `override_dir`: where to look for `.env` instead of the current directory.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Applied, LoadError> {
    let xdg = xdg_toml::load_env_map_from(&xdg_toml::config_home()?, app_name)?;
    let dotenv = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;
    let (to_set, applied) = resolve(&xdg, &dotenv, |k| std::env::var_os(k).is_some());
    for (key, value) in to_set {
        std::env::set_var(key, value);
    }
    Ok(applied)
}

/// `<config home>/<app_name>`.
pub fn config_dir(app_name: &str) -> Result<PathBuf, LoadError> {
    Ok(xdg_toml::config_home()?.join(app_name))
}

/// `<data dir>/<app_name>` (`$XDG_DATA_HOME` when set), for databases and caches.
pub fn data_dir(app_name: &str) -> Option<PathBuf> {
    std::env::var_os("XDG_DATA_HOME")
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::data_dir)
        .map(|d| d.join(app_name))
}
