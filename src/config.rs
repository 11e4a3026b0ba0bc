use std::collections::BTreeMap;

use homedir::my_home;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::preview::previewers::builtin_keys;
use crate::preview::template::TEMPLATE_PREFIX;
use crate::storage::{BackendLocal, StorageManager};

const CONFIG_FILE: &str = "config.yaml";

/// Location of `config.yaml`: `LINKTOOLS_BASE_PATH`, else
/// `~/.local/share/linktools`.
pub fn default_base_path() -> Result<String> {
    if let Ok(base_path) = std::env::var("LINKTOOLS_BASE_PATH") {
        return Ok(base_path);
    }

    let home = my_home()
        .map_err(|e| Error::config(format!("could not determine home directory: {e:?}")))?
        .ok_or_else(|| Error::config("home directory path is empty"))?;

    Ok(format!("{}/.local/share/linktools", home.to_string_lossy()))
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Keys of built-in helpers that must not be registered.
    #[serde(default)]
    pub disabled_helpers: Vec<String>,

    /// Customized template bodies, by template name. These win over both the
    /// built-in bodies and `template_dir`.
    #[serde(default)]
    pub templates: BTreeMap<String, String>,

    /// Directory holding `<template name>.html` files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<String>,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Config {
    fn validate(&self) -> Result<()> {
        let known = builtin_keys();
        for key in &self.disabled_helpers {
            if !known.contains(&key.as_str()) {
                return Err(Error::UnknownHelper(key.clone()));
            }
        }

        for name in self.templates.keys() {
            if !name.starts_with(TEMPLATE_PREFIX) {
                return Err(Error::config(format!(
                    "template `{name}` must be named {TEMPLATE_PREFIX}<helper>"
                )));
            }
        }

        if let Some(dir) = &self.template_dir {
            if !std::path::Path::new(dir).is_dir() {
                return Err(Error::config(format!("template_dir {dir} is not a directory")));
            }
        }

        Ok(())
    }

    pub fn load() -> Result<Self> {
        Self::load_with(&default_base_path()?)
    }

    /// Reads `config.yaml` from `base_path`, writing the defaults first when
    /// it does not exist yet.
    pub fn load_with(base_path: &str) -> Result<Self> {
        let store = BackendLocal::new(base_path)?;

        if !store.exists(CONFIG_FILE) {
            log::info!("creating {base_path}/{CONFIG_FILE}");
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)
            .map_err(|_| Error::config("config file is not valid utf8"))?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.to_string();

        config.validate()?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let store = BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn is_disabled(&self, helper_key: &str) -> bool {
        self.disabled_helpers.iter().any(|key| key == helper_key)
    }

    pub fn template_dir(&self) -> Option<&str> {
        self.template_dir.as_deref()
    }
}
