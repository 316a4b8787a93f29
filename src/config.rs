//! Session configuration (mipa.yaml).
//!
//! Every field is optional in the file. A JSON merge-patch given on the
//! command line is applied on top of whatever was loaded.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{MipaError, Result};
use crate::process::PixelSelector;
use crate::runtime::MAX_PREVIEW_SCALE;
use crate::types::BuiltinMatrices;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "mipa.yaml";

/// Runtime defaults, seeded into the `cfg_*` variables of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Integer upscale of the live preview.
    pub scale: u32,

    /// Matrix used by `dither_ord` when none is named.
    pub matrix: String,

    /// Ordered-dither sparsity when the strategy recommends none.
    pub sparsity: f32,

    /// Default dithering threshold.
    pub threshold: f32,

    /// Default `pixelize` selector.
    pub selector: String,

    /// PNG written by the live preview, if any.
    pub preview: Option<PathBuf>,

    /// Preview poll interval in milliseconds.
    pub cadence_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scale: 4,
            matrix: "bayer4".to_string(),
            sparsity: 3.0,
            threshold: 0.0,
            selector: "avg".to_string(),
            preview: None,
            cadence_ms: 100,
        }
    }
}

fn config_error(message: String, help: Option<&str>) -> MipaError {
    MipaError::Config {
        message,
        help: help.map(str::to_string),
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!("Failed to read {}: {}", path.display(), e), None)
        })?;

        Self::parse(&content)
    }

    /// `mipa.yaml` in `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| {
            config_error(format!("Invalid configuration: {}", e), Some("Check mipa.yaml syntax"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply a JSON merge-patch, e.g. `{"scale": 2, "matrix": "bayer8"}`.
    pub fn merge_json(&self, patch: &str) -> Result<Self> {
        let patch: Json = serde_json::from_str(patch).map_err(|e| {
            config_error(format!("Invalid --set value: {}", e), Some("Pass a JSON object"))
        })?;
        let mut current = serde_json::to_value(self)
            .map_err(|e| config_error(format!("Cannot encode configuration: {}", e), None))?;
        merge_patch(&mut current, patch);

        let merged: Self = serde_json::from_value(current).map_err(|e| {
            config_error(format!("Invalid --set value: {}", e), None)
        })?;
        merged.validate()?;
        Ok(merged)
    }

    /// Check names that are resolved later.
    pub fn validate(&self) -> Result<()> {
        if BuiltinMatrices::get(&self.matrix).is_none() {
            return Err(MipaError::Config {
                message: format!("Unknown default matrix: {}", self.matrix),
                help: Some(format!(
                    "Available matrices: {}",
                    BuiltinMatrices::names().collect::<Vec<_>>().join(", ")
                )),
            });
        }
        self.selector
            .parse::<PixelSelector>()
            .map_err(|e| config_error(e.to_string(), Some("Use avg, med, min or max")))?;
        if self.scale == 0 || self.scale > MAX_PREVIEW_SCALE {
            return Err(config_error(
                format!("scale must be between 1 and {}, got {}", MAX_PREVIEW_SCALE, self.scale),
                None,
            ));
        }
        Ok(())
    }
}

/// RFC 7386 merge: objects merge recursively, `null` deletes, anything else
/// replaces.
fn merge_patch(target: &mut Json, patch: Json) {
    let Json::Object(patch) = patch else {
        *target = patch;
        return;
    };
    if !target.is_object() {
        *target = Json::Object(Default::default());
    }
    if let Json::Object(map) = target {
        for (key, value) in patch {
            if value.is_null() {
                map.remove(&key);
            } else {
                merge_patch(map.entry(key).or_insert(Json::Null), value);
            }
        }
    }
}
