//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rsforest/rsforest.toml`
//! 3. Local config: `<records_dir>/.rsforest.toml` (next to the record file)
//! 4. Environment variables: `RSFOREST_*` prefix

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::schema::{
    DEFAULT_CHILDREN_KEY, DEFAULT_ID_KEY, DEFAULT_NAME_KEY, DEFAULT_PARENT_ID_KEY,
    DEFAULT_WEIGHT_KEY,
};
use crate::domain::{ForestBuilder, NodeId, NodeSchema};

/// Attribute keys of the node schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchemaConfig {
    pub id_key: String,
    pub parent_id_key: String,
    pub name_key: String,
    pub weight_key: String,
    pub children_key: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            id_key: DEFAULT_ID_KEY.into(),
            parent_id_key: DEFAULT_PARENT_ID_KEY.into(),
            name_key: DEFAULT_NAME_KEY.into(),
            weight_key: DEFAULT_WEIGHT_KEY.into(),
            children_key: DEFAULT_CHILDREN_KEY.into(),
        }
    }
}

/// Raw schema config for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSchemaConfig {
    pub id_key: Option<String>,
    pub parent_id_key: Option<String>,
    pub name_key: Option<String>,
    pub weight_key: Option<String>,
    pub children_key: Option<String>,
}

impl SchemaConfig {
    /// Overlay wins per key if Some, otherwise keep base.
    pub fn merge(&self, overlay: &RawSchemaConfig) -> Self {
        Self {
            id_key: overlay.id_key.clone().unwrap_or_else(|| self.id_key.clone()),
            parent_id_key: overlay
                .parent_id_key
                .clone()
                .unwrap_or_else(|| self.parent_id_key.clone()),
            name_key: overlay
                .name_key
                .clone()
                .unwrap_or_else(|| self.name_key.clone()),
            weight_key: overlay
                .weight_key
                .clone()
                .unwrap_or_else(|| self.weight_key.clone()),
            children_key: overlay
                .children_key
                .clone()
                .unwrap_or_else(|| self.children_key.clone()),
        }
    }

    /// Validates the keys into a [`NodeSchema`]; blank keys are rejected.
    pub fn to_schema(&self) -> ApplicationResult<NodeSchema> {
        Ok(NodeSchema::new(
            &self.id_key,
            &self.parent_id_key,
            &self.name_key,
            &self.weight_key,
            &self.children_key,
        )?)
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub schema: RawSchemaConfig,
    pub root_parent_id: Option<NodeId>,
    pub root_sentinel: Option<bool>,
    pub max_depth: Option<usize>,
    pub records_table: Option<String>,
}

/// Unified configuration for rsforest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Parent id meaning "no parent" (default: 0)
    pub root_parent_id: NodeId,
    /// Treat `root_parent_id` as a root marker (default: true)
    pub root_sentinel: bool,
    /// Depth whose nodes keep no children, roots at 0 (default: unlimited)
    pub max_depth: Option<usize>,
    /// Name of the array of tables holding records (default: "records")
    pub records_table: String,
    /// Attribute keys
    pub schema: SchemaConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_parent_id: NodeId::default(),
            root_sentinel: true,
            max_depth: None,
            records_table: "records".into(),
            schema: SchemaConfig::default(),
        }
    }
}

/// Get the XDG config directory for rsforest.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rsforest").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rsforest.toml"))
}

/// Get the path to the local config file in a records directory.
pub fn local_config_path(records_dir: &Path) -> PathBuf {
    records_dir.join(".rsforest.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// The sentinel handed to the builder, `None` when disabled.
    pub fn root_parent(&self) -> Option<NodeId> {
        self.root_sentinel.then(|| self.root_parent_id.clone())
    }

    /// The validated node schema.
    pub fn schema(&self) -> ApplicationResult<NodeSchema> {
        self.schema.to_schema()
    }

    /// A forest builder configured from these settings.
    pub fn builder(&self) -> ApplicationResult<ForestBuilder> {
        Ok(ForestBuilder::with_schema(self.schema()?)
            .root_parent_id(self.root_parent())
            .max_depth(self.max_depth))
    }

    /// Merge overlay config onto self (base): overlay wins if Some.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_parent_id: overlay
                .root_parent_id
                .clone()
                .unwrap_or_else(|| self.root_parent_id.clone()),
            root_sentinel: overlay.root_sentinel.unwrap_or(self.root_sentinel),
            max_depth: overlay.max_depth.or(self.max_depth),
            records_table: overlay
                .records_table
                .clone()
                .unwrap_or_else(|| self.records_table.clone()),
            schema: self.schema.merge(&overlay.schema),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `records_dir` - Optional directory of the record file, for local config
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/rsforest/rsforest.toml`
    /// 3. Local config: `<records_dir>/.rsforest.toml`
    /// 4. Environment variables: `RSFOREST_*` prefix
    pub fn load(records_dir: Option<&Path>) -> ApplicationResult<Self> {
        Self::load_from(global_config_path().as_deref(), records_dir)
    }

    /// Same layering as [`Settings::load`], with the global config file given explicitly.
    ///
    /// `None` skips the global layer.
    pub fn load_from(global: Option<&Path>, records_dir: Option<&Path>) -> ApplicationResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = records_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply RSFOREST_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> ApplicationResult<Self> {
        // config crate parses the env vars: RSFOREST_MAX_DEPTH, RSFOREST_SCHEMA__ID_KEY, ...
        let builder = Config::builder().add_source(
            Environment::with_prefix("RSFOREST")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("root_parent_id") {
            settings.root_parent_id = val
                .parse()
                .unwrap_or_else(|never: Infallible| match never {});
        }
        if let Ok(val) = config.get_bool("root_sentinel") {
            settings.root_sentinel = val;
        }
        if let Ok(val) = config.get_int("max_depth") {
            let depth = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("max_depth must not be negative: {}", val),
            })?;
            settings.max_depth = Some(depth);
        }
        if let Ok(val) = config.get_string("records_table") {
            settings.records_table = val;
        }
        if let Ok(val) = config.get_string("schema.id_key") {
            settings.schema.id_key = val;
        }
        if let Ok(val) = config.get_string("schema.parent_id_key") {
            settings.schema.parent_id_key = val;
        }
        if let Ok(val) = config.get_string("schema.name_key") {
            settings.schema.name_key = val;
        }
        if let Ok(val) = config.get_string("schema.weight_key") {
            settings.schema.weight_key = val;
        }
        if let Ok(val) = config.get_string("schema.children_key") {
            settings.schema.children_key = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rsforest configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rsforest/rsforest.toml
#   Local:  <records_dir>/.rsforest.toml   (next to the record file)
#   Env:    RSFOREST_* environment variables, e.g. RSFOREST_SCHEMA__ID_KEY=deptId

# Parent id that marks a root (integer or string)
# root_parent_id = 0

# Set to false if 0 is a real id; then only missing or unresolved parents make roots
# root_sentinel = true

# Nodes at this depth keep no children (roots are depth 0)
# max_depth = 3

# Name of the array of tables holding the records
# records_table = "records"

[schema]
# Record columns carrying the node roles
# id_key = "id"
# parent_id_key = "parentId"
# name_key = "name"
# weight_key = "weight"
# children_key = "children"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
