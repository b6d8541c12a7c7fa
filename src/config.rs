use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::reachability::{ExploreConfig, SearchMode};
use crate::net::BuildOptions;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PnConfig {
    #[serde(default = "default_require_one_safe")]
    pub require_one_safe: bool,
    #[serde(default = "default_modes")]
    pub modes: Vec<SearchMode>,
    #[serde(default)]
    pub state_limit: Option<usize>,
    #[serde(default)]
    pub include_details: bool,
}

impl Default for PnConfig {
    fn default() -> Self {
        Self {
            require_one_safe: default_require_one_safe(),
            modes: default_modes(),
            state_limit: None,
            include_details: false,
        }
    }
}

impl PnConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            require_one_safe: self.require_one_safe,
        }
    }

    pub fn explore_configs(&self) -> Vec<ExploreConfig> {
        self.modes
            .iter()
            .map(|mode| ExploreConfig::new(*mode).with_state_limit(self.state_limit))
            .collect()
    }
}

fn default_require_one_safe() -> bool {
    true
}

// Breadth-first listing first, then depth-first.
fn default_modes() -> Vec<SearchMode> {
    vec![SearchMode::BreadthFirst, SearchMode::DepthFirst]
}
