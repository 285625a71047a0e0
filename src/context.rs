//! Deployment contexts
//!
//! A context names where groups get deployed: the subscription and
//! resource group they are placed in and the target region. Contexts are
//! stored as JSON files under `<root>/contexts/`.

use crate::error::{CorralError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deployment target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentContext {
    /// Context name
    pub name: String,
    /// Subscription ID
    pub subscription_id: String,
    /// Resource group
    pub resource_group: String,
    /// Target region
    pub location: String,
}

impl DeploymentContext {
    /// Create a new context
    pub fn new(name: &str, subscription_id: &str, resource_group: &str, location: &str) -> Self {
        Self {
            name: name.to_string(),
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            location: location.to_string(),
        }
    }
}

/// File-backed context store
#[derive(Debug, Clone)]
pub struct ContextStore {
    root: PathBuf,
}

impl ContextStore {
    /// Open a store rooted at `root`
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Default store location
    pub fn default_root() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("corral")
    }

    fn contexts_dir(&self) -> PathBuf {
        self.root.join("contexts")
    }

    fn context_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(CorralError::InvalidConfig(format!(
                "invalid context name: {:?}",
                name
            )));
        }
        Ok(self.contexts_dir().join(format!("{}.json", name)))
    }

    /// Save a context, replacing any context of the same name
    pub fn save(&self, ctx: &DeploymentContext) -> Result<()> {
        let path = self.context_path(&ctx.name)?;
        fs::create_dir_all(self.contexts_dir())?;
        fs::write(&path, serde_json::to_vec_pretty(ctx)?)?;
        debug!("Saved context {} to {}", ctx.name, path.display());
        Ok(())
    }

    /// Load a context by name
    pub fn load(&self, name: &str) -> Result<DeploymentContext> {
        let path = self.context_path(name)?;
        if !path.exists() {
            return Err(CorralError::ContextNotFound(name.to_string()));
        }
        let ctx: DeploymentContext = serde_json::from_slice(&fs::read(&path)?)?;
        Ok(ctx)
    }

    /// List stored context names, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let dir = self.contexts_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove a context
    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.context_path(name)?;
        if !path.exists() {
            return Err(CorralError::ContextNotFound(name.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    /// Store root
    pub fn root(&self) -> &Path {
        &self.root
    }
}
