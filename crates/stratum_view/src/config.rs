//! # Registry Configuration
//!
//! Loaded once at startup from TOML:
//!
//! ```toml
//! [stack]
//! base_order = 500
//! order_step = 100
//!
//! [[view]]
//! identifier = "Hud"
//! fixed_order = 9000
//! focus = "silent"
//! cache = "shared"
//! ```

use crate::error::{ViewError, ViewResult};
use crate::meta::ViewMeta;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Render order parameters.
///
/// A view at stack index `i` without a fixed order renders at
/// `base_order + i * order_step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Order of the bottom view.
    pub base_order: i32,
    /// Order increment per stack position.
    pub order_step: i32,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            base_order: 500,
            order_step: 100,
        }
    }
}

impl StackConfig {
    /// Render order of a view at `index` with optional override `fixed`.
    #[must_use]
    pub fn render_order(&self, index: usize, fixed: Option<i32>) -> i32 {
        fixed.unwrap_or_else(|| {
            let index = i32::try_from(index).unwrap_or(i32::MAX);
            self.base_order
                .saturating_add(index.saturating_mul(self.order_step))
        })
    }
}

/// Stack parameters plus the catalog of known views.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Render order parameters.
    #[serde(default)]
    pub stack: StackConfig,
    /// Known view descriptors.
    #[serde(default, rename = "view")]
    pub views: Vec<ViewMeta>,
}

impl RegistryConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidConfig`] on malformed TOML, a non-positive
    /// `order_step` or a duplicated view identifier.
    pub fn from_toml_str(source: &str) -> ViewResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| ViewError::InvalidConfig(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidConfig`] if the file cannot be read, or any
    /// error of [`RegistryConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> ViewResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            ViewError::InvalidConfig(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(
            "Loaded view config from {} ({} views)",
            path.display(),
            config.views.len()
        );
        Ok(config)
    }

    /// Looks up a catalog entry.
    #[must_use]
    pub fn meta(&self, identifier: &str) -> Option<&ViewMeta> {
        self.views.iter().find(|meta| meta.identifier == identifier)
    }

    fn validate(&self) -> ViewResult<()> {
        if self.stack.order_step <= 0 {
            return Err(ViewError::InvalidConfig(format!(
                "order_step must be positive, got {}",
                self.stack.order_step
            )));
        }
        let mut seen = HashSet::new();
        for meta in &self.views {
            if meta.identifier.is_empty() {
                return Err(ViewError::InvalidConfig("empty view identifier".to_string()));
            }
            if !seen.insert(meta.identifier.as_str()) {
                return Err(ViewError::InvalidConfig(format!(
                    "duplicate view identifier: {}",
                    meta.identifier
                )));
            }
        }
        Ok(())
    }
}
