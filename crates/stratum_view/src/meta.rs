//! # View Descriptors
//!
//! [`ViewMeta`] is the immutable description of a view type. Two metas are
//! the same view when their identifiers match; every other field is a
//! policy attached to that identity.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// How a view takes input focus when it is sorted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusPolicy {
    /// Always takes focus, blurring whoever held it.
    Static,
    /// Takes focus only when no other view holds it.
    #[default]
    Dynamic,
    /// Never takes host focus.
    Silent,
}

/// What happens to a view when it is closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Destroyed on close.
    None,
    /// Retained until the current scene is torn down.
    #[default]
    #[serde(alias = "scoped")]
    ScopedRetain,
    /// Retained for the lifetime of the registry.
    #[serde(alias = "shared")]
    SharedRetain,
}

/// Immutable view descriptor.
///
/// Equality and hashing consider the identifier only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewMeta {
    /// Stable key of the view type.
    pub identifier: String,
    /// Render order override. Unset means the order follows stack position.
    #[serde(default)]
    pub fixed_order: Option<i32>,
    /// Focus policy.
    #[serde(default)]
    pub focus: FocusPolicy,
    /// Cache policy.
    #[serde(default)]
    pub cache: CachePolicy,
    /// Whether several instances may be open or retained at once.
    #[serde(default)]
    pub multiple: bool,
}

impl ViewMeta {
    /// Creates a descriptor with default policies: dynamic focus, scoped
    /// retention, single instance, no fixed order.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fixed_order: None,
            focus: FocusPolicy::default(),
            cache: CachePolicy::default(),
            multiple: false,
        }
    }

    /// Sets a fixed render order.
    #[must_use]
    pub fn with_fixed_order(mut self, order: i32) -> Self {
        self.fixed_order = Some(order);
        self
    }

    /// Sets the focus policy.
    #[must_use]
    pub fn with_focus(mut self, focus: FocusPolicy) -> Self {
        self.focus = focus;
        self
    }

    /// Sets the cache policy.
    #[must_use]
    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    /// Allows several instances at once.
    #[must_use]
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }
}

impl PartialEq for ViewMeta {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for ViewMeta {}

impl Hash for ViewMeta {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}
