//! # Element Binding
//!
//! A view type declares its elements in a [`ViewSchema`]: class-level
//! elements, member-level elements and the schema of the type it extends.
//! [`ElementBinder`] flattens the chain once per type:
//!
//! ```text
//! Base   { class: [b0], members: [b1] }
//!   └─ Leaf { class: [l0], members: [l1, l2] }
//!
//! resolve(Leaf) = [b0, b1, l0, l1, l2]
//! ```
//!
//! Root-most ancestor first; within a level, class elements precede member
//! elements and declaration order is kept.

use core::any::type_name;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// What an element descriptor is attached to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementTarget {
    /// The view type itself.
    Class,
    /// A named member of the view type.
    Member(String),
}

/// A single declarative element, as handed to the host's binding step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementDescriptor {
    /// Element name (usually a path into the panel).
    pub name: String,
    /// What the element binds to.
    pub target: ElementTarget,
    /// Extra host-specific parameters.
    pub extras: Vec<String>,
}

impl ElementDescriptor {
    /// Creates a class-level descriptor.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: ElementTarget::Class,
            extras: Vec::new(),
        }
    }

    /// Creates a member-level descriptor.
    #[must_use]
    pub fn member(member: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: ElementTarget::Member(member.into()),
            extras: Vec::new(),
        }
    }

    /// Appends an extra parameter.
    #[must_use]
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extras.push(extra.into());
        self
    }
}

/// Declared elements of one view type.
#[derive(Clone, Debug)]
pub struct ViewSchema {
    key: String,
    parent: Option<Arc<ViewSchema>>,
    class: Vec<ElementDescriptor>,
    members: Vec<ElementDescriptor>,
}

impl ViewSchema {
    /// Creates an empty schema with memoization key `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            parent: None,
            class: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Creates an empty schema keyed by `T`'s type name.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self::new(type_name::<T>())
    }

    /// Declares the schema of the extended type.
    #[must_use]
    pub fn extends(mut self, parent: Arc<ViewSchema>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declares an element. Class and member elements are kept in separate
    /// lists, each in declaration order.
    #[must_use]
    pub fn element(mut self, descriptor: ElementDescriptor) -> Self {
        match descriptor.target {
            ElementTarget::Class => self.class.push(descriptor),
            ElementTarget::Member(_) => self.members.push(descriptor),
        }
        self
    }

    /// Memoization key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Schema of the extended type.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<ViewSchema>> {
        self.parent.as_ref()
    }

    fn flatten(&self) -> Vec<ElementDescriptor> {
        let mut chain = vec![self];
        let mut cursor = self.parent.as_deref();
        while let Some(schema) = cursor {
            chain.push(schema);
            cursor = schema.parent.as_deref();
        }
        chain
            .into_iter()
            .rev()
            .flat_map(|schema| schema.class.iter().chain(schema.members.iter()))
            .cloned()
            .collect()
    }
}

/// Resolves and memoizes flattened element lists by schema key.
///
/// Two schemas sharing a key are assumed to describe the same type.
#[derive(Default)]
pub struct ElementBinder {
    memo: Mutex<HashMap<String, Arc<[ElementDescriptor]>>>,
}

impl ElementBinder {
    /// Creates a binder with an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered element list for `schema`. Empty for `None` or a schema
    /// that declares nothing.
    pub fn resolve(&self, schema: Option<&ViewSchema>) -> Arc<[ElementDescriptor]> {
        let Some(schema) = schema else {
            return Arc::from(Vec::new());
        };
        if let Some(resolved) = self.memo.lock().get(schema.key()) {
            return Arc::clone(resolved);
        }
        let resolved: Arc<[ElementDescriptor]> = Arc::from(schema.flatten());
        tracing::trace!(
            "ElementBinder: resolved {} elements for {}",
            resolved.len(),
            schema.key()
        );
        self.memo
            .lock()
            .insert(schema.key().to_owned(), Arc::clone(&resolved));
        resolved
    }

    /// Number of memoized schemas.
    #[must_use]
    pub fn memoized(&self) -> usize {
        self.memo.lock().len()
    }
}

impl std::fmt::Debug for ElementBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementBinder")
            .field("memoized", &self.memoized())
            .finish()
    }
}
