//! # Stack Sorter
//!
//! Owns the open list and the focus table. Every operation returns a
//! [`SortPass`] describing what the host and the views must be told; the
//! registry applies it.
//!
//! ```text
//! index:   0      1      2      3
//!        [Hud]  [Bag]  [Shop] [Tip]        bottom ──> top
//! order:  9000   600    700    800         base + index * step, or fixed
//! ```
//!
//! Focus rule, applied to the sorted view only:
//! - `Static`  always focuses, blurring the current holder
//! - `Dynamic` focuses only when nobody else holds focus
//! - `Silent`  is blurred without touching host focus

use crate::config::StackConfig;
use crate::meta::FocusPolicy;
use crate::view::ViewId;
use std::collections::HashMap;

/// A member of the open list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackEntry {
    /// View handle.
    pub id: ViewId,
    /// Focus policy of the view.
    pub focus: FocusPolicy,
    /// Render order override.
    pub fixed_order: Option<i32>,
}

/// A focus transition to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusChange {
    /// Call `on_focus` and give host focus.
    Focus(ViewId),
    /// Call `on_blur`, and take host focus if `host` is set.
    Blur {
        /// View losing focus.
        id: ViewId,
        /// Whether the host is told.
        host: bool,
    },
}

/// Outcome of a sorter operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortPass {
    /// Render orders of every member, bottom to top.
    pub orders: Vec<(ViewId, i32)>,
    /// Focus transitions, in the order they must be applied.
    pub focus: Vec<FocusChange>,
    /// Members removed because they were no longer valid.
    pub pruned: Vec<ViewId>,
}

/// Open list plus focus table.
#[derive(Debug, Default)]
pub struct StackSorter {
    config: StackConfig,
    entries: Vec<StackEntry>,
    focused: HashMap<ViewId, bool>,
}

impl StackSorter {
    /// Creates an empty stack.
    #[must_use]
    pub fn new(config: StackConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            focused: HashMap::new(),
        }
    }

    /// Render order parameters.
    #[must_use]
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Handles of the open list, bottom to top.
    #[must_use]
    pub fn ids(&self) -> Vec<ViewId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// The top of the stack.
    #[must_use]
    pub fn top(&self) -> Option<ViewId> {
        self.entries.last().map(|entry| entry.id)
    }

    /// Returns true if `id` is on the stack.
    #[must_use]
    pub fn contains(&self, id: ViewId) -> bool {
        self.position(id).is_some()
    }

    /// Returns the last-known focus flag of `id`.
    #[must_use]
    pub fn is_focused(&self, id: ViewId) -> bool {
        self.focused.get(&id).copied().unwrap_or(false)
    }

    /// Number of views on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: ViewId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Places `entry` before `below`, else after `above`, else on top, then
    /// recomputes every render order and applies the focus rule to it.
    ///
    /// Members for which `alive` returns false are pruned first. If the
    /// sorted view itself is not alive, nothing else happens.
    pub fn sort(
        &mut self,
        entry: StackEntry,
        below: Option<ViewId>,
        above: Option<ViewId>,
        alive: impl Fn(ViewId) -> bool,
    ) -> SortPass {
        let mut pass = SortPass {
            pruned: self.prune(&alive),
            ..SortPass::default()
        };
        if !alive(entry.id) {
            self.remove(entry.id);
            tracing::error!("StackSorter: {} is no longer valid, sort skipped", entry.id);
            if !pass.pruned.contains(&entry.id) {
                pass.pruned.push(entry.id);
            }
            return pass;
        }

        if let Some(index) = self.position(entry.id) {
            self.entries.remove(index);
        }
        let index = self.anchor(entry.id, below, above);
        self.entries.insert(index, entry);

        pass.orders = self.orders();
        pass.focus = self.apply_rule(entry);
        pass
    }

    fn anchor(&self, id: ViewId, below: Option<ViewId>, above: Option<ViewId>) -> usize {
        let lookup = |anchor: Option<ViewId>, name: &str| {
            let anchor = anchor?;
            if anchor == id {
                tracing::warn!("StackSorter: {} anchored to itself as {}", id, name);
                return None;
            }
            let index = self.position(anchor);
            if index.is_none() {
                tracing::warn!("StackSorter: {} anchor {} is not open", name, anchor);
            }
            index
        };
        if let Some(index) = lookup(below, "below") {
            return index;
        }
        if let Some(index) = lookup(above, "above") {
            return index + 1;
        }
        self.entries.len()
    }

    fn prune(&mut self, alive: &impl Fn(ViewId) -> bool) -> Vec<ViewId> {
        let mut pruned = Vec::new();
        self.entries.retain(|entry| {
            let keep = alive(entry.id);
            if !keep {
                tracing::error!("StackSorter: {} has already been destroyed", entry.id);
                pruned.push(entry.id);
            }
            keep
        });
        for id in &pruned {
            self.focused.remove(id);
        }
        pruned
    }

    fn orders(&self) -> Vec<(ViewId, i32)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.id, self.config.render_order(index, entry.fixed_order)))
            .collect()
    }

    fn apply_rule(&mut self, entry: StackEntry) -> Vec<FocusChange> {
        match entry.focus {
            FocusPolicy::Silent => {
                self.focused.insert(entry.id, false);
                vec![FocusChange::Blur {
                    id: entry.id,
                    host: false,
                }]
            }
            FocusPolicy::Static => self.take_focus(entry.id),
            FocusPolicy::Dynamic => {
                let other_focused = self
                    .entries
                    .iter()
                    .any(|other| other.id != entry.id && self.is_focused(other.id));
                if other_focused {
                    self.focused.insert(entry.id, false);
                    Vec::new()
                } else {
                    self.take_focus(entry.id)
                }
            }
        }
    }

    fn take_focus(&mut self, id: ViewId) -> Vec<FocusChange> {
        let mut changes: Vec<FocusChange> = self
            .entries
            .iter()
            .filter(|other| other.id != id && self.is_focused(other.id))
            .map(|other| FocusChange::Blur {
                id: other.id,
                host: true,
            })
            .collect();
        for change in &changes {
            if let FocusChange::Blur { id, .. } = change {
                self.focused.insert(*id, false);
            }
        }
        self.focused.insert(id, true);
        changes.push(FocusChange::Focus(id));
        changes
    }

    /// Re-applies the focus rule to the top view without moving it. A top
    /// that already holds focus is left alone.
    pub fn refocus_top(&mut self) -> Vec<FocusChange> {
        match self.entries.last().copied() {
            Some(top) if self.is_focused(top.id) => Vec::new(),
            Some(top) => self.apply_rule(top),
            None => Vec::new(),
        }
    }

    /// Forces focus onto `id`. Silent views and views not on the stack are
    /// left alone.
    pub fn focus(&mut self, id: ViewId) -> Vec<FocusChange> {
        match self.position(id).map(|index| self.entries[index]) {
            Some(entry) if entry.focus != FocusPolicy::Silent => self.take_focus(id),
            Some(_) => {
                tracing::debug!("StackSorter: {} is silent, focus ignored", id);
                Vec::new()
            }
            None => {
                tracing::error!("StackSorter: {} is not open, focus ignored", id);
                Vec::new()
            }
        }
    }

    /// Removes `id` from the stack and the focus table.
    ///
    /// Returns true if it was on the stack.
    pub fn remove(&mut self, id: ViewId) -> bool {
        self.focused.remove(&id);
        match self.position(id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }
}
