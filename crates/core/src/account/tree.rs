//! Id-indexed account table with a parent → children adjacency map.
//!
//! Nodes never hold references to each other; the tree is navigated through
//! ids only, so a malformed input cannot create reference cycles in memory
//! and every structural check is an explicit lookup.

use std::collections::{HashMap, HashSet};

use medfin_shared::types::AccountId;

use super::error::HierarchyError;
use super::types::{AccountNode, validate_code};

/// The chart of accounts as a validated forest.
#[derive(Debug, Clone, Default)]
pub struct AccountTree {
    nodes: HashMap<AccountId, AccountNode>,
    children: HashMap<AccountId, Vec<AccountId>>,
    roots: Vec<AccountId>,
    codes: HashSet<String>,
}

impl AccountTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from stored rows in any order.
    ///
    /// Rows are inserted shallowest first so parents always precede children.
    pub fn build(mut nodes: Vec<AccountNode>) -> Result<Self, HierarchyError> {
        nodes.sort_by_key(|n| (n.level, n.id));
        let mut tree = Self::new();
        for node in nodes {
            tree.insert(node)?;
        }
        Ok(tree)
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up an account.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&AccountNode> {
        self.nodes.get(&id)
    }

    /// True when some account already uses `code`.
    #[must_use]
    pub fn contains_code(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// The level a new child of `parent` must have.
    pub fn level_for(&self, parent: Option<AccountId>) -> Result<i32, HierarchyError> {
        match parent {
            None => Ok(1),
            Some(pid) => self
                .nodes
                .get(&pid)
                .map(|p| p.level + 1)
                .ok_or(HierarchyError::ParentNotFound(pid)),
        }
    }

    /// Checks code and parent for a new account and returns its level.
    pub fn placement(&self, code: &str, parent: Option<AccountId>) -> Result<i32, HierarchyError> {
        validate_code(code)?;
        if self.codes.contains(code) {
            return Err(HierarchyError::DuplicateCode(code.to_string()));
        }
        self.level_for(parent)
    }

    /// Checks that `node` could be inserted, without inserting it.
    pub fn validate_new(&self, node: &AccountNode) -> Result<(), HierarchyError> {
        if self.nodes.contains_key(&node.id) {
            return Err(HierarchyError::DuplicateId(node.id));
        }
        let expected = self.placement(&node.code, node.parent_id)?;
        if node.level != expected {
            return Err(HierarchyError::LevelMismatch {
                expected,
                got: node.level,
            });
        }
        Ok(())
    }

    /// Validates and inserts an account.
    pub fn insert(&mut self, node: AccountNode) -> Result<(), HierarchyError> {
        self.validate_new(&node)?;
        match node.parent_id {
            Some(pid) => self.children.entry(pid).or_default().push(node.id),
            None => self.roots.push(node.id),
        }
        self.codes.insert(node.code.clone());
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Direct children of `id`.
    #[must_use]
    pub fn children(&self, id: AccountId) -> &[AccountId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Level-1 accounts in insertion order.
    #[must_use]
    pub fn top_level(&self) -> &[AccountId] {
        &self.roots
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: AccountId) -> Result<Vec<AccountId>, HierarchyError> {
        let mut current = self
            .nodes
            .get(&id)
            .ok_or(HierarchyError::AccountNotFound(id))?;
        let mut out = Vec::new();
        while let Some(pid) = current.parent_id {
            out.push(pid);
            current = self
                .nodes
                .get(&pid)
                .ok_or(HierarchyError::ParentNotFound(pid))?;
        }
        Ok(out)
    }

    /// `id` followed by all of its descendants, depth first.
    pub fn subtree(&self, id: AccountId) -> Result<Vec<AccountId>, HierarchyError> {
        if !self.nodes.contains_key(&id) {
            return Err(HierarchyError::AccountNotFound(id));
        }
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        Ok(out)
    }

    /// Checks that `code` may be assigned to account `id`.
    pub fn validate_code_change(&self, id: AccountId, code: &str) -> Result<(), HierarchyError> {
        validate_code(code)?;
        let node = self
            .nodes
            .get(&id)
            .ok_or(HierarchyError::AccountNotFound(id))?;
        if node.code != code && self.codes.contains(code) {
            return Err(HierarchyError::DuplicateCode(code.to_string()));
        }
        Ok(())
    }

    /// Checks that account `id` may be moved under `new_parent`.
    ///
    /// The move must keep the account at its current depth (stored levels of
    /// the subtree stay valid) and must not place it inside its own subtree.
    pub fn validate_reparent(
        &self,
        id: AccountId,
        new_parent: Option<AccountId>,
    ) -> Result<(), HierarchyError> {
        let node = self
            .nodes
            .get(&id)
            .ok_or(HierarchyError::AccountNotFound(id))?;

        if let Some(pid) = new_parent {
            if pid == id {
                return Err(HierarchyError::Cycle { id, parent: pid });
            }
            if !self.nodes.contains_key(&pid) {
                return Err(HierarchyError::ParentNotFound(pid));
            }
            if self.ancestors(pid)?.contains(&id) {
                return Err(HierarchyError::Cycle { id, parent: pid });
            }
        }

        let expected = self.level_for(new_parent)?;
        if node.level != expected {
            return Err(HierarchyError::LevelMismatch {
                expected,
                got: node.level,
            });
        }
        Ok(())
    }

    /// Validates and applies a move.
    pub fn reparent(
        &mut self,
        id: AccountId,
        new_parent: Option<AccountId>,
    ) -> Result<(), HierarchyError> {
        self.validate_reparent(id, new_parent)?;
        let old_parent = self.nodes.get(&id).and_then(|n| n.parent_id);
        if old_parent == new_parent {
            return Ok(());
        }

        match old_parent {
            Some(pid) => {
                if let Some(siblings) = self.children.get_mut(&pid) {
                    siblings.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        match new_parent {
            Some(pid) => self.children.entry(pid).or_default().push(id),
            None => self.roots.push(id),
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent_id = new_parent;
        }
        Ok(())
    }

    /// Removes `id` and its descendants, returning the removed ids.
    pub fn remove_subtree(&mut self, id: AccountId) -> Result<Vec<AccountId>, HierarchyError> {
        let removed = self.subtree(id)?;
        let parent = self.nodes.get(&id).and_then(|n| n.parent_id);
        match parent {
            Some(pid) => {
                if let Some(siblings) = self.children.get_mut(&pid) {
                    siblings.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        for gone in &removed {
            self.children.remove(gone);
            if let Some(node) = self.nodes.remove(gone) {
                self.codes.remove(&node.code);
            }
        }
        Ok(removed)
    }
}
