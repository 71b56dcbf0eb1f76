//! Bounded depth-first traversal state
//!
//! Every hierarchy walk (depth walking, ancestor path enumeration) threads a
//! [`BoundedWalk`] through its recursion: a visited set that stops a node
//! from being expanded twice, plus a depth ceiling that stops runaway
//! recursion on cyclic input. Hitting the ceiling is recorded, not fatal;
//! callers decide whether a truncated answer is acceptable.

use std::collections::HashSet;

use crate::errors::{HierarchyError, Result};

#[derive(Debug, Clone)]
pub struct BoundedWalk {
    ceiling: usize,
    visited: HashSet<String>,
    truncated: bool,
}

impl BoundedWalk {
    pub fn new(ceiling: usize) -> Self {
        Self {
            ceiling,
            visited: HashSet::new(),
            truncated: false,
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// True once `depth` is past the ceiling. The walk remembers it was cut short.
    pub fn exceeds(&mut self, depth: usize) -> bool {
        if depth > self.ceiling {
            self.truncated = true;
            true
        } else {
            false
        }
    }

    /// Mark `id` visited; false if it already was
    pub fn visit(&mut self, id: &str) -> bool {
        if self.visited.contains(id) {
            return false;
        }
        self.visited.insert(id.to_string())
    }

    pub fn is_visited(&self, id: &str) -> bool {
        self.visited.contains(id)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// In strict mode a truncated walk is reported as a malformed hierarchy
    pub fn ensure_complete(&self, strict: bool, context: &str) -> Result<()> {
        if strict && self.truncated {
            return Err(HierarchyError::MalformedHierarchy(format!(
                "{} exceeded the traversal ceiling of {} (cycle or pathological depth)",
                context, self.ceiling
            )));
        }
        Ok(())
    }
}
