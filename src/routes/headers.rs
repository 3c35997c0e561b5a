//! Response-header accumulation.
//!
//! Routes and handlers declare headers directly and by referencing named
//! [`HeaderGroup`]s in a [`HeaderCatalog`]. Groups may include other groups,
//! forming an arbitrary graph — including cycles, which the traversal's
//! visited set terminates. One accumulator serves both route-level and
//! handler-level elements.

use crate::error::ConfigError;
use std::collections::{HashMap, HashSet, VecDeque};

/// A named, reusable set of response headers, possibly including other
/// groups.
#[derive(Debug, Clone, Default)]
pub struct HeaderGroup {
    entries: Vec<(String, String)>,
    includes: Vec<String>,
}

impl HeaderGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entry(mut self, name: &str, value: &str) -> Self {
        self.entries.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn include(mut self, group: &str) -> Self {
        self.includes.push(group.to_string());
        self
    }
}

/// The set of header groups known at registration time.
#[derive(Debug, Clone, Default)]
pub struct HeaderCatalog {
    groups: HashMap<String, HeaderGroup>,
}

impl HeaderCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str, group: HeaderGroup) {
        self.groups.insert(name.to_string(), group);
    }

    /// Collect the full header set of one annotated element: its direct
    /// entries plus everything reachable through its group references.
    ///
    /// Breadth-first over group names with a visited set; a group cycle
    /// terminates silently — the first occurrence's entries are kept and a
    /// revisit contributes nothing further. Within one element the first
    /// occurrence of a header name wins, so direct entries take precedence
    /// over group entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownHeaderGroup`] for a reference to a
    /// group the catalog does not define.
    pub fn accumulate(
        &self,
        direct: &[(String, String)],
        groups: &[String],
    ) -> Result<Vec<(String, String)>, ConfigError> {
        let mut out: Vec<(String, String)> = Vec::new();
        for (name, value) in direct {
            push_first(&mut out, name, value);
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = groups.iter().cloned().collect();
        while let Some(group_name) = queue.pop_front() {
            if !visited.insert(group_name.clone()) {
                continue;
            }
            let group = self
                .groups
                .get(&group_name)
                .ok_or(ConfigError::UnknownHeaderGroup { group: group_name })?;
            for (name, value) in &group.entries {
                push_first(&mut out, name, value);
            }
            queue.extend(group.includes.iter().cloned());
        }
        Ok(out)
    }
}

fn push_first(out: &mut Vec<(String, String)>, name: &str, value: &str) {
    if !out.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
        out.push((name.to_string(), value.to_string()));
    }
}

/// Merge a child element's headers over its ancestors', the child winning
/// on a name collision. Called per hierarchy level at registration time.
#[must_use]
pub(crate) fn merge_over(
    parent: &[(String, String)],
    child: Vec<(String, String)>,
) -> Vec<(String, String)> {
    let mut merged = parent.to_vec();
    for (name, value) in child {
        if let Some(slot) = merged.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            slot.1 = value;
        } else {
            merged.push((name, value));
        }
    }
    merged
}
