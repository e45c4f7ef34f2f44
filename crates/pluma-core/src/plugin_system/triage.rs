use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::source::SourceLoader;

/// A plugin that passed triage and is waiting for its dependencies.
pub struct TriageEntry {
    pub path: PathBuf,
    pub loader: Arc<dyn SourceLoader>,
    pub manifest: PluginManifest,
}

/// Working set for a load pass. Candidates are keyed by plugin name, with
/// a separate insertion-order queue so iteration never depends on hash
/// ordering. Hard and soft dependency sets shrink as plugins activate;
/// a candidate is ready when both of its sets are gone.
#[derive(Default)]
pub struct LoadTriage {
    entries: HashMap<String, TriageEntry>,
    order: Vec<String>,
    hard_deps: HashMap<String, HashSet<String>>,
    soft_deps: HashMap<String, HashSet<String>>,
}

impl LoadTriage {
    pub fn new() -> Self {
        LoadTriage::default()
    }

    pub fn insert(&mut self, entry: TriageEntry) {
        let name = entry.manifest.name.clone();
        if !entry.manifest.depend.is_empty() {
            self.hard_deps
                .insert(name.clone(), entry.manifest.depend.iter().cloned().collect());
        }
        if !entry.manifest.softdepend.is_empty() {
            // Merge rather than replace; a load-before declaration from an
            // earlier candidate may already have seeded this set.
            self.soft_deps
                .entry(name.clone())
                .or_default()
                .extend(entry.manifest.softdepend.iter().cloned());
        }
        self.order.push(name.clone());
        self.entries.insert(name, entry);
    }

    /// Add a single soft dependency `dep` to `name`, creating the set if
    /// needed. `name` does not have to be a triaged candidate yet.
    pub fn add_soft(&mut self, name: &str, dep: &str) {
        self.soft_deps
            .entry(name.to_string())
            .or_default()
            .insert(dep.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TriageEntry> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<TriageEntry> {
        let entry = self.entries.remove(name)?;
        self.order.retain(|n| n != name);
        self.hard_deps.remove(name);
        self.soft_deps.remove(name);
        Some(entry)
    }

    /// Names of the remaining candidates in insertion order.
    pub fn queue(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn hard_deps(&self, name: &str) -> Option<&HashSet<String>> {
        self.hard_deps.get(name)
    }

    pub fn soft_deps(&self, name: &str) -> Option<&HashSet<String>> {
        self.soft_deps.get(name)
    }

    /// Drop `dep` from a candidate's hard dependency set, removing the set
    /// once empty. Returns true if the set is now satisfied.
    pub fn satisfy_hard(&mut self, name: &str, dep: &str) -> bool {
        if let Some(set) = self.hard_deps.get_mut(name) {
            set.remove(dep);
            if set.is_empty() {
                self.hard_deps.remove(name);
                return true;
            }
            return false;
        }
        true
    }

    /// Drop `dep` from a candidate's soft dependency set, removing the set
    /// once empty. Returns true if the set is now satisfied.
    pub fn satisfy_soft(&mut self, name: &str, dep: &str) -> bool {
        if let Some(set) = self.soft_deps.get_mut(name) {
            set.remove(dep);
            if set.is_empty() {
                self.soft_deps.remove(name);
                return true;
            }
            return false;
        }
        true
    }

    pub fn hard_satisfied(&self, name: &str) -> bool {
        !self.hard_deps.contains_key(name)
    }

    pub fn soft_satisfied(&self, name: &str) -> bool {
        !self.soft_deps.contains_key(name)
    }
}
