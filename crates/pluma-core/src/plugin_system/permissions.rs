use std::collections::HashMap;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::DefaultGrant;

/// A permission as registered by an activated plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub name: String,
    pub default: DefaultGrant,
}

/// Process-wide permission registry.
///
/// Registrations from successfully activated plugins are never rolled back,
/// even when a later plugin in the same load call fails.
#[derive(Debug, Default)]
pub struct PermissionRegistry {
    permissions: HashMap<String, Permission>,
}

impl PermissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.permissions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Permission> {
        self.permissions.get(name)
    }

    /// Register a permission. Name collisions are an error; callers that need
    /// all-or-nothing semantics must pre-check with [`contains`](Self::contains).
    pub fn register(&mut self, permission: Permission) -> Result<(), PluginSystemError> {
        if self.permissions.contains_key(&permission.name) {
            return Err(PluginSystemError::DuplicatePermission {
                name: String::new(),
                permission: permission.name,
            });
        }
        self.permissions.insert(permission.name.clone(), permission);
        Ok(())
    }

    /// Evaluate a permission for a subject. `None` when the permission is
    /// unknown. The not-operator tier grants to everyone except operators.
    pub fn is_granted(&self, name: &str, operator: bool) -> Option<bool> {
        self.permissions.get(name).map(|p| match p.default {
            DefaultGrant::Always => true,
            DefaultGrant::Operator => operator,
            DefaultGrant::NotOperator => !operator,
        })
    }

    pub fn count(&self) -> usize {
        self.permissions.len()
    }
}
