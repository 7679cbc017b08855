//! Access control list: roles with inheritance, hierarchical resources,
//! and allow/deny rules keyed by `(role, resource, privilege)`.
//!
//! A rule with `resource = None` sits at the root and applies to every
//! resource; a rule with `privilege = None` covers all privileges.
//! Evaluation is deny-by-default.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{BastionError, BastionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    Allow,
    Deny,
}

/// Outcome of evaluating a single `(role, resource, privilege)` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclDecision {
    Allowed,
    Denied,
    /// The queried resource is not a node of the graph.
    ResourceNotFound,
    /// The queried role is not registered.
    RoleNotFound,
}

impl AclDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AclDecision::Allowed)
    }
}

impl From<Access> for AclDecision {
    fn from(access: Access) -> Self {
        match access {
            Access::Allow => AclDecision::Allowed,
            Access::Deny => AclDecision::Denied,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    pub role: String,
    pub resource: Option<String>,
    pub privilege: Option<String>,
    pub access: Access,
}

/// Permission graph snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    /// Role name to its parents, in declaration order.
    roles: BTreeMap<String, Vec<String>>,
    /// Resource name to its parent resource.
    resources: BTreeMap<String, Option<String>>,
    rules: Vec<AclRule>,
}

impl Acl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a role inheriting from `parents`, which must already exist.
    pub fn add_role(
        &mut self,
        name: impl Into<String>,
        parents: &[&str],
    ) -> BastionResult<&mut Self> {
        let name = name.into();
        if self.roles.contains_key(&name) {
            return Err(BastionError::Validation {
                message: format!("role '{name}' already registered"),
            });
        }
        if let Some(missing) = parents.iter().find(|p| !self.roles.contains_key(**p)) {
            return Err(BastionError::Validation {
                message: format!("parent role '{missing}' of '{name}' is not registered"),
            });
        }
        self.roles
            .insert(name, parents.iter().map(|p| p.to_string()).collect());
        Ok(self)
    }

    /// Register a resource under `parent` (or at the top level).
    pub fn add_resource(
        &mut self,
        name: impl Into<String>,
        parent: Option<&str>,
    ) -> BastionResult<&mut Self> {
        let name = name.into();
        if self.resources.contains_key(&name) {
            return Err(BastionError::Validation {
                message: format!("resource '{name}' already registered"),
            });
        }
        if let Some(parent) = parent {
            if !self.resources.contains_key(parent) {
                return Err(BastionError::Validation {
                    message: format!("parent resource '{parent}' of '{name}' is not registered"),
                });
            }
        }
        self.resources.insert(name, parent.map(str::to_string));
        Ok(self)
    }

    pub fn allow(
        &mut self,
        role: &str,
        resource: Option<&str>,
        privilege: Option<&str>,
    ) -> BastionResult<&mut Self> {
        self.set_rule(role, resource, privilege, Access::Allow)
    }

    pub fn deny(
        &mut self,
        role: &str,
        resource: Option<&str>,
        privilege: Option<&str>,
    ) -> BastionResult<&mut Self> {
        self.set_rule(role, resource, privilege, Access::Deny)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    pub fn has_resource(&self, resource: &str) -> bool {
        self.resources.contains_key(resource)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn rules(&self) -> &[AclRule] {
        &self.rules
    }

    /// Evaluate whether `role` holds `privilege` on `resource`.
    ///
    /// The resource lineage is walked from the resource up to the root.
    /// At each level a rule naming the exact privilege wins over an
    /// all-privileges rule; within each pass the role is consulted
    /// before its ancestors. The first matching rule decides.
    pub fn is_allowed(
        &self,
        role: &str,
        resource: Option<&str>,
        privilege: Option<&str>,
    ) -> AclDecision {
        if !self.has_role(role) {
            return AclDecision::RoleNotFound;
        }
        if let Some(resource) = resource {
            if !self.has_resource(resource) {
                return AclDecision::ResourceNotFound;
            }
        }

        let roles = self.role_lineage(role);
        for level in self.resource_lineage(resource) {
            if let Some(privilege) = privilege {
                if let Some(access) = roles
                    .iter()
                    .find_map(|r| self.rule(r, level, Some(privilege)))
                {
                    return access.into();
                }
            }
            if let Some(access) = roles.iter().find_map(|r| self.rule(r, level, None)) {
                return access.into();
            }
        }
        AclDecision::Denied
    }

    fn set_rule(
        &mut self,
        role: &str,
        resource: Option<&str>,
        privilege: Option<&str>,
        access: Access,
    ) -> BastionResult<&mut Self> {
        if !self.has_role(role) {
            return Err(BastionError::Validation {
                message: format!("role '{role}' is not registered"),
            });
        }
        if let Some(resource) = resource {
            if !self.has_resource(resource) {
                return Err(BastionError::Validation {
                    message: format!("resource '{resource}' is not registered"),
                });
            }
        }

        let existing = self.rules.iter_mut().find(|r| {
            r.role == role
                && r.resource.as_deref() == resource
                && r.privilege.as_deref() == privilege
        });
        match existing {
            Some(rule) => rule.access = access,
            None => self.rules.push(AclRule {
                role: role.to_string(),
                resource: resource.map(str::to_string),
                privilege: privilege.map(str::to_string),
                access,
            }),
        }
        Ok(self)
    }

    fn rule(&self, role: &str, resource: Option<&str>, privilege: Option<&str>) -> Option<Access> {
        self.rules
            .iter()
            .find(|r| {
                r.role == role
                    && r.resource.as_deref() == resource
                    && r.privilege.as_deref() == privilege
            })
            .map(|r| r.access)
    }

    /// The role followed by its ancestors, depth-first in declaration order.
    fn role_lineage<'a>(&'a self, role: &'a str) -> Vec<&'a str> {
        let mut lineage = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![role];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            lineage.push(current);
            if let Some(parents) = self.roles.get(current) {
                stack.extend(parents.iter().rev().map(String::as_str));
            }
        }
        lineage
    }

    /// The resource, its ancestors, then the root (`None`).
    fn resource_lineage<'a>(&'a self, resource: Option<&'a str>) -> Vec<Option<&'a str>> {
        let mut lineage = Vec::new();
        let mut seen = HashSet::new();
        let mut current = resource;
        while let Some(name) = current {
            if !seen.insert(name) {
                break;
            }
            lineage.push(Some(name));
            current = self.resources.get(name).and_then(|p| p.as_deref());
        }
        lineage.push(None);
        lineage
    }
}
