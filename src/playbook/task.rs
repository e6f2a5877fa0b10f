//! Task descriptors
//!
//! A descriptor is one playbook task: a display name, the capability (module)
//! that performs the work, optional privilege escalation, and the capability's
//! detail. Descriptors are immutable once built.

use super::value::{Fields, Value};
use crate::error::BuildError;

/// Keys the builder sets on every task and that callers may not pass through
pub const RESERVED_KEYS: [&str; 3] = ["name", "become", "become_user"];

/// Engine capabilities the builder knows how to shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Debian/Ubuntu package management
    Apt,
    /// Unix group management
    Group,
    /// Unix user management
    User,
    /// File, directory and symlink state
    File,
    /// File upload or inline file creation
    Copy,
    /// Git checkout
    Git,
    /// Command execution without a shell
    Command,
    /// Any other module, named verbatim
    Custom(String),
}

impl Capability {
    /// The module key as the engine spells it
    pub fn key(&self) -> &str {
        match self {
            Capability::Apt => "apt",
            Capability::Group => "ansible.builtin.group",
            Capability::User => "ansible.builtin.user",
            Capability::File => "file",
            Capability::Copy => "copy",
            Capability::Git => "git",
            Capability::Command => "command",
            Capability::Custom(key) => key.as_str(),
        }
    }
}

impl From<&str> for Capability {
    fn from(key: &str) -> Self {
        match key {
            "apt" => Capability::Apt,
            "ansible.builtin.group" => Capability::Group,
            "ansible.builtin.user" => Capability::User,
            "file" => Capability::File,
            "copy" => Capability::Copy,
            "git" => Capability::Git,
            "command" => Capability::Command,
            other => Capability::Custom(other.to_string()),
        }
    }
}

/// Privilege escalation requested by a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Escalation {
    /// Emit `become: true`
    pub enabled: bool,
    /// Emit `become_user`
    pub user: Option<String>,
}

impl Escalation {
    /// No escalation; neither key is emitted
    pub fn none() -> Self {
        Self::default()
    }

    /// `become: true` with the engine's default identity
    pub fn default_user() -> Self {
        Self {
            enabled: true,
            user: None,
        }
    }

    /// `become: true` as a specific identity
    pub fn as_user(user: impl Into<String>) -> Self {
        Self {
            enabled: true,
            user: Some(user.into()),
        }
    }
}

/// A single task entry ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDescriptor {
    name: String,
    capability: Capability,
    detail: Value,
    escalation: Escalation,
    extra: Fields,
}

impl TaskDescriptor {
    pub fn new(name: impl Into<String>, capability: Capability, detail: Value) -> Self {
        Self {
            name: name.into(),
            capability,
            detail,
            escalation: Escalation::none(),
            extra: Fields::new(),
        }
    }

    pub fn with_escalation(mut self, escalation: Escalation) -> Self {
        self.escalation = escalation;
        self
    }

    /// Attach additional top-level keyword fields
    ///
    /// Keys must not collide with the reserved keys or the capability key.
    pub fn with_extra(mut self, extra: Fields) -> Result<Self, BuildError> {
        for (key, value) in &extra {
            if RESERVED_KEYS.contains(&key.as_str()) || key == self.capability.key() {
                return Err(BuildError::ReservedField { key: key.clone() });
            }
            if key.is_empty() {
                return Err(BuildError::InvalidValue {
                    path: self.name.clone(),
                    reason: "field name cannot be empty".to_string(),
                });
            }
            value.validate(key)?;
        }
        self.extra = extra;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }

    pub fn escalation(&self) -> &Escalation {
        &self.escalation
    }

    /// Render the task as a document mapping
    pub fn to_value(&self) -> Value {
        let mut fields = self.extra.clone();
        fields.insert("name".to_string(), Value::from(&self.name));
        if self.escalation.enabled {
            fields.insert("become".to_string(), Value::Bool(true));
        }
        if let Some(user) = &self.escalation.user {
            fields.insert("become_user".to_string(), Value::from(user));
        }
        fields.insert(self.capability.key().to_string(), self.detail.clone());
        Value::Mapping(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_keys_round_trip() {
        for key in [
            "apt",
            "ansible.builtin.group",
            "ansible.builtin.user",
            "file",
            "copy",
            "git",
            "command",
            "ufw",
        ] {
            assert_eq!(Capability::from(key).key(), key);
        }
        assert_eq!(
            Capability::from("community.general.ufw"),
            Capability::Custom("community.general.ufw".to_string())
        );
    }

    #[test]
    fn test_to_value_without_escalation() {
        let task = TaskDescriptor::new(
            "List files",
            Capability::Command,
            Value::mapping([("argv", vec!["ls"])]),
        );
        let value = task.to_value();
        assert_eq!(value.get("name").and_then(Value::as_str), Some("List files"));
        assert!(value.get("become").is_none());
        assert!(value.get("become_user").is_none());
        assert!(value.get("command").is_some());
    }

    #[test]
    fn test_to_value_with_user() {
        let task = TaskDescriptor::new("x", Capability::Git, Value::mapping([("repo", "r")]))
            .with_escalation(Escalation::as_user("deploy"));
        let value = task.to_value();
        assert_eq!(value.get("become").and_then(Value::as_bool), Some(true));
        assert_eq!(
            value.get("become_user").and_then(Value::as_str),
            Some("deploy")
        );
    }

    #[test]
    fn test_extra_rejects_reserved_and_capability_keys() {
        let base = || TaskDescriptor::new("x", Capability::File, Value::mapping([("path", "/a")]));

        let mut extra = Fields::new();
        extra.insert("become_user".to_string(), Value::from("nobody"));
        assert_eq!(
            base().with_extra(extra).unwrap_err(),
            BuildError::ReservedField {
                key: "become_user".to_string()
            }
        );

        let mut extra = Fields::new();
        extra.insert("file".to_string(), Value::from("again"));
        assert!(base().with_extra(extra).is_err());

        let mut extra = Fields::new();
        extra.insert("notify".to_string(), Value::from("restart nginx"));
        let value = base().with_extra(extra).unwrap().to_value();
        assert_eq!(
            value.get("notify").and_then(Value::as_str),
            Some("restart nginx")
        );
    }
}
