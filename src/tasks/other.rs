//! Pass-through task for modules the builder does not model
//!
//! The caller names the module and supplies its detail; any additional
//! top-level keywords (`notify`, `when`, `register`, ...) are passed through
//! verbatim. Escalation is always applied.
//!
//! # Examples
//!
//! ```yaml
//! - name: Allow ssh
//!   become: true
//!   become_user: root
//!   community.general.ufw:
//!     port: '22'
//!     rule: allow
//! ```

use super::{require, IntoTask};
use crate::error::BuildError;
use crate::playbook::{
    BuildContext, Capability, Escalation, Fields, TaskDescriptor, Value, RESERVED_KEYS,
};

/// Generic module invocation
#[derive(Debug, Clone)]
pub struct OtherTask {
    /// Task title
    pub title: String,
    /// Identity to escalate to
    pub become_user: String,
    /// Module to invoke
    pub capability: Capability,
    /// Module arguments
    pub detail: Value,
    /// Additional top-level task keywords
    pub extra: Fields,
}

impl OtherTask {
    pub fn new(
        title: impl Into<String>,
        become_user: impl Into<String>,
        capability: impl Into<Capability>,
        detail: impl Into<Value>,
    ) -> Self {
        Self {
            title: title.into(),
            become_user: become_user.into(),
            capability: capability.into(),
            detail: detail.into(),
            extra: Fields::new(),
        }
    }

    /// Add a top-level task keyword
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl IntoTask for OtherTask {
    fn into_task(self, _ctx: &BuildContext) -> Result<TaskDescriptor, BuildError> {
        require(&self.title, "other", "title")?;
        require(&self.become_user, "other", "become_user")?;

        let key = self.capability.key();
        require(key, "other", "module")?;
        if RESERVED_KEYS.contains(&key) {
            return Err(BuildError::ReservedField {
                key: key.to_string(),
            });
        }
        self.detail.validate(key)?;

        TaskDescriptor::new(self.title, self.capability, self.detail)
            .with_escalation(Escalation::as_user(self.become_user))
            .with_extra(self.extra)
    }
}
