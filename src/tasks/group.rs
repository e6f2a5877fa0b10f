//! Unix group management task
//!
//! Numeric fields are emitted as strings because that is how the engine's
//! group module expects them.
//!
//! # Examples
//!
//! ```yaml
//! - name: Create unix group 'www'
//!   become: true
//!   become_user: root
//!   ansible.builtin.group:
//!     gid: '33'
//!     name: www
//!     system: 'yes'
//! ```

use super::{require, IntoTask, State};
use crate::error::BuildError;
use crate::playbook::{BuildContext, Capability, Escalation, Fields, TaskDescriptor, Value};

/// Group management task
#[derive(Debug, Clone, Default)]
pub struct GroupTask {
    /// Group name
    pub name: String,
    /// Group ID
    pub gid: Option<u32>,
    /// Desired state; `present` is the engine default and is not emitted
    pub state: State,
    /// Whether the group is a system group
    pub system: bool,
}

impl GroupTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn gid(mut self, gid: u32) -> Self {
        self.gid = Some(gid);
        self
    }

    pub fn state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn system(mut self, system: bool) -> Self {
        self.system = system;
        self
    }
}

impl IntoTask for GroupTask {
    fn into_task(self, _ctx: &BuildContext) -> Result<TaskDescriptor, BuildError> {
        require(&self.name, "group", "name")?;

        let title = format!("{} unix group '{}'", self.state.verb(), self.name);

        let mut detail = Fields::new();
        detail.insert("name".to_string(), Value::from(self.name));
        if let Some(gid) = self.gid {
            detail.insert("gid".to_string(), Value::from(gid.to_string()));
        }
        if self.state != State::Present {
            detail.insert("state".to_string(), Value::from(self.state.as_str()));
        }
        if self.system {
            detail.insert("system".to_string(), Value::from("yes"));
        }

        Ok(
            TaskDescriptor::new(title, Capability::Group, Value::Mapping(detail))
                .with_escalation(Escalation::as_user("root")),
        )
    }
}
