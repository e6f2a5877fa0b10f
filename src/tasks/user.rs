//! Unix user management task
//!
//! Supplementary groups are joined into a single comma separated `groups`
//! field, which is the encoding the engine's user module expects.
//!
//! # Examples
//!
//! ```yaml
//! - name: Create unix user 'deploy'
//!   become: true
//!   become_user: root
//!   ansible.builtin.user:
//!     group: deploy
//!     groups: docker,adm
//!     name: deploy
//!     uid: '1001'
//! ```

use super::{require, IntoTask, State};
use crate::error::BuildError;
use crate::playbook::{BuildContext, Capability, Escalation, Fields, TaskDescriptor, Value};

/// User account management task
#[derive(Debug, Clone, Default)]
pub struct UserTask {
    /// Username
    pub name: String,
    /// Primary group
    pub group: String,
    /// Supplementary groups
    pub groups: Vec<String>,
    /// User ID
    pub uid: Option<u32>,
    /// Desired state; `present` is not emitted
    pub state: State,
    /// Whether the account is a system account
    pub system: bool,
}

impl UserTask {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            ..Default::default()
        }
    }

    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
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

impl IntoTask for UserTask {
    fn into_task(self, _ctx: &BuildContext) -> Result<TaskDescriptor, BuildError> {
        require(&self.name, "user", "name")?;
        require(&self.group, "user", "group")?;

        let title = format!("{} unix user '{}'", self.state.verb(), self.name);

        let mut detail = Fields::new();
        detail.insert("name".to_string(), Value::from(self.name));
        detail.insert("group".to_string(), Value::from(self.group));
        if !self.groups.is_empty() {
            detail.insert("groups".to_string(), Value::from(self.groups.join(",")));
        }
        if let Some(uid) = self.uid {
            detail.insert("uid".to_string(), Value::from(uid.to_string()));
        }
        if self.state != State::Present {
            detail.insert("state".to_string(), Value::from(self.state.as_str()));
        }
        if self.system {
            detail.insert("system".to_string(), Value::from("yes"));
        }

        Ok(
            TaskDescriptor::new(title, Capability::User, Value::Mapping(detail))
                .with_escalation(Escalation::as_user("root")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(task: UserTask) -> TaskDescriptor {
        task.into_task(&BuildContext::new("/srv")).unwrap()
    }

    #[test]
    fn test_supplementary_groups_are_joined() {
        let task = build(UserTask::new("deploy", "deploy").groups(["g1", "g2"]));
        assert_eq!(
            task.detail().get("groups").and_then(Value::as_str),
            Some("g1,g2")
        );
    }

    #[test]
    fn test_minimal_user() {
        let task = build(UserTask::new("deploy", "staff"));
        assert_eq!(task.name(), "Create unix user 'deploy'");
        assert_eq!(task.capability().key(), "ansible.builtin.user");
        assert_eq!(
            task.detail(),
            &Value::mapping([("group", "staff"), ("name", "deploy")])
        );
        assert_eq!(task.escalation(), &Escalation::as_user("root"));
    }

    #[test]
    fn test_uid_state_and_system() {
        let task = build(
            UserTask::new("svc", "svc")
                .uid(999)
                .system(true)
                .state(State::Absent),
        );
        assert_eq!(task.name(), "Remove unix user 'svc'");
        let detail = task.detail();
        assert_eq!(detail.get("uid").and_then(Value::as_str), Some("999"));
        assert_eq!(detail.get("system").and_then(Value::as_str), Some("yes"));
        assert_eq!(detail.get("state").and_then(Value::as_str), Some("absent"));
    }

    #[test]
    fn test_missing_group_rejected() {
        let err = UserTask::new("deploy", "")
            .into_task(&BuildContext::new("/srv"))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingField {
                task: "user",
                field: "group"
            }
        );
    }
}
