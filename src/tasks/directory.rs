//! Directory creation task
//!
//! Ensures a directory exists with the given mode. Owner defaults to `root`
//! and the group always matches the owner.
//!
//! # Examples
//!
//! ```yaml
//! - name: mkdir /srv/app
//!   become: true
//!   file:
//!     group: deploy
//!     mode: '0755'
//!     owner: deploy
//!     path: /srv/app
//!     state: directory
//! ```

use super::{require, IntoTask, Mode};
use crate::error::BuildError;
use crate::playbook::{BuildContext, Capability, Escalation, TaskDescriptor, Value};

/// Directory management task
#[derive(Debug, Clone)]
pub struct DirectoryTask {
    /// Directory path on the managed host
    pub path: String,
    /// Directory permissions
    pub mode: Mode,
    /// Owner and group
    pub owner: String,
}

impl DirectoryTask {
    pub fn new(path: impl Into<String>, mode: impl Into<Mode>) -> Self {
        Self {
            path: path.into(),
            mode: mode.into(),
            owner: "root".to_string(),
        }
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }
}

impl IntoTask for DirectoryTask {
    fn into_task(self, _ctx: &BuildContext) -> Result<TaskDescriptor, BuildError> {
        require(&self.path, "mkdir", "path")?;
        require(&self.owner, "mkdir", "owner")?;

        let detail = Value::mapping([
            ("path", Value::from(&self.path)),
            ("state", Value::from("directory")),
            ("owner", Value::from(&self.owner)),
            ("group", Value::from(self.owner)),
            ("mode", Value::from(self.mode)),
        ]);

        Ok(
            TaskDescriptor::new(format!("mkdir {}", self.path), Capability::File, detail)
                .with_escalation(Escalation::default_user()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_defaults_to_root() {
        let task = DirectoryTask::new("/var/lib/app", "0750")
            .into_task(&BuildContext::new("/srv"))
            .unwrap();
        assert_eq!(task.name(), "mkdir /var/lib/app");
        assert_eq!(task.escalation(), &Escalation::default_user());
        assert_eq!(
            task.detail(),
            &Value::mapping([
                ("group", "root"),
                ("mode", "0750"),
                ("owner", "root"),
                ("path", "/var/lib/app"),
                ("state", "directory"),
            ])
        );
    }

    #[test]
    fn test_group_follows_owner() {
        let task = DirectoryTask::new("/srv/app", 0o755u32)
            .owner("deploy")
            .into_task(&BuildContext::new("/srv"))
            .unwrap();
        assert_eq!(
            task.detail().get("group").and_then(Value::as_str),
            Some("deploy")
        );
        assert_eq!(
            task.detail().get("mode").and_then(Value::as_i64),
            Some(0o755)
        );
    }
}
