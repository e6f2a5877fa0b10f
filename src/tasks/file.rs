//! Path removal and symlink tasks
//!
//! Both are expressed through [`OtherTask`] against the `file` module.
//!
//! # Examples
//!
//! ```yaml
//! - name: Create '/etc/nginx/sites-enabled/app' symlink to /etc/nginx/sites-available/app
//!   become: true
//!   become_user: root
//!   file:
//!     force: false
//!     group: root
//!     mode: 420
//!     owner: root
//!     path: /etc/nginx/sites-enabled/app
//!     src: /etc/nginx/sites-available/app
//!     state: link
//! ```

use super::{require, IntoTask, Mode, OtherTask};
use crate::error::BuildError;
use crate::playbook::{BuildContext, Capability, TaskDescriptor, Value};

/// Remove a file, link or directory tree
#[derive(Debug, Clone)]
pub struct UnlinkTask {
    /// Path to remove
    pub path: String,
    /// Identity to escalate to
    pub become_user: String,
}

impl UnlinkTask {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            become_user: "root".to_string(),
        }
    }

    pub fn become_user(mut self, user: impl Into<String>) -> Self {
        self.become_user = user.into();
        self
    }
}

impl IntoTask for UnlinkTask {
    fn into_task(self, ctx: &BuildContext) -> Result<TaskDescriptor, BuildError> {
        require(&self.path, "unlink", "path")?;

        let detail = Value::mapping([
            ("path", Value::from(&self.path)),
            ("state", Value::from("absent")),
            ("force", Value::from(true)),
        ]);

        OtherTask::new(
            format!("Unlink (rm) {}", self.path),
            self.become_user,
            Capability::File,
            detail,
        )
        .into_task(ctx)
    }
}

/// Create a symbolic link
#[derive(Debug, Clone)]
pub struct SymlinkTask {
    /// Link path
    pub path: String,
    /// Link target
    pub src: String,
    /// Owner of the link
    pub owner: String,
    /// Group of the link
    pub group: String,
    /// Permissions; defaults to `0o644`
    pub mode: Mode,
    /// Overwrite instead of refusing.
    ///
    /// Must be set when the target does not exist yet but will appear later,
    /// or when `path` currently exists as a regular file that the link
    /// replaces.
    pub force: bool,
    /// Identity to escalate to; defaults to the owner
    pub become_user: Option<String>,
}

impl SymlinkTask {
    pub fn new(
        path: impl Into<String>,
        src: impl Into<String>,
        owner: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            src: src.into(),
            owner: owner.into(),
            group: group.into(),
            mode: Mode::Numeric(0o644),
            force: false,
            become_user: None,
        }
    }

    pub fn mode(mut self, mode: impl Into<Mode>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn become_user(mut self, user: impl Into<String>) -> Self {
        self.become_user = Some(user.into());
        self
    }
}

impl IntoTask for SymlinkTask {
    fn into_task(self, ctx: &BuildContext) -> Result<TaskDescriptor, BuildError> {
        require(&self.path, "symlink", "path")?;
        require(&self.src, "symlink", "src")?;
        require(&self.owner, "symlink", "owner")?;
        require(&self.group, "symlink", "group")?;

        let title = format!("Create '{}' symlink to {}", self.path, self.src);
        let become_user = self.become_user.unwrap_or_else(|| self.owner.clone());

        let detail = Value::mapping([
            ("path", Value::from(self.path)),
            ("state", Value::from("link")),
            ("src", Value::from(self.src)),
            ("owner", Value::from(self.owner)),
            ("group", Value::from(self.group)),
            ("mode", Value::from(self.mode)),
            ("force", Value::from(self.force)),
        ]);

        OtherTask::new(title, become_user, Capability::File, detail).into_task(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playbook::Escalation;

    fn ctx() -> BuildContext {
        BuildContext::new("/srv")
    }

    #[test]
    fn test_unlink_defaults_to_root() {
        let task = UnlinkTask::new("/etc/nginx/sites-enabled/default")
            .into_task(&ctx())
            .unwrap();
        assert_eq!(task.name(), "Unlink (rm) /etc/nginx/sites-enabled/default");
        assert_eq!(task.escalation(), &Escalation::as_user("root"));
        assert_eq!(
            task.detail().get("state").and_then(Value::as_str),
            Some("absent")
        );
        assert_eq!(
            task.detail().get("force").and_then(Value::as_bool),
            Some(true)
        );
    }

    #[test]
    fn test_unlink_become_override() {
        let task = UnlinkTask::new("/home/deploy/tmp")
            .become_user("deploy")
            .into_task(&ctx())
            .unwrap();
        assert_eq!(task.escalation(), &Escalation::as_user("deploy"));
    }

    #[test]
    fn test_symlink_defaults() {
        let task = SymlinkTask::new("/srv/current", "/srv/releases/42", "deploy", "www")
            .into_task(&ctx())
            .unwrap();
        assert_eq!(task.name(), "Create '/srv/current' symlink to /srv/releases/42");
        assert_eq!(task.escalation(), &Escalation::as_user("deploy"));
        let detail = task.detail();
        assert_eq!(detail.get("force").and_then(Value::as_bool), Some(false));
        assert_eq!(detail.get("mode").and_then(Value::as_i64), Some(0o644));
        assert_eq!(detail.get("state").and_then(Value::as_str), Some("link"));
        assert_eq!(detail.get("group").and_then(Value::as_str), Some("www"));
    }

    #[test]
    fn test_symlink_force_and_become() {
        let task = SymlinkTask::new("/srv/current", "/srv/releases/43", "deploy", "www")
            .force(true)
            .become_user("root")
            .mode("0777")
            .into_task(&ctx())
            .unwrap();
        assert_eq!(
            task.detail().get("force").and_then(Value::as_bool),
            Some(true)
        );
        assert_eq!(
            task.detail().get("mode").and_then(Value::as_str),
            Some("0777")
        );
        assert_eq!(task.escalation(), &Escalation::as_user("root"));
    }
}
