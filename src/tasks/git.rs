//! Git checkout task
//!
//! Clones or updates a repository as its owning user.
//!
//! # Examples
//!
//! ```yaml
//! - name: Clone https://github.com/example/app.git to /srv/app
//!   become: true
//!   become_user: deploy
//!   git:
//!     dest: /srv/app
//!     repo: https://github.com/example/app.git
//!     update: true
//!     version: main
//! ```

use super::{require, IntoTask};
use crate::error::BuildError;
use crate::playbook::{BuildContext, Capability, Escalation, TaskDescriptor, Value};

/// Git repository checkout task
#[derive(Debug, Clone)]
pub struct GitTask {
    /// Repository URL
    pub url: String,
    /// Checkout directory
    pub dest: String,
    /// User that owns the checkout; the task escalates to this user
    pub owner: String,
    /// Branch, tag or commit to check out
    pub version: String,
    /// Whether to fetch new revisions from the origin
    pub update: bool,
}

impl GitTask {
    pub fn new(
        url: impl Into<String>,
        dest: impl Into<String>,
        owner: impl Into<String>,
        version: impl Into<String>,
        update: bool,
    ) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            owner: owner.into(),
            version: version.into(),
            update,
        }
    }
}

impl IntoTask for GitTask {
    fn into_task(self, _ctx: &BuildContext) -> Result<TaskDescriptor, BuildError> {
        require(&self.url, "git", "url")?;
        require(&self.dest, "git", "dest")?;
        require(&self.owner, "git", "owner")?;
        require(&self.version, "git", "version")?;

        let title = format!("Clone {} to {}", self.url, self.dest);
        let detail = Value::mapping([
            ("dest", Value::from(self.dest)),
            ("repo", Value::from(self.url)),
            ("version", Value::from(self.version)),
            ("update", Value::from(self.update)),
        ]);

        Ok(TaskDescriptor::new(title, Capability::Git, detail)
            .with_escalation(Escalation::as_user(self.owner)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalates_to_owner() {
        let task = GitTask::new(
            "https://github.com/example/app.git",
            "/srv/app",
            "deploy",
            "v1.2.0",
            false,
        )
        .into_task(&BuildContext::new("/srv"))
        .unwrap();

        assert_eq!(
            task.name(),
            "Clone https://github.com/example/app.git to /srv/app"
        );
        assert_eq!(task.escalation(), &Escalation::as_user("deploy"));
        assert_eq!(
            task.detail(),
            &Value::mapping([
                ("dest", Value::from("/srv/app")),
                ("repo", Value::from("https://github.com/example/app.git")),
                ("update", Value::from(false)),
                ("version", Value::from("v1.2.0")),
            ])
        );
    }

    #[test]
    fn test_missing_version_rejected() {
        let err = GitTask::new("u", "/d", "o", "", true)
            .into_task(&BuildContext::new("/srv"))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingField {
                task: "git",
                field: "version"
            }
        );
    }
}
