//! Command execution task
//!
//! Commands are always an explicit argument vector (`command.argv`), never a
//! shell string, so nothing needs quoting.
//!
//! Whether a command without an explicit `become_user` escalates is a
//! builder-wide policy, see [`CommandEscalation`].
//!
//! # Examples
//!
//! ```yaml
//! - name: Run migrations
//!   become: true
//!   become_user: deploy
//!   command:
//!     argv:
//!     - ./manage.py
//!     - migrate
//!     chdir: /srv/app
//! ```

use super::{require, IntoTask};
use crate::error::BuildError;
use crate::playbook::{BuildContext, Capability, Escalation, Fields, TaskDescriptor, Value};
use serde::{Deserialize, Serialize};

/// Escalation policy for commands without an explicit identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandEscalation {
    /// Escalate only when `become_user` is given
    #[default]
    ExplicitOnly,
    /// Always emit `become: true`; `become_user` only when given
    Always,
}

/// Command execution task
#[derive(Debug, Clone)]
pub struct CommandTask {
    /// Task title
    pub title: String,
    /// Program and arguments
    pub argv: Vec<String>,
    /// Working directory on the managed host
    pub chdir: Option<String>,
    /// Identity to run as
    pub become_user: Option<String>,
}

impl CommandTask {
    pub fn new<I, S>(title: impl Into<String>, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            argv: argv.into_iter().map(Into::into).collect(),
            chdir: None,
            become_user: None,
        }
    }

    pub fn chdir(mut self, chdir: impl Into<String>) -> Self {
        self.chdir = Some(chdir.into());
        self
    }

    pub fn become_user(mut self, user: impl Into<String>) -> Self {
        self.become_user = Some(user.into());
        self
    }
}

impl IntoTask for CommandTask {
    fn into_task(self, ctx: &BuildContext) -> Result<TaskDescriptor, BuildError> {
        require(&self.title, "command", "title")?;
        match self.argv.first() {
            Some(program) => require(program, "command", "program")?,
            None => {
                return Err(BuildError::MissingField {
                    task: "command",
                    field: "argv",
                })
            }
        }

        let mut detail = Fields::new();
        detail.insert("argv".to_string(), Value::from(self.argv));
        if let Some(chdir) = self.chdir {
            detail.insert("chdir".to_string(), Value::from(chdir));
        }

        let escalation = match (self.become_user, ctx.command_escalation()) {
            (Some(user), _) => Escalation::as_user(user),
            (None, CommandEscalation::Always) => Escalation::default_user(),
            (None, CommandEscalation::ExplicitOnly) => Escalation::none(),
        };

        Ok(
            TaskDescriptor::new(self.title, Capability::Command, Value::Mapping(detail))
                .with_escalation(escalation),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit() -> BuildContext {
        BuildContext::new("/srv")
    }

    fn always() -> BuildContext {
        BuildContext::new("/srv").with_command_escalation(CommandEscalation::Always)
    }

    #[test]
    fn test_no_escalation_by_default() {
        let task = CommandTask::new("Show uptime", ["uptime"])
            .into_task(&explicit())
            .unwrap();
        assert_eq!(task.escalation(), &Escalation::none());
        assert_eq!(
            task.detail(),
            &Value::mapping([("argv", vec!["uptime"])])
        );
    }

    #[test]
    fn test_explicit_user_escalates() {
        let task = CommandTask::new("Run migrations", ["./manage.py", "migrate"])
            .chdir("/srv/app")
            .become_user("deploy")
            .into_task(&explicit())
            .unwrap();
        assert_eq!(task.escalation(), &Escalation::as_user("deploy"));
        assert_eq!(
            task.detail().get("chdir").and_then(Value::as_str),
            Some("/srv/app")
        );
    }

    #[test]
    fn test_always_policy() {
        let task = CommandTask::new("Reload", ["systemctl", "daemon-reload"])
            .into_task(&always())
            .unwrap();
        assert_eq!(task.escalation(), &Escalation::default_user());

        let task = CommandTask::new("Reload", ["systemctl", "daemon-reload"])
            .become_user("root")
            .into_task(&always())
            .unwrap();
        assert_eq!(task.escalation(), &Escalation::as_user("root"));
    }

    #[test]
    fn test_empty_argv_rejected() {
        let err = CommandTask::new("Nothing", Vec::<String>::new())
            .into_task(&explicit())
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingField {
                task: "command",
                field: "argv"
            }
        );
        assert!(CommandTask::new("Blank", [""]).into_task(&explicit()).is_err());
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        let policy: CommandEscalation = serde_yaml::from_str("always").unwrap();
        assert_eq!(policy, CommandEscalation::Always);
        let policy: CommandEscalation = serde_yaml::from_str("explicit_only").unwrap();
        assert_eq!(policy, CommandEscalation::ExplicitOnly);
    }
}
