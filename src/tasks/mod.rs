//! Playbook task types
//!
//! Each module here shapes one kind of playbook task: it holds the caller's
//! inputs, applies defaults, validates, and produces a [`TaskDescriptor`].
//! Blocks accept anything implementing [`IntoTask`].
//!
//! Tasks are plain values until appended, so callers can keep and reuse them:
//!
//! ```
//! use playbuild::tasks::{AptTask, GroupTask};
//! use playbuild::Play;
//!
//! let mut play = Play::new("base.yml", "/srv/deploy")?;
//! play.add(AptTask::new(["nginx", "git"]).update_cache(true))?;
//! play.add(GroupTask::new("www").gid(33).system(true))?;
//! # Ok::<(), playbuild::BuildError>(())
//! ```

use crate::error::BuildError;
use crate::playbook::{BuildContext, TaskDescriptor};
use serde::{Deserialize, Serialize};

pub mod apt;
pub mod command;
pub mod copy;
pub mod directory;
pub mod file;
pub mod git;
pub mod group;
pub mod other;
pub mod user;

pub use apt::AptTask;
pub use command::{CommandEscalation, CommandTask};
pub use copy::CopyTask;
pub use directory::DirectoryTask;
pub use file::{SymlinkTask, UnlinkTask};
pub use git::GitTask;
pub use group::GroupTask;
pub use other::OtherTask;
pub use user::UserTask;

/// Conversion of caller inputs into a task descriptor
pub trait IntoTask {
    /// Validate inputs and shape the descriptor
    ///
    /// `ctx` carries the build root and builder-wide policy shared by the
    /// whole block tree.
    fn into_task(self, ctx: &BuildContext) -> Result<TaskDescriptor, BuildError>;
}

impl IntoTask for TaskDescriptor {
    fn into_task(self, _ctx: &BuildContext) -> Result<TaskDescriptor, BuildError> {
        Ok(self)
    }
}

/// Desired presence of a group or user account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// Ensure the account exists
    #[default]
    Present,
    /// Ensure the account does not exist
    Absent,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Present => "present",
            State::Absent => "absent",
        }
    }

    /// Verb used in task titles
    pub fn verb(&self) -> &'static str {
        match self {
            State::Present => "Create",
            State::Absent => "Remove",
        }
    }
}

/// File permission bits, numeric (`0o644`) or textual (`"0755"`, `"u+rw"`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Numeric(u32),
    Text(String),
}

impl From<u32> for Mode {
    fn from(bits: u32) -> Self {
        Mode::Numeric(bits)
    }
}

impl From<&str> for Mode {
    fn from(text: &str) -> Self {
        Mode::Text(text.to_string())
    }
}

impl From<String> for Mode {
    fn from(text: String) -> Self {
        Mode::Text(text)
    }
}

impl From<Mode> for crate::playbook::Value {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Numeric(bits) => bits.into(),
            Mode::Text(text) => text.into(),
        }
    }
}

/// Fail with [`BuildError::MissingField`] when `value` is empty
pub(crate) fn require(value: &str, task: &'static str, field: &'static str) -> Result<(), BuildError> {
    if value.is_empty() {
        return Err(BuildError::MissingField { task, field });
    }
    Ok(())
}
