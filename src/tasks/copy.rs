//! File upload task
//!
//! Uploads a local file or writes inline content to a path on the managed
//! host. Exactly one of `src` or `content` must be given. A relative `src` is
//! resolved against the build root; an absolute one is used as is. Existing
//! destination files are always backed up.
//!
//! # Examples
//!
//! ```yaml
//! - name: Upload nginx.conf to /etc/nginx/nginx.conf
//!   become: true
//!   become_user: root
//!   copy:
//!     backup: true
//!     dest: /etc/nginx/nginx.conf
//!     mode: 420
//!     owner: www-data
//!     src: /srv/deploy/files/nginx.conf
//! ```

use super::{require, IntoTask, Mode};
use crate::error::BuildError;
use crate::playbook::{BuildContext, Capability, Escalation, Fields, TaskDescriptor, Value};
use std::path::PathBuf;

/// File copy task
#[derive(Debug, Clone, Default)]
pub struct CopyTask {
    /// Task title; derived from `src` or `dest` when not given
    pub title: Option<String>,
    /// Local source file
    pub src: Option<PathBuf>,
    /// Inline file content
    pub content: Option<String>,
    /// Destination path on the managed host
    pub dest: String,
    /// Write as root even without an owner
    pub root: bool,
    /// Owner of the destination file
    pub owner: Option<String>,
    /// Destination permissions
    pub mode: Option<Mode>,
}

impl CopyTask {
    pub fn new(dest: impl Into<String>) -> Self {
        Self {
            dest: dest.into(),
            ..Default::default()
        }
    }

    pub fn src(mut self, src: impl Into<PathBuf>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn root(mut self, root: bool) -> Self {
        self.root = root;
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn mode(mut self, mode: impl Into<Mode>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}

impl IntoTask for CopyTask {
    fn into_task(self, ctx: &BuildContext) -> Result<TaskDescriptor, BuildError> {
        require(&self.dest, "copy", "dest")?;

        let mut detail = Fields::new();
        detail.insert("dest".to_string(), Value::from(&self.dest));
        detail.insert("backup".to_string(), Value::Bool(true));

        let title = match (&self.src, self.content) {
            (Some(_), Some(_)) => {
                return Err(BuildError::SourceAndContent { dest: self.dest });
            }
            (None, None) => {
                return Err(BuildError::NoSourceOrContent { dest: self.dest });
            }
            (Some(src), None) => {
                let resolved = ctx.resolve(src);
                detail.insert(
                    "src".to_string(),
                    Value::from(resolved.to_string_lossy().into_owned()),
                );
                let basename = src
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| src.display().to_string());
                format!("Upload {} to {}", basename, self.dest)
            }
            (None, Some(content)) => {
                detail.insert("content".to_string(), Value::from(content));
                format!("Create {}", self.dest)
            }
        };
        let title = self.title.unwrap_or(title);

        if let Some(mode) = self.mode {
            detail.insert("mode".to_string(), Value::from(mode));
        }

        let escalation = if self.root || self.owner.is_some() {
            Escalation::as_user("root")
        } else {
            Escalation::none()
        };

        if let Some(owner) = self.owner {
            require(&owner, "copy", "owner")?;
            detail.insert("owner".to_string(), Value::from(owner));
        }

        Ok(
            TaskDescriptor::new(title, Capability::Copy, Value::Mapping(detail))
                .with_escalation(escalation),
        )
    }
}
