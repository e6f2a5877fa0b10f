//! Debian/Ubuntu package installation task
//!
//! Installs one or more packages through the `apt` module. Package management
//! always needs elevated rights, so the task always escalates.
//!
//! # Examples
//!
//! ```yaml
//! - name: Install nginx, git
//!   become: true
//!   apt:
//!     name:
//!     - nginx
//!     - git
//!     update_cache: true
//! ```

use super::{require, IntoTask};
use crate::error::BuildError;
use crate::playbook::{BuildContext, Capability, Escalation, Fields, TaskDescriptor, Value};

/// Package installation task
#[derive(Debug, Clone, Default)]
pub struct AptTask {
    /// Packages to install
    pub packages: Vec<String>,
    /// Task title; defaults to `Install <packages>`
    pub title: Option<String>,
    /// Refresh the package cache first. `false` is never emitted.
    pub update_cache: bool,
}

impl AptTask {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn update_cache(mut self, update_cache: bool) -> Self {
        self.update_cache = update_cache;
        self
    }
}

impl IntoTask for AptTask {
    fn into_task(self, _ctx: &BuildContext) -> Result<TaskDescriptor, BuildError> {
        if self.packages.is_empty() {
            return Err(BuildError::MissingField {
                task: "apt",
                field: "packages",
            });
        }
        for package in &self.packages {
            require(package, "apt", "package name")?;
        }

        let title = self
            .title
            .unwrap_or_else(|| format!("Install {}", self.packages.join(", ")));

        let mut detail = Fields::new();
        detail.insert("name".to_string(), Value::from(self.packages));
        if self.update_cache {
            detail.insert("update_cache".to_string(), Value::Bool(true));
        }

        Ok(
            TaskDescriptor::new(title, Capability::Apt, Value::Mapping(detail))
                .with_escalation(Escalation::default_user()),
        )
    }
}
