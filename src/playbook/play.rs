//! Plays: the root block of a playbook and its execution
//!
//! Running a play writes the playbook (to a caller path or a temporary
//! directory) and hands it to the [`Engine`]:
//!
//! ```no_run
//! use playbuild::{Play, RunOptions};
//!
//! let mut play = Play::new("deploy.yml", "/srv/deploy")?;
//! play.apt_present(["nginx"])?;
//! play.copy_file("files/nginx.conf", "/etc/nginx/nginx.conf")?;
//!
//! let web = play.block("web")?;
//! web.command("Check config", ["nginx", "-t"])?;
//!
//! play.run(RunOptions::new("webservers").verbosity(1))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::block::{Block, BuildContext};
use super::engine::{absolute_path, display_relative, Engine};
use super::value::Value;
use crate::config::EngineConfig;
use crate::error::BuildError;
use anyhow::{Context, Result};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tracing::info;

/// How to run a play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Host group the play targets
    pub hosts: String,
    /// Keep the playbook at this path instead of a temporary directory;
    /// relative paths resolve against the build root
    pub save_as: Option<PathBuf>,
    /// Number of verbose flags passed to the runner
    pub verbosity: u8,
}

impl RunOptions {
    pub fn new(hosts: impl Into<String>) -> Self {
        Self {
            hosts: hosts.into(),
            save_as: None,
            verbosity: 0,
        }
    }

    pub fn save_as(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_as = Some(path.into());
        self
    }

    pub fn verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }
}

/// Root block of a playbook, named after its playbook file
#[derive(Debug, Clone, PartialEq)]
pub struct Play {
    block: Block,
    engine: Engine,
}

impl Play {
    /// Create a play with the default engine settings
    ///
    /// `name` must be a bare filename ending in `.yml`.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Result<Self, BuildError> {
        Self::with_config(name, root, &EngineConfig::default())
    }

    /// Create a play using engine settings and escalation policy from `config`
    pub fn with_config(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        config: &EngineConfig,
    ) -> Result<Self, BuildError> {
        let name = name.into();
        validate_name(&name)?;

        let context = BuildContext::new(root).with_command_escalation(config.command_escalation);
        Ok(Self {
            block: Block::with_context(name, context)?,
            engine: Engine::from_config(config),
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The full playbook as a document value
    ///
    /// Fails with [`BuildError::EmptyPlay`] when no top-level task was added.
    pub fn document(&self, hosts: &str) -> Result<Value, BuildError> {
        if self.block.is_empty() {
            return Err(BuildError::EmptyPlay {
                name: self.block.name().to_string(),
            });
        }
        Ok(Value::Sequence(vec![Value::mapping([
            ("hosts", Value::from(hosts)),
            ("tasks", Value::Sequence(self.block.tasks().collect())),
        ])]))
    }

    /// Render the playbook as YAML
    pub fn render(&self, hosts: &str) -> Result<String> {
        let document = self.document(hosts)?;
        serde_yaml::to_string(&document).context("Failed to serialize playbook")
    }

    /// Write the playbook to `path` without running it
    pub fn save(&self, hosts: &str, path: &Path) -> Result<()> {
        let contents = self.render(hosts)?;
        info!(
            "Generating playbook {}",
            display_relative(path, self.block.root())
        );
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write playbook {}", path.display()))
    }

    /// Write the playbook and run it
    ///
    /// Without `save_as` the playbook lives in a temporary directory that is
    /// removed afterwards whether or not the runner succeeded. A relative
    /// `save_as` is placed under the build root, the directory the runner
    /// starts in. An empty play fails before anything is written.
    pub fn run(self, options: RunOptions) -> Result<()> {
        self.document(&options.hosts)?;

        match &options.save_as {
            Some(path) => {
                let path = absolute_path(&self.block.root().join(path))?;
                self.save_and_execute(&options, &path)
            }
            None => {
                let tmpdir = tempfile::Builder::new()
                    .prefix("playbuild-")
                    .tempdir()
                    .context("Failed to create temporary playbook directory")?;
                let path = absolute_path(&tmpdir.path().join(self.block.name()))?;

                let outcome = self.save_and_execute(&options, &path);
                let cleanup = tmpdir
                    .close()
                    .context("Failed to remove temporary playbook directory");
                outcome.and(cleanup)
            }
        }
    }

    fn save_and_execute(&self, options: &RunOptions, path: &Path) -> Result<()> {
        self.save(&options.hosts, path)?;
        self.engine
            .run(path, self.block.root(), options.verbosity)
            .with_context(|| format!("Play {} failed", self.block.name()))
    }
}

impl Deref for Play {
    type Target = Block;

    fn deref(&self) -> &Block {
        &self.block
    }
}

impl DerefMut for Play {
    fn deref_mut(&mut self) -> &mut Block {
        &mut self.block
    }
}

fn validate_name(name: &str) -> Result<(), BuildError> {
    if name.is_empty() {
        return Err(BuildError::EmptyName);
    }
    if name.contains(['/', '\\']) || !name.ends_with(".yml") || name == ".yml" {
        return Err(BuildError::InvalidPlayName {
            name: name.to_string(),
        });
    }
    Ok(())
}
