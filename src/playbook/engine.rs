//! Handoff to the external playbook runner
//!
//! The runner is invoked as `<program> <extra args> <playbook> <verbose flag>*`
//! with the build root as working directory. Inventory and runner
//! configuration come from the caller's environment and are never set here.

use crate::config::EngineConfig;
use crate::error::EngineError;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// External playbook runner
#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    program: String,
    extra_args: Vec<String>,
    verbose_flag: String,
    required_env: Vec<String>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl Engine {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            program: config.program.clone(),
            extra_args: config.extra_args.clone(),
            verbose_flag: config.verbose_flag.clone(),
            required_env: config.required_env.clone(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the runner for `playbook`
    pub fn args(&self, playbook: &Path, verbosity: u8) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();
        args.push(playbook.as_os_str().to_owned());
        args.extend((0..verbosity).map(|_| OsString::from(&self.verbose_flag)));
        args
    }

    /// Build the runner invocation without starting it
    pub fn command(&self, playbook: &Path, workdir: &Path, verbosity: u8) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(playbook, verbosity))
            .current_dir(workdir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }

    /// Required environment variables that are not set
    pub fn missing_environment(&self) -> Vec<&str> {
        self.required_env
            .iter()
            .filter(|name| std::env::var_os(name.as_str()).is_none())
            .map(String::as_str)
            .collect()
    }

    /// Run the playbook and wait for the runner to exit
    ///
    /// A non-zero exit is returned as [`EngineError::Failed`]. There is no
    /// retry and no timeout.
    pub fn run(&self, playbook: &Path, workdir: &Path, verbosity: u8) -> Result<()> {
        for name in self.missing_environment() {
            warn!("{} is not set; {} may not find its inputs", name, self.program);
        }

        let args = self.args(playbook, verbosity);
        debug!("Command line: {}", command_line(&self.program, &args));
        info!(
            "Running {} {}",
            self.program,
            display_relative(playbook, workdir)
        );

        let status = self
            .command(playbook, workdir, verbosity)
            .status()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(EngineError::Failed {
                program: self.program.clone(),
                document: playbook.to_path_buf(),
                status,
            }
            .into());
        }

        Ok(())
    }
}

/// Anchor a relative path at the current working directory
///
/// The runner starts in the build root, so any path handed to it must not
/// depend on the caller's working directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(cwd.join(path))
}

/// Show `path` relative to `root` when it lives underneath it
pub(crate) fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn command_line(program: &str, args: &[OsString]) -> String {
    let words: Vec<String> = std::iter::once(program.to_string())
        .chain(args.iter().map(|arg| arg.to_string_lossy().into_owned()))
        .collect();
    shlex::try_join(words.iter().map(String::as_str)).unwrap_or_else(|_| words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn engine(program: &str, extra_args: &[&str]) -> Engine {
        Engine::from_config(&EngineConfig {
            program: program.to_string(),
            extra_args: extra_args.iter().map(|s| s.to_string()).collect(),
            required_env: Vec::new(),
            ..Default::default()
        })
    }

    #[test]
    fn test_args_repeat_verbose_flag() {
        let engine = Engine::default();
        let args = engine.args(Path::new("/tmp/site.yml"), 3);
        assert_eq!(
            args,
            vec!["/tmp/site.yml", "--verbose", "--verbose", "--verbose"]
        );
        assert_eq!(engine.args(Path::new("site.yml"), 0), vec!["site.yml"]);
    }

    #[test]
    fn test_extra_args_precede_playbook() {
        let engine = engine("ansible-playbook", &["--diff", "--check"]);
        assert_eq!(
            engine.args(Path::new("site.yml"), 1),
            vec!["--diff", "--check", "site.yml", "--verbose"]
        );
    }

    #[test]
    fn test_command_uses_workdir() {
        let engine = Engine::default();
        let cmd = engine.command(Path::new("site.yml"), Path::new("/srv/deploy"), 0);
        assert_eq!(cmd.get_program(), "ansible-playbook");
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/srv/deploy")));
    }

    #[test]
    fn test_missing_environment() {
        let engine = Engine::from_config(&EngineConfig {
            required_env: vec![
                "PATH".to_string(),
                "PLAYBUILD_TEST_SURELY_UNSET_VARIABLE".to_string(),
            ],
            ..Default::default()
        });
        assert_eq!(
            engine.missing_environment(),
            vec!["PLAYBUILD_TEST_SURELY_UNSET_VARIABLE"]
        );
    }

    #[test]
    fn test_display_relative() {
        let root = PathBuf::from("/srv/deploy");
        assert_eq!(
            display_relative(&root.join("out/site.yml"), &root),
            "out/site.yml"
        );
        assert_eq!(
            display_relative(Path::new("/tmp/x/site.yml"), &root),
            "/tmp/x/site.yml"
        );
    }

    #[test]
    fn test_absolute_path() {
        assert_eq!(
            absolute_path(Path::new("/srv/deploy/site.yml")).unwrap(),
            PathBuf::from("/srv/deploy/site.yml")
        );
        let anchored = absolute_path(Path::new("site.yml")).unwrap();
        assert!(anchored.is_absolute());
        assert_eq!(anchored, std::env::current_dir().unwrap().join("site.yml"));
    }

    #[test]
    fn test_command_line_quotes_arguments() {
        let args = vec![OsString::from("/tmp/my play.yml"), OsString::from("-v")];
        assert_eq!(
            command_line("ansible-playbook", &args),
            "ansible-playbook '/tmp/my play.yml' -v"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_success_and_failure() {
        let workdir = tempfile::tempdir().unwrap();
        let playbook = workdir.path().join("site.yml");

        assert!(engine("true", &[])
            .run(&playbook, workdir.path(), 2)
            .is_ok());

        let err = engine("false", &[])
            .run(&playbook, workdir.path(), 0)
            .unwrap_err();
        let engine_err = err.downcast_ref::<EngineError>().unwrap();
        assert_eq!(engine_err.exit_code(), Some(1));
    }

    #[test]
    fn test_run_missing_program() {
        let workdir = tempfile::tempdir().unwrap();
        let err = engine("playbuild-no-such-runner", &[])
            .run(Path::new("site.yml"), workdir.path(), 0)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::Spawn { .. })
        ));
    }
}
