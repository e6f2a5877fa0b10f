//! playbuild - typed builder for Ansible playbooks
//!
//! Playbooks are assembled through method calls on a [`Play`] that validate
//! inputs and apply defaults, then written out and handed to
//! `ansible-playbook` as a subprocess.

pub mod config;
pub mod error;
pub mod playbook;
pub mod tasks;

pub use config::EngineConfig;
pub use error::{BuildError, EngineError};
pub use playbook::{Block, BlockHandle, BuildContext, Engine, Play, RunOptions, Value};
