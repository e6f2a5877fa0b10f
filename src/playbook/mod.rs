//! Playbook tree and execution handoff
//!
//! A [`Play`] is the root [`Block`] of a playbook. Blocks hold an ordered list
//! of task descriptors and nested blocks; order of appends is execution order.
//! Nothing touches disk or starts a process until [`Play::run`].

pub mod block;
pub mod engine;
pub mod play;
pub mod task;
pub mod value;

pub use block::{Block, BlockHandle, BuildContext, Operation};
pub use engine::{absolute_path, Engine};
pub use play::{Play, RunOptions};
pub use task::{Capability, Escalation, TaskDescriptor, RESERVED_KEYS};
pub use value::{Fields, Value};
