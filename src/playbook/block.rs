//! Task blocks
//!
//! A block owns its operations outright: task descriptors and child blocks.
//! Children are addressed through a [`BlockHandle`], the child's position in
//! its parent's append-only operation list, so no caller ever holds a live
//! reference into the tree across appends to the parent.

use super::task::TaskDescriptor;
use super::value::Value;
use crate::error::BuildError;
use crate::tasks::{
    AptTask, CommandEscalation, CommandTask, CopyTask, DirectoryTask, GitTask, GroupTask, IntoTask,
    Mode, OtherTask, SymlinkTask, UnlinkTask, UserTask,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Settings shared read-only by every block in a tree
#[derive(Debug, Clone, PartialEq)]
pub struct BuildContext {
    root: PathBuf,
    command_escalation: CommandEscalation,
}

impl BuildContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            command_escalation: CommandEscalation::default(),
        }
    }

    pub fn with_command_escalation(mut self, policy: CommandEscalation) -> Self {
        self.command_escalation = policy;
        self
    }

    /// Directory relative source paths are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn command_escalation(&self) -> CommandEscalation {
        self.command_escalation
    }

    /// Resolve a local path against the root; absolute paths are unchanged
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

/// One entry in a block
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Task(TaskDescriptor),
    Block(Block),
}

/// Stable reference to a nested block within its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHandle(usize);

/// Ordered, named container of playbook tasks
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    name: String,
    context: Arc<BuildContext>,
    operations: Vec<Operation>,
}

impl Block {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Result<Self, BuildError> {
        Self::with_context(name, BuildContext::new(root))
    }

    pub fn with_context(
        name: impl Into<String>,
        context: BuildContext,
    ) -> Result<Self, BuildError> {
        Self::named(name.into(), Arc::new(context))
    }

    fn named(name: String, context: Arc<BuildContext>) -> Result<Self, BuildError> {
        if name.is_empty() {
            return Err(BuildError::EmptyName);
        }
        Ok(Self {
            name,
            context,
            operations: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        self.context.root()
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of direct operations, not counting descendants
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Validate and append a task
    pub fn add<T: IntoTask>(&mut self, task: T) -> Result<(), BuildError> {
        let task = task.into_task(&self.context)?;
        debug!("Block {}: added task {:?}", self.name, task.name());
        self.operations.push(Operation::Task(task));
        Ok(())
    }

    /// Install packages with apt
    pub fn apt_present<I, S>(&mut self, packages: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(AptTask::new(packages))
    }

    /// Ensure a unix group exists
    pub fn unix_group(&mut self, name: impl Into<String>) -> Result<(), BuildError> {
        self.add(GroupTask::new(name))
    }

    /// Ensure a unix user exists with the given primary group
    pub fn unix_user(
        &mut self,
        name: impl Into<String>,
        group: impl Into<String>,
    ) -> Result<(), BuildError> {
        self.add(UserTask::new(name, group))
    }

    /// Ensure a root-owned directory exists
    pub fn mkdir(
        &mut self,
        path: impl Into<String>,
        mode: impl Into<Mode>,
    ) -> Result<(), BuildError> {
        self.add(DirectoryTask::new(path, mode))
    }

    /// Remove a path as root
    pub fn unlink(&mut self, path: impl Into<String>) -> Result<(), BuildError> {
        self.add(UnlinkTask::new(path))
    }

    /// Create a symlink at `path` pointing to `src`
    pub fn symlink(
        &mut self,
        path: impl Into<String>,
        src: impl Into<String>,
        owner: impl Into<String>,
        group: impl Into<String>,
    ) -> Result<(), BuildError> {
        self.add(SymlinkTask::new(path, src, owner, group))
    }

    /// Clone or update a git checkout owned by `owner`
    pub fn git_clone(
        &mut self,
        url: impl Into<String>,
        dest: impl Into<String>,
        owner: impl Into<String>,
        version: impl Into<String>,
        update: bool,
    ) -> Result<(), BuildError> {
        self.add(GitTask::new(url, dest, owner, version, update))
    }

    /// Run a command given as an argument vector
    pub fn command<I, S>(&mut self, title: impl Into<String>, argv: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(CommandTask::new(title, argv))
    }

    /// Upload a local file; relative paths resolve against the root
    pub fn copy_file(
        &mut self,
        src: impl Into<PathBuf>,
        dest: impl Into<String>,
    ) -> Result<(), BuildError> {
        self.add(CopyTask::new(dest).src(src))
    }

    /// Write inline content to a file
    pub fn copy_content(
        &mut self,
        content: impl Into<String>,
        dest: impl Into<String>,
    ) -> Result<(), BuildError> {
        self.add(CopyTask::new(dest).content(content))
    }

    /// Invoke any module with escalation to `become_user`
    pub fn other(
        &mut self,
        title: impl Into<String>,
        become_user: impl Into<String>,
        module: &str,
        detail: impl Into<Value>,
    ) -> Result<(), BuildError> {
        self.add(OtherTask::new(title, become_user, module, detail))
    }

    /// Append a nested block and return a handle to it
    pub fn open_block(&mut self, name: impl Into<String>) -> Result<BlockHandle, BuildError> {
        let child = Self::named(name.into(), Arc::clone(&self.context))?;
        debug!("Block {}: opened nested block {:?}", self.name, child.name);
        self.operations.push(Operation::Block(child));
        Ok(BlockHandle(self.operations.len() - 1))
    }

    /// Resolve a handle returned by [`Block::open_block`] on this block
    pub fn block_mut(&mut self, handle: BlockHandle) -> Option<&mut Block> {
        match self.operations.get_mut(handle.0) {
            Some(Operation::Block(child)) => Some(child),
            _ => None,
        }
    }

    /// Append a nested block and start building it
    pub fn block(&mut self, name: impl Into<String>) -> Result<&mut Block, BuildError> {
        let name = name.into();
        let handle = self.open_block(name.clone())?;
        self.block_mut(handle).ok_or(BuildError::UnknownBlock { name })
    }

    /// Flatten the block into document entries, in append order
    ///
    /// Tasks become their mapping; nested blocks become
    /// `{name: <block name>, block: [...]}`.
    pub fn tasks(&self) -> impl Iterator<Item = Value> + '_ {
        self.operations.iter().map(|operation| match operation {
            Operation::Task(task) => task.to_value(),
            Operation::Block(child) => Value::mapping([
                ("name", Value::from(&child.name)),
                ("block", Value::Sequence(child.tasks().collect())),
            ]),
        })
    }
}
