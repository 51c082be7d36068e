//! # Git Operations
//!
//! Thin wrappers around the system `git` binary for the handful of local
//! version-control operations the autoupdate workflow needs: a cleanliness
//! check, branch creation, committing, and pushing.
//!
//! Using the system git command means SSH keys, credential helpers, and
//! anything else configured in `~/.gitconfig` work without this tool knowing
//! about authentication at all. Calls block with no timeout; a hung remote
//! blocks the caller.

use std::path::PathBuf;
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Handle on a git checkout rooted at a fixed directory.
///
/// Every command runs with that directory as its working directory, so the
/// caller never depends on the ambient process cwd.
#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
}

impl Git {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Git { root: root.into() }
    }

    /// Whether the working tree has no unstaged changes (`git diff --quiet`).
    pub fn is_working_tree_clean(&self) -> Result<bool> {
        let output = self.run_raw(&["diff", "--quiet"])?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(command_error("diff", &output)),
        }
    }

    /// Create a new branch and switch to it (`git checkout -b`).
    pub fn create_and_checkout(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", "-b", branch])
    }

    /// Commit all tracked changes with the given message
    /// (`git commit --all --message`).
    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "--all", "--message", message])
    }

    /// Push a branch to a remote (`git push <remote> <branch>`).
    pub fn push_branch(&self, branch: &str, remote: &str) -> Result<()> {
        self.run(&["push", remote, branch])
    }

    fn run(&self, args: &[&str]) -> Result<()> {
        let output = self.run_raw(args)?;
        if !output.status.success() {
            return Err(command_error(args[0], &output));
        }
        Ok(())
    }

    fn run_raw(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::GitCommand {
                command: args[0].to_string(),
                stderr: e.to_string(),
            })
    }
}

fn command_error(command: &str, output: &Output) -> Error {
    Error::GitCommand {
        command: command.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

// Note: exercising these wrappers requires a real git checkout and, for
// pushes, a reachable remote; the orchestration tests inject a mock commit
// sink instead.
