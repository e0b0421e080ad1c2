use std::os::fd::{FromRawFd, OwnedFd};

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{self, Pid};
use tracing::{debug, trace};

use crate::ast::CommandPlan;
use crate::process::{ChildSpec, Endpoint};
use crate::types::{ExecuteResult, ShellError};

/// What happened to the processes a plan started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// Foreground run; one status per child, in spawn order.
    Waited(Vec<WaitStatus>),
    /// Background run; the child is left to the reaper.
    Detached(Pid),
}

#[derive(Debug, Default)]
pub struct Executor {
    background: Vec<Pid>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute(&mut self, plan: &CommandPlan) -> ExecuteResult<Execution> {
        trace!(?plan, "executing");

        match plan {
            CommandPlan::Simple { args, background } => self.run_single(ChildSpec::new(args), *background),
            CommandPlan::Redirected {
                args,
                input,
                output,
                background,
            } => {
                let mut spec = ChildSpec::new(args);
                if let Some(path) = input {
                    spec = spec.stdin(Endpoint::File(path.clone()));
                }
                if let Some(path) = output {
                    spec = spec.stdout(Endpoint::File(path.clone()));
                }
                self.run_single(spec, *background)
            }
            CommandPlan::Pipeline {
                left,
                right,
                background,
            } => {
                if *background {
                    debug!("`&` has no effect on a pipeline; waiting for both stages");
                }
                run_pipeline(left, right)
            }
        }
    }

    fn run_single(&mut self, spec: ChildSpec, background: bool) -> ExecuteResult<Execution> {
        let pid = spec.spawn()?;
        if background {
            debug!(%pid, "running in background");
            self.background.push(pid);
            return Ok(Execution::Detached(pid));
        }
        Ok(Execution::Waited(vec![wait_for(pid)?]))
    }

    /// Collects background children that have already exited.
    pub fn reap_background(&mut self) -> Vec<WaitStatus> {
        let mut finished = Vec::new();
        self.background.retain(|&pid| match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => true,
            Ok(status) => {
                debug!(%pid, ?status, "background child finished");
                finished.push(status);
                false
            }
            Err(errno) => {
                debug!(%pid, %errno, "dropping untrackable background child");
                false
            }
        });
        finished
    }

    pub fn background_jobs(&self) -> &[Pid] {
        &self.background
    }
}

fn run_pipeline(left: &[String], right: &[String]) -> ExecuteResult<Execution> {
    let (read_fd, write_fd) = unistd::pipe().map_err(ShellError::Pipe)?;
    // SAFETY: both descriptors were just returned by pipe() and nothing else owns them.
    let (read_end, write_end) = unsafe { (OwnedFd::from_raw_fd(read_fd), OwnedFd::from_raw_fd(write_fd)) };

    // Both stages are prepared before either forks, so a bad argument on the
    // right cannot leave the left stage running unwaited.
    let writer = ChildSpec::new(left)
        .close_in_child(read_fd)
        .stdout(Endpoint::Fd(write_fd))
        .prepare()?;
    let reader = ChildSpec::new(right)
        .close_in_child(write_fd)
        .stdin(Endpoint::Fd(read_fd))
        .prepare()?;

    let writer = writer.spawn()?;
    // A failed second fork leaves `writer` running on its own.
    let reader = reader.spawn()?;

    // The reader only sees EOF once no write end is left open here.
    drop(read_end);
    drop(write_end);

    let statuses = [writer, reader]
        .into_iter()
        .map(wait_for)
        .collect::<ExecuteResult<Vec<_>>>()?;
    Ok(Execution::Waited(statuses))
}

fn wait_for(pid: Pid) -> ExecuteResult<WaitStatus> {
    loop {
        match waitpid(pid, None) {
            Err(Errno::EINTR) => continue,
            Ok(status) => return Ok(status),
            Err(source) => return Err(ShellError::Wait { pid, source }),
        }
    }
}
