//! Declarative child-process spawning.
//!
//! A [`ChildSpec`] records where the child's standard input and output
//! should come from before anything is forked. [`ChildSpec::prepare`] turns
//! every path and argument into a C string, and builds the null-terminated
//! `argv` array, so the forked child runs no Rust code that allocates or
//! locks. It only calls `close`, `open`, `dup2`, `execvp` and `_exit`.

use std::ffi::{c_char, CString};
use std::fs::File;
use std::io::Write;
use std::mem::ManuallyDrop;
use std::os::fd::{FromRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{self, ForkResult, Pid};
use tracing::debug;

use crate::types::{ExecuteResult, ShellError, SHELL_NAME};

// The child cannot format strings, so these carry the shell name literally.
const STDIN_DUP_FAILED: &str = "tinysh: cannot redirect standard input: ";
const STDOUT_DUP_FAILED: &str = "tinysh: cannot redirect standard output: ";

/// Where one standard stream of the child is bound.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoint {
    /// Keep the descriptor inherited from the interpreter.
    #[default]
    Inherit,
    /// Opened by the child itself; failures are reported from the child.
    File(PathBuf),
    /// An already open descriptor, typically one end of a pipe.
    Fd(RawFd),
}

/// Output files are created with `rw-r--r--`.
pub fn output_file_mode() -> Mode {
    Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH
}

#[derive(Debug, Clone, Default)]
pub struct ChildSpec {
    args: Vec<String>,
    stdin: Endpoint,
    stdout: Endpoint,
    close: Vec<RawFd>,
}

impl ChildSpec {
    pub fn new(args: &[String]) -> Self {
        Self {
            args: args.to_vec(),
            ..Self::default()
        }
    }

    pub fn stdin(mut self, endpoint: Endpoint) -> Self {
        self.stdin = endpoint;
        self
    }

    pub fn stdout(mut self, endpoint: Endpoint) -> Self {
        self.stdout = endpoint;
        self
    }

    /// Descriptor the child closes before wiring its streams.
    pub fn close_in_child(mut self, fd: RawFd) -> Self {
        self.close.push(fd);
        self
    }

    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }

    /// Converts everything the child needs ahead of the fork.
    pub fn prepare(&self) -> ExecuteResult<PreparedChild> {
        PreparedChild::new(self)
    }

    pub fn spawn(&self) -> ExecuteResult<Pid> {
        self.prepare()?.spawn()
    }
}

enum Wire {
    Inherit,
    File { path: CString, prefix: String },
    Fd(RawFd),
}

impl Wire {
    fn new(endpoint: &Endpoint, what: &str) -> ExecuteResult<Self> {
        Ok(match endpoint {
            Endpoint::Inherit => Wire::Inherit,
            Endpoint::Fd(fd) => Wire::Fd(*fd),
            Endpoint::File(path) => Wire::File {
                path: c_string(path.as_os_str().as_bytes())?,
                prefix: format!("{SHELL_NAME}: cannot open {what} file `{}`: ", path.display()),
            },
        })
    }

    /// Binds `target` to this wire and closes the descriptor it came from.
    fn attach(&self, target: RawFd, flags: OFlag, dup_prefix: &'static str) -> Result<(), (&str, Errno)> {
        let fd = match self {
            Wire::Inherit => return Ok(()),
            Wire::Fd(fd) => *fd,
            Wire::File { path, prefix } => {
                fcntl::open(path.as_c_str(), flags, output_file_mode()).map_err(|errno| (prefix.as_str(), errno))?
            }
        };
        // open() may hand back `target` itself when it was closed.
        if fd != target {
            unistd::dup2(fd, target).map_err(|errno| (dup_prefix, errno))?;
            let _ = unistd::close(fd);
        }
        Ok(())
    }
}

/// A [`ChildSpec`] ready to fork.
pub struct PreparedChild {
    program: String,
    // `argv_ptrs` points into these buffers; they must outlive it.
    argv: Vec<CString>,
    argv_ptrs: Vec<*const c_char>,
    stdin: Wire,
    stdout: Wire,
    close: Vec<RawFd>,
    exec_prefix: String,
    not_found: String,
}

impl PreparedChild {
    fn new(spec: &ChildSpec) -> ExecuteResult<Self> {
        let argv = spec
            .args
            .iter()
            .map(|arg| c_string(arg.as_bytes()))
            .collect::<ExecuteResult<Vec<_>>>()?;
        let argv_ptrs = argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();

        let program = spec.program();
        let not_found = if program.is_empty() {
            format!("{SHELL_NAME}: missing command\n")
        } else {
            format!("{SHELL_NAME}: {program}: command not found\n")
        };

        Ok(Self {
            program: program.to_string(),
            argv,
            argv_ptrs,
            stdin: Wire::new(&spec.stdin, "input")?,
            stdout: Wire::new(&spec.stdout, "output")?,
            close: spec.close.clone(),
            exec_prefix: format!("{SHELL_NAME}: {program}: "),
            not_found,
        })
    }

    /// Forks and execs the child, returning its pid.
    ///
    /// Only a failed fork comes back as an error. Anything that goes wrong
    /// after the fork is printed by the child, which exits with status 1.
    pub fn spawn(&self) -> ExecuteResult<Pid> {
        // SAFETY: the child branch only runs `exec`, which performs raw
        // system calls on data prepared before the fork.
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Parent { child }) => {
                debug!(pid = %child, program = %self.program, "spawned child");
                Ok(child)
            }
            Ok(ForkResult::Child) => self.exec(),
            Err(source) => Err(ShellError::Fork {
                program: self.program.clone(),
                source,
            }),
        }
    }

    /// Runs in the forked child. Never returns.
    fn exec(&self) -> ! {
        for fd in &self.close {
            let _ = unistd::close(*fd);
        }

        if let Err((prefix, errno)) = self.stdin.attach(libc::STDIN_FILENO, OFlag::O_RDONLY, STDIN_DUP_FAILED) {
            die(&[prefix, errno.desc(), "\n"]);
        }

        let create = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC;
        if let Err((prefix, errno)) = self.stdout.attach(libc::STDOUT_FILENO, create, STDOUT_DUP_FAILED) {
            die(&[prefix, errno.desc(), "\n"]);
        }

        let Some(program) = self.argv.first() else {
            die(&[self.not_found.as_str()]);
        };
        // SAFETY: `argv_ptrs` is null-terminated and points into `self.argv`.
        unsafe { libc::execvp(program.as_ptr(), self.argv_ptrs.as_ptr()) };
        match Errno::last() {
            Errno::ENOENT => die(&[self.not_found.as_str()]),
            errno => die(&[self.exec_prefix.as_str(), errno.desc(), "\n"]),
        }
    }
}

fn c_string(bytes: &[u8]) -> ExecuteResult<CString> {
    CString::new(bytes).map_err(|_| ShellError::NulByte(String::from_utf8_lossy(bytes).into_owned()))
}

/// Writes a diagnostic straight to fd 2 and terminates the child.
fn die(parts: &[&str]) -> ! {
    // SAFETY: fd 2 is never closed here; ManuallyDrop keeps File from closing it.
    let mut stderr = ManuallyDrop::new(unsafe { File::from_raw_fd(libc::STDERR_FILENO) });
    for part in parts {
        let _ = stderr.write_all(part.as_bytes());
    }
    // SAFETY: _exit skips atexit handlers and stdio flushing inherited from the parent.
    unsafe { libc::_exit(1) }
}
