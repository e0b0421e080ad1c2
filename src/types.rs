use nix::errno::Errno;
use nix::unistd::Pid;
use thiserror::Error;

use crate::ast::ControlOperator;

/// Name used to prefix every diagnostic printed to the operator.
pub const SHELL_NAME: &str = "tinysh";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error: expected a file name after `{0}`")]
    MissingRedirectTarget(ControlOperator),
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("cannot create pipe: {0}")]
    Pipe(#[source] Errno),
    #[error("cannot create child process for `{program}`: {source}")]
    Fork {
        program: String,
        #[source]
        source: Errno,
    },
    #[error("cannot wait for process {pid}: {source}")]
    Wait {
        pid: Pid,
        #[source]
        source: Errno,
    },
    #[error("argument contains a NUL byte: {0:?}")]
    NulByte(String),
}

pub type ExecuteResult<T> = Result<T, ShellError>;
