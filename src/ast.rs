use std::fmt;
use std::path::PathBuf;

/// What one input line asks for once it has been classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Blank line, or nothing left after stripping `&`.
    Empty,
    Exit,
    Command(CommandPlan),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPlan {
    Simple {
        args: Vec<String>,
        background: bool,
    },
    Redirected {
        args: Vec<String>,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        background: bool,
    },
    /// Either side may be empty; the stage then fails in its own child.
    Pipeline {
        left: Vec<String>,
        right: Vec<String>,
        background: bool,
    },
}

impl CommandPlan {
    pub fn background(&self) -> bool {
        match self {
            CommandPlan::Simple { background, .. }
            | CommandPlan::Redirected { background, .. }
            | CommandPlan::Pipeline { background, .. } => *background,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOperator {
    Pipe,        // |
    RedirectIn,  // <
    RedirectOut, // >
}

impl ControlOperator {
    /// Operators only count as standalone tokens. `|` is checked first.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "|" => Some(ControlOperator::Pipe),
            "<" => Some(ControlOperator::RedirectIn),
            ">" => Some(ControlOperator::RedirectOut),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ControlOperator::Pipe => "|",
            ControlOperator::RedirectIn => "<",
            ControlOperator::RedirectOut => ">",
        }
    }
}

impl fmt::Display for ControlOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
