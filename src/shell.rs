use tracing::{debug, error};

use crate::ast::Line;
use crate::config::Config;
use crate::executor::Executor;
use crate::input::LineSource;
use crate::parser::parse;
use crate::tokenizer::{tokenize, truncate_line};
use crate::types::SHELL_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell {
    config: Config,
    executor: Executor,
}

impl Shell {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            executor: Executor::new(),
        }
    }

    /// Reads and runs lines until `exit` or end of input.
    pub fn run(&mut self, source: &mut dyn LineSource) {
        loop {
            self.executor.reap_background();

            let line = match source.read_line(&self.config.prompt) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    error!(%err, "failed to read command line");
                    break;
                }
            };

            if self.handle_line(&line) == Flow::Exit {
                break;
            }
        }
        debug!(background = self.executor.background_jobs().len(), "leaving read loop");
    }

    /// Runs one line. Every failure is reported here; none ends the loop.
    pub fn handle_line(&mut self, line: &str) -> Flow {
        let line = truncate_line(line, self.config.max_line_len);
        let tokens = tokenize(line, self.config.max_args);

        match parse(&tokens) {
            Ok(Line::Empty) => Flow::Continue,
            Ok(Line::Exit) => Flow::Exit,
            Ok(Line::Command(plan)) => {
                if let Err(err) = self.executor.execute(&plan) {
                    eprintln!("{SHELL_NAME}: {err}");
                }
                Flow::Continue
            }
            Err(err) => {
                eprintln!("{SHELL_NAME}: {err}");
                Flow::Continue
            }
        }
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }
}
