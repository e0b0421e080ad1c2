use std::path::PathBuf;

use tracing::trace;

use crate::ast::{CommandPlan, ControlOperator, Line};
use crate::types::ParseError;

const EXIT: &str = "exit";
const BACKGROUND: &str = "&";

/// Classifies a token list into a [`Line`].
///
/// Only the first control operator on the line is recognized. Whatever
/// follows it, apart from the single file name a redirection consumes, is
/// passed to the program as plain arguments.
pub fn parse(tokens: &[String]) -> Result<Line, ParseError> {
    let Some(first) = tokens.first() else {
        return Ok(Line::Empty);
    };
    if first == EXIT {
        return Ok(Line::Exit);
    }

    let mut tokens = tokens.to_vec();
    let background = tokens.last().is_some_and(|last| last == BACKGROUND);
    if background {
        tokens.pop();
    }

    let operator = tokens
        .iter()
        .enumerate()
        .find_map(|(i, token)| ControlOperator::from_token(token).map(|op| (i, op)));

    let plan = match operator {
        None => {
            if tokens.is_empty() {
                return Ok(Line::Empty);
            }
            CommandPlan::Simple { args: tokens, background }
        }
        Some((i, ControlOperator::Pipe)) => {
            let right = tokens.split_off(i + 1);
            tokens.truncate(i);
            CommandPlan::Pipeline {
                left: tokens,
                right,
                background,
            }
        }
        Some((i, op)) => {
            if i + 1 >= tokens.len() {
                return Err(ParseError::MissingRedirectTarget(op));
            }
            let target = PathBuf::from(tokens.remove(i + 1));
            tokens.remove(i);
            if tokens.is_empty() {
                return Ok(Line::Empty);
            }
            let (input, output) = match op {
                ControlOperator::RedirectIn => (Some(target), None),
                _ => (None, Some(target)),
            };
            CommandPlan::Redirected {
                args: tokens,
                input,
                output,
                background,
            }
        }
    };

    trace!(?plan, "classified command line");
    Ok(Line::Command(plan))
}
