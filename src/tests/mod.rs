use std::sync::{mpsc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::ast::{CommandPlan, Line};
use crate::executor::{Execution, Executor};
use crate::parser::parse;
use crate::tokenizer::tokenize;
use crate::types::ExecuteResult;

mod shell_tests;

static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that fork, so a pipe opened by one test is never
/// inherited by another test's child and holds its reader open.
pub(crate) fn serial() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn plan(line: &str) -> CommandPlan {
    match parse(&tokenize(line, 127)).unwrap() {
        Line::Command(plan) => plan,
        other => panic!("expected a command for {line:?}, got {other:?}"),
    }
}

pub(crate) fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Runs `line` on a fresh executor, failing the test instead of hanging if
/// the parent never gets its children back.
pub(crate) fn execute_within(line: &str, limit: Duration) -> ExecuteResult<Execution> {
    let plan = plan(line);
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(Executor::new().execute(&plan));
    });
    rx.recv_timeout(limit)
        .unwrap_or_else(|_| panic!("`{line}` did not finish within {limit:?}"))
}

/// Number of descriptors currently open in this process.
pub(crate) fn open_fds() -> usize {
    std::fs::read_dir("/proc/self/fd").unwrap().count()
}
