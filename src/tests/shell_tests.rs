use std::fs;
use std::io::Cursor;

use tempfile::tempdir;

use crate::config::Config;
use crate::input::PlainSource;
use crate::shell::{Flow, Shell};

use super::serial;

#[test]
fn test_exit_stops_the_loop() {
    let _guard = serial();
    let dir = tempdir().unwrap();
    let before = dir.path().join("before.txt");
    let after = dir.path().join("after.txt");

    let script = format!(
        "echo one > {}\nexit\necho two > {}\n",
        before.display(),
        after.display()
    );
    let mut prompts = Vec::new();
    let mut source = PlainSource::new(Cursor::new(script), &mut prompts);
    Shell::new(Config::default()).run(&mut source);

    assert_eq!(fs::read_to_string(&before).unwrap(), "one\n");
    assert!(!after.exists());
    assert_eq!(String::from_utf8(prompts).unwrap(), "shell~ shell~ ");
}

#[test]
fn test_end_of_input_ends_the_loop() {
    let _guard = serial();
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.txt");

    let script = format!("\n   \necho last > {}", out.display());
    let mut prompts = Vec::new();
    let mut source = PlainSource::new(Cursor::new(script), &mut prompts);
    let config = Config {
        prompt: "> ".to_string(),
        ..Config::default()
    };
    Shell::new(config).run(&mut source);

    // The final line has no newline and still runs.
    assert_eq!(fs::read_to_string(&out).unwrap(), "last\n");
    // One prompt per line read, plus the one answered by EOF.
    assert_eq!(String::from_utf8(prompts).unwrap(), "> > > > ");
}

#[test]
fn test_errors_do_not_end_the_loop() {
    let _guard = serial();
    let mut shell = Shell::new(Config::default());

    assert_eq!(shell.handle_line(""), Flow::Continue);
    assert_eq!(shell.handle_line("cat <"), Flow::Continue);
    assert_eq!(shell.handle_line("definitely-not-a-real-program-tinysh"), Flow::Continue);
    assert_eq!(shell.handle_line("exit now"), Flow::Exit);
}

#[test]
fn test_exit_spawns_nothing() {
    let mut shell = Shell::new(Config::default());
    assert_eq!(shell.handle_line("exit &"), Flow::Exit);
    assert!(shell.executor().background_jobs().is_empty());
}

#[test]
fn test_line_limits_come_from_config() {
    let _guard = serial();
    let dir = tempdir().unwrap();
    let out = dir.path().join("limited.txt");
    let config = Config {
        max_args: 4,
        ..Config::default()
    };
    let mut shell = Shell::new(config);

    // Only `echo a > file` survives the argument limit.
    shell.handle_line(&format!("echo a > {} b c", out.display()));
    assert_eq!(fs::read_to_string(&out).unwrap(), "a\n");

    // Truncation can cut off the `&`, so this runs in the foreground.
    let config = Config {
        max_line_len: 5,
        ..Config::default()
    };
    let mut shell = Shell::new(config);
    shell.handle_line("true &");
    assert!(shell.executor().background_jobs().is_empty());
}
