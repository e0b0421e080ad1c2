pub mod ast;
pub mod config;
pub mod executor;
pub mod input;
pub mod parser;
pub mod process;
pub mod shell;
pub mod tokenizer;
pub mod types;

#[cfg(test)]
mod tests;
