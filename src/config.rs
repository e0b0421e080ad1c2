use clap::Parser;

pub const DEFAULT_PROMPT: &str = "shell~ ";
pub const DEFAULT_MAX_LINE_LEN: usize = 512;
pub const DEFAULT_MAX_ARGS: usize = 127;
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, Parser)]
#[command(name = "tinysh", version, about = "A small line-oriented command interpreter")]
pub struct Config {
    /// Prompt printed before each line is read
    #[arg(long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// Longest command line accepted, in bytes; the rest is discarded
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LEN)]
    pub max_line_len: usize,

    /// Most arguments kept from one line; extra tokens are dropped
    #[arg(long, default_value_t = DEFAULT_MAX_ARGS)]
    pub max_args: usize,

    /// Read plain lines from stdin even when it is a terminal
    #[arg(long)]
    pub no_editor: bool,

    /// Log filter, in `tracing_subscriber::EnvFilter` syntax
    #[arg(long, env = "TINYSH_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_args: DEFAULT_MAX_ARGS,
            no_editor: false,
            log: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
