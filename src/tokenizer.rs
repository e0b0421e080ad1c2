use tracing::debug;

const DELIMITERS: [char; 3] = [' ', '\t', '\n'];

/// Splits a line into maximal runs of non-delimiter characters.
///
/// There is no quoting or escaping: `"a b"` yields two tokens. Anything past
/// `max_tokens` is dropped.
pub fn tokenize(line: &str, max_tokens: usize) -> Vec<String> {
    let mut tokens = line.split(DELIMITERS).filter(|token| !token.is_empty());
    let kept: Vec<String> = tokens.by_ref().take(max_tokens).map(String::from).collect();

    let dropped = tokens.count();
    if dropped > 0 {
        debug!(dropped, max_tokens, "dropping tokens past the argument limit");
    }
    kept
}

/// Cuts `line` down to at most `max_len` bytes without splitting a character.
pub fn truncate_line(line: &str, max_len: usize) -> &str {
    if line.len() <= max_len {
        return line;
    }
    let mut end = max_len;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    debug!(len = line.len(), max_len, "truncating over-long command line");
    &line[..end]
}
