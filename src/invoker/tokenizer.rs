// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Command-line tokenizer
//!
//! Splits a command string into an argument vector without going through a
//! shell. Quote handling is deliberately small: single quotes are literal,
//! double quotes group words, a backslash escapes the next character outside
//! single quotes. Anything needing real shell semantics (pipes, redirection)
//! takes the shell path in the invoker instead.

use crate::errors::{StagehandError, StagehandResult};

/// Split a command string into argv tokens
pub fn split(command: &str) -> StagehandResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = command.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => current.push(inner),
                        None => return Err(unterminated(command, '\'')),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            // Inside double quotes a backslash only escapes
                            // the quote and itself, like POSIX sh.
                            Some(esc @ ('"' | '\\')) => current.push(esc),
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => return Err(unterminated(command, '"')),
                        },
                        Some(inner) => current.push(inner),
                        None => return Err(unterminated(command, '"')),
                    }
                }
            }
            '\\' => {
                in_token = true;
                match chars.next() {
                    Some(esc) => current.push(esc),
                    None => return Err(unterminated(command, '\\')),
                }
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}

fn unterminated(command: &str, delimiter: char) -> StagehandError {
    StagehandError::InvalidInput {
        name: "command".to_string(),
        reason: format!("unterminated '{}' in: {}", delimiter, command),
    }
}
