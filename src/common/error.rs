//! Error taxonomy for the front-end.
//!
//! Every error is a synchronous failure that aborts the compile pass for
//! the current shader asset; there is no recovery or partial output.
//! Symbol conflicts are deliberately *not* errors: the tables resolve them
//! by replacement and record an advisory warning instead (see
//! `common::symbol_table`).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A balanced-pair scan met a non-whitespace character before its
    /// expected opening delimiter. Line and column are 0-based here and
    /// rendered 1-based for humans.
    UnexpectedCharacter { ch: char, line: usize, column: usize },
    /// A `#define` directive ended before a macro name was found.
    MissingMacroName,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UnexpectedCharacter { ch, line, column } => write!(
                f,
                "Unexpected character \"{}\" at line {}, column {}",
                ch,
                line + 1,
                column + 1
            ),
            CompileError::MissingMacroName => write!(f, "No defined variable"),
        }
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_character_message() {
        let err = CompileError::UnexpectedCharacter { ch: ';', line: 2, column: 7 };
        assert_eq!(err.to_string(), "Unexpected character \";\" at line 3, column 8");
    }

    #[test]
    fn test_missing_macro_name_message() {
        assert_eq!(CompileError::MissingMacroName.to_string(), "No defined variable");
    }
}
