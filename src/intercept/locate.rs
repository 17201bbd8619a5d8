//! Exact token-position addressing into a registered file.
//!
//! Declared positions are physical 1-based (line, character) pairs; any
//! logical line remapping in the source text is never consulted. A
//! position is valid only when it is the first character of an
//! identifier token.

use std::fmt;

use crate::diagnostics::{LineCol, SourceFile};
use crate::tokens::Token;

/// Failure modes of position lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PositionError {
    /// Line or character was zero or negative.
    NonPositive,
    LineOutOfRange {
        line_count: usize,
        requested: i32,
    },
    CharacterOutOfRange {
        line_length: usize,
        requested: i32,
    },
    /// The position addresses a token that is not an identifier.
    NotANameToken {
        token: String,
    },
    /// The position falls inside an identifier or its leading trivia;
    /// the corrected coordinates point at the identifier's first
    /// character.
    NotTokenStart {
        identifier: String,
        line: usize,
        character: usize,
    },
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionError::NonPositive => {
                write!(f, "line and character must be positive, 1-based numbers")
            }
            PositionError::LineOutOfRange {
                line_count,
                requested,
            } => write!(
                f,
                "line {requested} is out of range; the file has {line_count} line{}",
                if *line_count == 1 { "" } else { "s" }
            ),
            PositionError::CharacterOutOfRange {
                line_length,
                requested,
            } => write!(
                f,
                "character {requested} is out of range; the line has {line_length} character{}",
                if *line_length == 1 { "" } else { "s" }
            ),
            PositionError::NotANameToken { token } => {
                write!(f, "position refers to token `{token}`, not a method name")
            }
            PositionError::NotTokenStart {
                identifier,
                line,
                character,
            } => write!(
                f,
                "position does not refer to the start of `{identifier}`; the name begins at line {line}, character {character}"
            ),
        }
    }
}

/// Find the token whose span starts exactly at the declared position.
///
/// # Errors
///
/// Returns a [`PositionError`] when the position is out of bounds, does
/// not address the start of a token, or addresses a non-name token.
pub fn locate<'a>(
    file: &'a SourceFile,
    line: i32,
    character: i32,
) -> Result<&'a Token, PositionError> {
    if line < 1 || character < 1 {
        return Err(PositionError::NonPositive);
    }
    let line_index = usize::try_from(line).unwrap_or(usize::MAX);
    let char_index = usize::try_from(character).unwrap_or(usize::MAX);
    if line_index > file.line_count() {
        return Err(PositionError::LineOutOfRange {
            line_count: file.line_count(),
            requested: line,
        });
    }
    let line_length = file.line_length(line_index).unwrap_or(0);
    if char_index > line_length {
        return Err(PositionError::CharacterOutOfRange {
            line_length,
            requested: character,
        });
    }
    let Some(offset) = file.offset_at(line_index, char_index) else {
        return Err(PositionError::CharacterOutOfRange {
            line_length,
            requested: character,
        });
    };
    locate_offset(file, offset)
}

/// Offset-addressed variant of [`locate`], used by checksum-based
/// locations that carry a byte offset instead of a line/character pair.
///
/// # Errors
///
/// Same contract as [`locate`], without the bounds checks a decoded
/// offset has already passed.
pub fn locate_offset(file: &SourceFile, offset: usize) -> Result<&Token, PositionError> {
    let next = file
        .tokens()
        .iter()
        .find(|token| !token.is_trivia() && token.span.end > offset);
    let Some(token) = next else {
        // Only trailing trivia lies past this offset.
        let text = file
            .tokens()
            .iter()
            .find(|token| token.span.start <= offset && offset < token.span.end)
            .map_or_else(|| "<end of file>".to_string(), |token| token.lexeme.clone());
        return Err(PositionError::NotANameToken { token: text });
    };

    if token.span.start == offset {
        if token.is_name() {
            return Ok(token);
        }
        return Err(PositionError::NotANameToken {
            token: token.lexeme.clone(),
        });
    }

    // The offset landed inside the token or in the trivia run before it.
    if token.is_name() {
        let start = file
            .line_col(token.span.start)
            .unwrap_or(LineCol { line: 1, column: 1 });
        return Err(PositionError::NotTokenStart {
            identifier: token.lexeme.clone(),
            line: start.line,
            character: start.column,
        });
    }
    Err(PositionError::NotANameToken {
        token: token.lexeme.clone(),
    })
}
