//! Lexer (tokenizer) for the netlist format.

use crate::error::{OhmlabError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the netlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Component name, node name or parameter name
    Identifier,
    /// A number, possibly with an SI suffix (`10k`, `4.7u`, `-3`)
    Number,
    /// A directive (starts with '.')
    Directive,
    /// Equals sign '='
    Equals,
    /// Newline
    Newline,
    /// End of file
    Eof,
}

/// Lexer for tokenizing netlist input.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_blanks_and_comments();

        let line = self.line;
        let column = self.column;
        let token = |kind, text: String| Token {
            kind,
            text,
            line,
            column,
        };

        let ch = match self.chars.peek().copied() {
            Some(ch) => ch,
            None => return Ok(token(TokenKind::Eof, String::new())),
        };

        match ch {
            '\n' => {
                self.bump();
                Ok(token(TokenKind::Newline, "\n".to_string()))
            }
            '=' => {
                self.bump();
                Ok(token(TokenKind::Equals, "=".to_string()))
            }
            '.' => {
                self.bump();
                let word = self.read_word();
                if word.is_empty() {
                    return Err(OhmlabError::lexer(line, column, "empty directive"));
                }
                if word.starts_with(|c: char| c.is_ascii_digit()) {
                    // ".5" is a number, not a directive
                    return Ok(token(TokenKind::Number, format!(".{}", word)));
                }
                Ok(token(TokenKind::Directive, format!(".{}", word)))
            }
            _ if is_word_char(ch) => {
                let word = self.read_word();
                let kind = if parse_value(&word).is_some() {
                    TokenKind::Number
                } else if word.starts_with(|c: char| c.is_alphabetic() || c == '_') {
                    TokenKind::Identifier
                } else {
                    return Err(OhmlabError::lexer(
                        line,
                        column,
                        format!("malformed number '{}'", word),
                    ));
                };
                Ok(token(kind, word))
            }
            _ => Err(OhmlabError::lexer(
                line,
                column,
                format!("unexpected character '{}'", ch),
            )),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_blanks_and_comments(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '#' | ';' => {
                    while self.chars.peek().is_some_and(|c| *c != '\n') {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if !is_word_char(ch) {
                break;
            }
            text.push(ch);
            self.bump();
        }
        text
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | '+' | '-' | 'µ')
}

/// Parse a number string with optional SI suffix.
///
/// `p n u µ m k K M G`; note `m` is milli and `M` is mega.
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    let last = text.chars().last()?;
    let multiplier = match last {
        'p' => 1e-12,
        'n' => 1e-9,
        'u' | 'µ' => 1e-6,
        'm' => 1e-3,
        'k' | 'K' => 1e3,
        'M' => 1e6,
        'G' => 1e9,
        _ => return text.parse::<f64>().ok().filter(|v| v.is_finite()),
    };
    let digits = &text[..text.len() - last.len_utf8()];
    digits
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v * multiplier)
}
