use std::{iter::Peekable, str::CharIndices};

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
    Equals,
    /// Statement separator: `;` or a newline.
    Separator,
}

impl TokenKind {
    /// Describes the token for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Number(value) => format!("number `{value}`"),
            Self::Ident(name) => format!("identifier `{name}`"),
            Self::Plus => "`+`".into(),
            Self::Minus => "`-`".into(),
            Self::Star => "`*`".into(),
            Self::Slash => "`/`".into(),
            Self::Caret => "`^`".into(),
            Self::LParen => "`(`".into(),
            Self::RParen => "`)`".into(),
            Self::Comma => "`,`".into(),
            Self::Equals => "`=`".into(),
            Self::Separator => "end of statement".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) offset: usize,
}

/// Splits the source into tokens.
///
/// `**` is accepted as a synonym for `^`. Identifiers may contain dots
/// between segments (`indeps.x`), but never start or end with one.
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        let kind = match ch {
            '\n' | ';' => {
                chars.next();
                TokenKind::Separator
            }
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => lex_number(src, &mut chars)?,
            c if c.is_ascii_alphabetic() || c == '_' => lex_ident(src, &mut chars),
            '*' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '*'))) {
                    chars.next();
                    TokenKind::Caret
                } else {
                    TokenKind::Star
                }
            }
            _ => {
                chars.next();
                match ch {
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '/' => TokenKind::Slash,
                    '^' => TokenKind::Caret,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    ',' => TokenKind::Comma,
                    '=' => TokenKind::Equals,
                    _ => return Err(ParseError::UnexpectedChar { ch, offset }),
                }
            }
        };
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

fn lex_number(src: &str, chars: &mut Peekable<CharIndices<'_>>) -> Result<TokenKind, ParseError> {
    let start = chars.peek().map_or(src.len(), |&(i, _)| i);
    let mut end = start;
    let mut seen_exponent = false;
    let mut prev = '\0';

    while let Some(&(i, c)) = chars.peek() {
        let accept = match c {
            '0'..='9' | '.' => true,
            'e' | 'E' if !seen_exponent => {
                seen_exponent = true;
                true
            }
            '+' | '-' => matches!(prev, 'e' | 'E'),
            _ => false,
        };
        if !accept {
            break;
        }
        prev = c;
        end = i + c.len_utf8();
        chars.next();
    }

    let text = &src[start..end];
    text.parse::<f64>()
        .map(TokenKind::Number)
        .map_err(|_| ParseError::InvalidNumber {
            text: text.to_string(),
            offset: start,
        })
}

fn lex_ident(src: &str, chars: &mut Peekable<CharIndices<'_>>) -> TokenKind {
    let start = chars.peek().map_or(src.len(), |&(i, _)| i);
    let mut end = start;

    while let Some(&(i, c)) = chars.peek() {
        let continues = c.is_ascii_alphanumeric()
            || c == '_'
            || (c == '.'
                && src[i + 1..]
                    .chars()
                    .next()
                    .is_some_and(|n| n.is_ascii_alphabetic() || n == '_'));
        if !continues {
            break;
        }
        end = i + c.len_utf8();
        chars.next();
    }

    TokenKind::Ident(src[start..end].to_string())
}
