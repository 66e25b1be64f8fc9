//! Token definitions for RTF
//!
//! RTF has very few lexical forms: group delimiters, control words, control
//! symbols, hex-escaped bytes and literal text. They are defined here using the
//! logos derive macro. Raw line breaks carry no meaning in RTF and are skipped.
use logos::{Lexer, Logos};
use std::fmt;

/// A control word such as `\par`, `\fs24` or `\u-3913`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlWord {
    pub name: String,
    pub param: Option<i32>,
}

impl ControlWord {
    pub fn new(name: impl Into<String>, param: Option<i32>) -> Self {
        Self {
            name: name.into(),
            param,
        }
    }
}

impl fmt::Display for ControlWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.param {
            Some(param) => write!(f, "\\{}{}", self.name, param),
            None => write!(f, "\\{}", self.name),
        }
    }
}

/// All tokens an RTF stream is made of.
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
#[logos(skip r"[\r\n]+")]
pub enum Token {
    #[token("{")]
    GroupOpen,

    #[token("}")]
    GroupClose,

    // Letters, an optional signed argument, and an optional delimiting space
    // which belongs to the control word.
    #[regex(r"\\[a-zA-Z]+(-?[0-9]+)? ?", control_word)]
    ControlWord(ControlWord),

    // Any single non-letter after a backslash, except the three literal escapes
    // and the hex escape lead-in.
    #[regex(r"\\[^a-zA-Z'\\{}]", control_symbol)]
    ControlSymbol(char),

    #[regex(r"\\'[0-9a-fA-F]{2}", hex_byte)]
    HexByte(u8),

    // A hex escape with fewer than two digits before a group end, another
    // escape or the end of input. Any other short form is an invalid escape.
    #[regex(r"\\'[0-9a-fA-F]?", unterminated_hex)]
    UnterminatedHex,

    #[regex(r"[^\\{}\r\n]+", |lex| lex.slice().to_owned())]
    #[regex(r"\\[\\{}]", |lex| lex.slice()[1..].to_owned())]
    Text(String),
}

fn control_word(lex: &mut Lexer<Token>) -> ControlWord {
    let body = lex.slice()[1..].trim_end_matches(' ');
    let split = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    let (name, param) = body.split_at(split);
    ControlWord {
        name: name.to_owned(),
        param: if param.is_empty() {
            None
        } else {
            param.parse().ok()
        },
    }
}

fn control_symbol(lex: &mut Lexer<Token>) -> Option<char> {
    lex.slice()[1..].chars().next()
}

fn hex_byte(lex: &mut Lexer<Token>) -> Option<u8> {
    u8::from_str_radix(&lex.slice()[2..], 16).ok()
}

fn unterminated_hex(lex: &mut Lexer<Token>) -> bool {
    matches!(lex.remainder().chars().next(), None | Some('}' | '\\'))
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::GroupOpen => write!(f, "{{"),
            Token::GroupClose => write!(f, "}}"),
            Token::ControlWord(word) => write!(f, "{}", word),
            Token::ControlSymbol(c) => write!(f, "\\{}", c),
            Token::HexByte(b) => write!(f, "\\'{:02x}", b),
            Token::UnterminatedHex => write!(f, "\\'"),
            Token::Text(text) => write!(f, "{}", text),
        }
    }
}
