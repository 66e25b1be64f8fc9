//! Lazy tokenization of RTF source text
//!
//! [`Tokenizer`] wraps the logos lexer and adds the two behaviors a plain
//! lexer can't express: bytes the lexer rejects are recorded and skipped
//! rather than aborting, and the payload of `\binN` is stepped over so binary
//! data never reaches the token stream.

use std::ops::Range;

use logos::{Lexer, Logos};

use super::tokens::Token;

/// A token paired with the byte range it was read from.
pub type Spanned = (Token, Range<usize>);

#[derive(Clone)]
pub struct Tokenizer<'src> {
    lexer: Lexer<'src, Token>,
    skipped: Vec<Range<usize>>,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Token::lexer(source),
            skipped: Vec::new(),
        }
    }

    /// Byte ranges that did not form a valid token and were dropped.
    pub fn skipped(&self) -> &[Range<usize>] {
        &self.skipped
    }

    fn skip_binary(&mut self, len: usize) {
        let remainder = self.lexer.remainder();
        let mut len = len.min(remainder.len());
        while !remainder.is_char_boundary(len) {
            len += 1;
        }
        self.lexer.bump(len);
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Spanned;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lexer.next()? {
                Ok(token) => {
                    let span = self.lexer.span();
                    if let Token::ControlWord(word) = &token {
                        if word.name == "bin" {
                            if let Some(len) = word.param.filter(|len| *len > 0) {
                                self.skip_binary(len as usize);
                            }
                        }
                    }
                    return Some((token, span));
                }
                Err(()) => self.skipped.push(self.lexer.span()),
            }
        }
    }
}

/// Tokenize a whole source eagerly.
pub fn tokenize(source: &str) -> Vec<Spanned> {
    Tokenizer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::tokens::ControlWord;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_tokenizes_with_spans() {
        let tokens = tokenize("{\\rtf1 hi}");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0], (Token::GroupOpen, 0..1));
        assert_eq!(
            tokens[1],
            (Token::ControlWord(ControlWord::new("rtf", Some(1))), 1..7)
        );
        assert_eq!(tokens[2], (Token::Text("hi".to_string()), 7..9));
        assert_eq!(tokens[3], (Token::GroupClose, 9..10));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize(""), vec![]);
    }

    #[test]
    fn test_malformed_hex_escape_is_skipped() {
        let mut tokenizer = Tokenizer::new("a\\'zz b");
        let tokens: Vec<Token> = tokenizer.by_ref().map(|(t, _)| t).collect();
        assert!(!tokenizer.skipped().is_empty());
        assert_eq!(tokens.first(), Some(&Token::Text("a".to_string())));
        match tokens.last() {
            Some(Token::Text(tail)) => assert!(tail.ends_with(" b")),
            other => panic!("unexpected tail token: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_backslash_is_skipped() {
        let mut tokenizer = Tokenizer::new("end\\");
        assert_eq!(tokenizer.next(), Some((Token::Text("end".to_string()), 0..3)));
        assert_eq!(tokenizer.next(), None);
        assert_eq!(tokenizer.skipped(), &[3..4]);
    }

    #[test]
    fn test_binary_payload_is_skipped() {
        let tokens = kinds("{\\bin4 {}\\x after}");
        assert_eq!(
            tokens,
            vec![
                Token::GroupOpen,
                Token::ControlWord(ControlWord::new("bin", Some(4))),
                Token::Text(" after".to_string()),
                Token::GroupClose,
            ]
        );
    }

    #[test]
    fn test_restartable() {
        let source = "{\\b x}";
        let first: Vec<_> = Tokenizer::new(source).collect();
        let second: Vec<_> = Tokenizer::new(source).collect();
        assert_eq!(first, second);
    }
}
