/*

 ▄▄▄▄    ██▓    ▄▄▄       ▄████▄   ██ ▄█▀ ██▀███   █    ██   ██████  ██░ ██
▓█████▄ ▓██▒   ▒████▄    ▒██▀ ▀█   ██▄█▒ ▓██ ▒ ██▒ ██  ▓██▒▒██    ▒ ▓██░ ██▒
▒██▒ ▄██▒██░   ▒██  ▀█▄  ▒▓█    ▄ ▓███▄░ ▓██ ░▄█ ▒▓██  ▒██░░ ▓██▄   ▒██▀▀██░
▒██░█▀  ▒██░   ░██▄▄▄▄██ ▒▓▓▄ ▄██▒▓██ █▄ ▒██▀▀█▄  ▓▓█  ░██░  ▒   ██▒░▓█ ░██
░▓█  ▀█▓░██████▒▓█   ▓██▒▒ ▓███▀ ░▒██▒ █▄░██▓ ▒██▒▒▒█████▓ ▒██████▒▒░▓█▒░██▓
░▒▓███▀▒░ ▒░▓  ░▒▒   ▓▒█░░ ░▒ ▒  ░▒ ▒▒ ▓▒░ ▒▓ ░▒▓░░▒▓▒ ▒ ▒ ▒ ▒▓▒ ▒ ░ ▒ ░░▒░▒
▒░▒   ░ ░ ░ ▒  ░ ▒   ▒▒ ░  ░  ▒   ░ ░▒ ▒░  ░▒ ░ ▒░░░▒░ ░ ░ ░ ░▒  ░ ░ ▒ ░▒░ ░
 ░    ░   ░ ░    ░   ▒   ░        ░ ░░ ░   ░░   ░  ░░░ ░ ░ ░  ░  ░   ░  ░░ ░
 ░          ░  ░     ░  ░░ ░      ░  ░      ░        ░           ░   ░  ░  ░
      ░                  ░
Copyright (C) 2026, Blackrush LLC, All Rights Reserved
Created by Erik Olson, Tarpon Springs, Florida
For more information, visit BlackrushDrive.com

MIT License

Copyright (c) 2026 Erik Lee Olson for Blackrush, LLC

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.

*/

//! Expression tokenizer for Slate pseudocode (quote-protected literals,
//! case-insensitive word operators)
use slate_common::{Result, SlateError};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Single-char
    LParen, RParen, LBracket, RBracket, Comma,
    Plus, Minus, Star, Slash, Caret,
    Lt, Gt, Eq,            // '<' '>' '='
    // Two-char
    NotEq, LtEq, GtEq,     // '<>' '<=' '>='
    // Literals / identifiers
    Ident, Number, CharLit, StrLit,
    // Word operators and keywords
    True, False, And, Or, Not, Div, Mod,
    Eof,
}

#[derive(Debug, Clone)]
pub enum Literal { Num(f64), Ch(char), Str(String) }

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
}

/// Tokenize one expression. Statements are line-scoped upstream, so the
/// source never contains a newline; `line` only stamps diagnostics.
pub fn tokenize(src: &str, line: u32) -> Result<Vec<Token>> {
    let mut lx = Lexer::new(src, line);
    let mut out = Vec::new();
    loop {
        let t = lx.next_token()?;
        let eof = t.kind == TokenKind::Eof;
        out.push(t);
        if eof { break; }
    }
    Ok(out)
}

struct Lexer<'a> {
    src:   &'a str,
    chars: std::str::Chars<'a>,
    cur:   Option<char>,
    pos:   usize, // byte offset *after* `cur`
    start: usize, // byte offset start of current token
    line:  u32,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, line: u32) -> Self {
        let mut l = Self { src, chars: src.chars(), cur: None, pos: 0, start: 0, line };
        l.advance(); // prime `cur` and `pos`
        l
    }

    fn next_token(&mut self) -> Result<Token> {
        while matches!(self.cur, Some(c) if c.is_whitespace()) { self.advance(); }

        let ch = match self.cur {
            Some(c) => c,
            None => return Ok(Token { kind: TokenKind::Eof, lexeme: String::new(), literal: None }),
        };
        let clen = ch.len_utf8();
        self.start = self.pos - clen;

        let tok = match ch {
            '(' => { let t = self.make(TokenKind::LParen);   self.advance(); t }
            ')' => { let t = self.make(TokenKind::RParen);   self.advance(); t }
            '[' => { let t = self.make(TokenKind::LBracket); self.advance(); t }
            ']' => { let t = self.make(TokenKind::RBracket); self.advance(); t }
            ',' => { let t = self.make(TokenKind::Comma);    self.advance(); t }
            '+' => { let t = self.make(TokenKind::Plus);     self.advance(); t }
            '-' => { let t = self.make(TokenKind::Minus);    self.advance(); t }
            '*' => { let t = self.make(TokenKind::Star);     self.advance(); t }
            '/' => { let t = self.make(TokenKind::Slash);    self.advance(); t }
            '^' => { let t = self.make(TokenKind::Caret);    self.advance(); t }
            '=' => { let t = self.make(TokenKind::Eq);       self.advance(); t }
            '<' => {
                self.advance();
                if self.match_char('=') { op("<=", TokenKind::LtEq) }
                else if self.match_char('>') { op("<>", TokenKind::NotEq) }
                else { op("<", TokenKind::Lt) }
            }
            '>' => {
                self.advance();
                if self.match_char('=') { op(">=", TokenKind::GtEq) }
                else { op(">", TokenKind::Gt) }
            }
            '"'  => self.string()?,
            '\'' => self.char_lit()?,
            c if c.is_ascii_digit() => self.number()?,
            c if is_ident_start(c)  => self.ident_or_kw(),
            _ => return Err(SlateError::syntax(self.line, format!("unexpected character '{}'", ch))),
        };
        Ok(tok)
    }

    fn make(&self, kind: TokenKind) -> Token {
        Token { kind, lexeme: self.src[self.start..self.pos].to_string(), literal: None }
    }

    // Double-quoted string; no escape sequences in the teaching language.
    fn string(&mut self) -> Result<Token> {
        let outer_start = self.start;
        let content_start = self.pos;
        self.advance(); // step past opening quote
        let content_end = loop {
            match self.cur {
                None => return Err(SlateError::syntax(self.line, "unterminated string literal")),
                Some('"') => {
                    let end = self.pos - '"'.len_utf8();
                    self.advance();
                    break end;
                }
                Some(_) => self.advance(),
            }
        };
        let content = self.src[content_start..content_end].to_string();
        Ok(Token {
            kind: TokenKind::StrLit,
            lexeme: self.src[outer_start..self.pos].to_string(),
            literal: Some(Literal::Str(content)),
        })
    }

    // Single-quoted char: exactly one character between the quotes.
    fn char_lit(&mut self) -> Result<Token> {
        let outer_start = self.start;
        let content_start = self.pos;
        self.advance();
        let content_end = loop {
            match self.cur {
                None => return Err(SlateError::syntax(self.line, "unterminated character literal")),
                Some('\'') => {
                    let end = self.pos - '\''.len_utf8();
                    self.advance();
                    break end;
                }
                Some(_) => self.advance(),
            }
        };
        let content = &self.src[content_start..content_end];
        let mut it = content.chars();
        let c = match (it.next(), it.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(SlateError::syntax(
                    self.line,
                    format!("character literal '{}' must hold exactly one character", content),
                ));
            }
        };
        Ok(Token {
            kind: TokenKind::CharLit,
            lexeme: self.src[outer_start..self.pos].to_string(),
            literal: Some(Literal::Ch(c)),
        })
    }

    fn number(&mut self) -> Result<Token> {
        let start = self.start;
        let mut end = self.pos; // after the first digit

        while matches!(self.cur, Some(c) if c.is_ascii_digit()) {
            end = self.pos;
            self.advance();
        }
        if self.cur == Some('.') && matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            end = self.pos; // include the dot
            self.advance();
            while matches!(self.cur, Some(c) if c.is_ascii_digit()) {
                end = self.pos;
                self.advance();
            }
        }

        let lex = &self.src[start..end];
        let n: f64 = lex
            .parse()
            .map_err(|e| SlateError::syntax(self.line, format!("invalid number '{}': {}", lex, e)))?;
        let mut tok = Token { kind: TokenKind::Number, lexeme: lex.to_string(), literal: None };
        tok.literal = Some(Literal::Num(n));
        Ok(tok)
    }

    fn ident_or_kw(&mut self) -> Token {
        let start = self.start;
        let mut end = self.pos;
        loop {
            match self.cur {
                Some(c) if is_ident_continue(c) => { end = self.pos; self.advance(); }
                _ => break,
            }
        }
        let lex = &self.src[start..end];
        let kind = match &*lex.to_ascii_uppercase() {
            "TRUE"  => TokenKind::True,
            "FALSE" => TokenKind::False,
            "AND"   => TokenKind::And,
            "OR"    => TokenKind::Or,
            "NOT"   => TokenKind::Not,
            "DIV"   => TokenKind::Div,
            "MOD"   => TokenKind::Mod,
            _       => TokenKind::Ident,
        };
        Token { kind, lexeme: lex.to_string(), literal: None }
    }

    fn advance(&mut self) {
        self.cur = self.chars.next();
        if let Some(c) = self.cur {
            self.pos += c.len_utf8();
        } else {
            self.pos = self.src.len();
        }
    }

    fn match_char(&mut self, want: char) -> bool {
        if self.cur == Some(want) { self.advance(); true } else { false }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }
}

fn op(lexeme: &str, kind: TokenKind) -> Token {
    Token { kind, lexeme: lexeme.to_string(), literal: None }
}

fn is_ident_start(c: char) -> bool { c.is_ascii_alphabetic() || c == '_' }
fn is_ident_continue(c: char) -> bool { c.is_ascii_alphanumeric() || c == '_' }

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src, 1).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn operators_and_idents() {
        assert_eq!(
            kinds("x <= y <> z"),
            vec![
                TokenKind::Ident, TokenKind::LtEq, TokenKind::Ident,
                TokenKind::NotEq, TokenKind::Ident, TokenKind::Eof
            ]
        );
    }

    #[test]
    fn word_operators_any_case() {
        assert_eq!(
            kinds("a div B mod c AND not d"),
            vec![
                TokenKind::Ident, TokenKind::Div, TokenKind::Ident, TokenKind::Mod,
                TokenKind::Ident, TokenKind::And, TokenKind::Not, TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn number_lexeme_keeps_decimal_form() {
        let toks = tokenize("3.0", 1).unwrap();
        assert_eq!(toks[0].kind, TokenKind::Number);
        assert_eq!(toks[0].lexeme, "3.0");
    }

    #[test]
    fn operators_inside_quotes_are_protected() {
        let toks = tokenize("\"a + b, c\"", 1).unwrap();
        assert_eq!(toks.len(), 2); // StrLit + Eof
        match &toks[0].literal {
            Some(Literal::Str(s)) => assert_eq!(s, "a + b, c"),
            other => panic!("expected string literal, got {:?}", other),
        }
    }

    #[test]
    fn char_literal_must_be_single() {
        assert!(tokenize("'ab'", 1).is_err());
        let toks = tokenize("'a'", 1).unwrap();
        assert_eq!(toks[0].kind, TokenKind::CharLit);
    }

    #[test]
    fn unterminated_string_errors() {
        assert!(tokenize("\"abc", 1).is_err());
    }
}
