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

//! Pratt parser for Slate expressions. The bare comma is the
//! lowest-precedence operator (string concatenation); inside call and index
//! argument lists each argument is parsed above the comma's binding power,
//! so the same token also serves as the list separator.
use slate_ast::{BinOp, Expr, UnOp};
use slate_common::{Result, SlateError};
use slate_lexer::{tokenize, Literal, Token, TokenKind};

// Arguments bind above Concat so list commas never fuse into one expression.
const ARG_MIN_BP: u8 = 10;

/// Parse one full expression (commas concatenate).
pub fn parse(src: &str, line: u32) -> Result<Expr> {
    let tokens = tokenize(src, line)?;
    let mut p = Parser::new(tokens, line);
    let e = p.parse_expr_bp(0)?;
    p.expect_eof()?;
    Ok(e)
}

/// Parse a top-level comma-separated expression list (OUTPUT/RETURN arguments).
pub fn parse_list(src: &str, line: u32) -> Result<Vec<Expr>> {
    let tokens = tokenize(src, line)?;
    let mut p = Parser::new(tokens, line);
    let mut out = Vec::new();
    loop {
        out.push(p.parse_expr_bp(ARG_MIN_BP)?);
        if !p.match_k(TokenKind::Comma) { break; }
    }
    p.expect_eof()?;
    Ok(out)
}

struct Parser { tokens: Vec<Token>, i: usize, line: u32 }

impl Parser {
    fn new(tokens: Vec<Token>, line: u32) -> Self { Self { tokens, i: 0, line } }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let (op, lbp, rbp) = match self.peek_binop_bp() {
                Some(t) => t,
                None => break,
            };
            if lbp < min_bp { break; }
            self.next(); // consume operator
            let rhs = self.parse_expr_bp(rbp)?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        if self.match_k(TokenKind::Minus) {
            let e = self.parse_expr_bp(80)?;
            return Ok(Expr::Unary { op: UnOp::Neg, expr: Box::new(e) });
        }
        if self.match_k(TokenKind::Not) {
            // NOT binds below the comparisons so `NOT a = b` negates the test.
            let e = self.parse_expr_bp(36)?;
            return Ok(Expr::Unary { op: UnOp::Not, expr: Box::new(e) });
        }
        match self.peek_kind() {
            Some(TokenKind::Number) => {
                let t = self.next().unwrap();
                match t.literal {
                    Some(Literal::Num(n)) => Ok(Expr::Number { value: n, lexeme: t.lexeme }),
                    _ => Err(SlateError::syntax(self.line, "number literal missing")),
                }
            }
            Some(TokenKind::StrLit) => {
                let t = self.next().unwrap();
                match t.literal {
                    Some(Literal::Str(s)) => Ok(Expr::Str(s)),
                    _ => Err(SlateError::syntax(self.line, "string literal missing")),
                }
            }
            Some(TokenKind::CharLit) => {
                let t = self.next().unwrap();
                match t.literal {
                    Some(Literal::Ch(c)) => Ok(Expr::Char(c)),
                    _ => Err(SlateError::syntax(self.line, "character literal missing")),
                }
            }
            Some(TokenKind::True) => { self.next(); Ok(Expr::Bool(true)) }
            Some(TokenKind::False) => { self.next(); Ok(Expr::Bool(false)) }
            // DIV/MOD double as call-style builtins: DIV(a, b).
            Some(TokenKind::Div) if self.peek2_is(TokenKind::LParen) => {
                self.next();
                let args = self.paren_args()?;
                Ok(Expr::Call { name: "DIV".to_string(), args })
            }
            Some(TokenKind::Mod) if self.peek2_is(TokenKind::LParen) => {
                self.next();
                let args = self.paren_args()?;
                Ok(Expr::Call { name: "MOD".to_string(), args })
            }
            Some(TokenKind::Ident) => {
                let name = self.next().unwrap().lexeme;
                if self.check(TokenKind::LParen) {
                    let args = self.paren_args()?;
                    return Ok(Expr::Call { name, args });
                }
                if self.match_k(TokenKind::LBracket) {
                    let mut indices = Vec::new();
                    loop {
                        indices.push(self.parse_expr_bp(ARG_MIN_BP)?);
                        if !self.match_k(TokenKind::Comma) { break; }
                    }
                    self.expect(TokenKind::RBracket)?;
                    return Ok(Expr::Index { name, indices });
                }
                Ok(Expr::Ident(name))
            }
            Some(TokenKind::LParen) => {
                self.next();
                let e = self.parse_expr_bp(0)?;
                self.expect(TokenKind::RParen)?;
                Ok(e)
            }
            other => Err(SlateError::syntax(
                self.line,
                format!("unexpected token in expression: {:?}", other),
            )),
        }
    }

    fn paren_args(&mut self) -> Result<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr_bp(ARG_MIN_BP)?);
                if !self.match_k(TokenKind::Comma) { break; }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn peek_binop_bp(&self) -> Option<(BinOp, u8, u8)> {
        match self.peek_kind()? {
            // comma-concatenation (lowest precedence)
            TokenKind::Comma => Some((BinOp::Concat, 5, 6)),
            // logical
            TokenKind::Or => Some((BinOp::Or, 20, 21)),
            TokenKind::And => Some((BinOp::And, 30, 31)),
            // comparisons
            TokenKind::Eq => Some((BinOp::Eq, 40, 41)),
            TokenKind::NotEq => Some((BinOp::Ne, 40, 41)),
            TokenKind::Lt => Some((BinOp::Lt, 50, 51)),
            TokenKind::LtEq => Some((BinOp::Le, 50, 51)),
            TokenKind::Gt => Some((BinOp::Gt, 50, 51)),
            TokenKind::GtEq => Some((BinOp::Ge, 50, 51)),
            // additive
            TokenKind::Plus => Some((BinOp::Add, 60, 61)),
            TokenKind::Minus => Some((BinOp::Sub, 60, 61)),
            // multiplicative
            TokenKind::Star => Some((BinOp::Mul, 70, 71)),
            TokenKind::Slash => Some((BinOp::Div, 70, 71)),
            TokenKind::Div => Some((BinOp::IntDiv, 70, 71)),
            TokenKind::Mod => Some((BinOp::Mod, 70, 71)),
            // power (right-associative: rbp below lbp)
            TokenKind::Caret => Some((BinOp::Pow, 90, 89)),
            _ => None,
        }
    }

    // small helpers
    fn expect(&mut self, k: TokenKind) -> Result<Token> {
        if self.check(k.clone()) {
            Ok(self.next().unwrap())
        } else {
            Err(SlateError::syntax(self.line, format!("expected {:?}", k)))
        }
    }
    fn expect_eof(&mut self) -> Result<()> {
        if self.check(TokenKind::Eof) {
            Ok(())
        } else {
            Err(SlateError::syntax(
                self.line,
                format!("unexpected trailing token: '{}'", self.tokens[self.i].lexeme),
            ))
        }
    }
    fn check(&self, k: TokenKind) -> bool { self.peek_kind() == Some(k) }
    fn match_k(&mut self, k: TokenKind) -> bool {
        if self.check(k) { self.next(); true } else { false }
    }
    fn peek_kind(&self) -> Option<TokenKind> { self.tokens.get(self.i).map(|t| t.kind.clone()) }
    fn peek2_is(&self, k: TokenKind) -> bool {
        self.tokens.get(self.i + 1).map(|t| t.kind.clone()) == Some(k)
    }
    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.i).cloned();
        if t.is_some() { self.i += 1; }
        t
    }
}
