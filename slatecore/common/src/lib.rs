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

//! Shared diagnostics and run limits for the Slate interpreter.
use thiserror::Error;

/// Every loop body iteration in a run counts against this ceiling.
pub const MAX_LOOP_ITERS: u64 = 1_000_000;
/// Total element ceiling for a single array declaration.
pub const MAX_ARRAY_ELEMS: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Name,
    Type,
    Value,
    Index,
    ZeroDivision,
    Syntax,
    Runtime,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Name => "NameError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Value => "ValueError",
            ErrorKind::Index => "IndexError",
            ErrorKind::ZeroDivision => "ZeroDivisionError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Runtime => "RuntimeError",
        };
        write!(f, "{}", s)
    }
}

/// A fatal diagnostic. `Fatal` carries the 1-based source line active when it
/// was raised and renders as the terminal `Line <n>: <Kind>: <message>` string;
/// `Stopped` is the cancellation signal and is not an error kind to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SlateError {
    #[error("Line {line}: {kind}: {msg}")]
    Fatal { kind: ErrorKind, line: u32, msg: String },
    #[error("stopped")]
    Stopped,
}

impl SlateError {
    pub fn fatal(kind: ErrorKind, line: u32, msg: impl Into<String>) -> Self {
        SlateError::Fatal { kind, line, msg: msg.into() }
    }
    pub fn name(line: u32, msg: impl Into<String>) -> Self {
        Self::fatal(ErrorKind::Name, line, msg)
    }
    pub fn type_err(line: u32, msg: impl Into<String>) -> Self {
        Self::fatal(ErrorKind::Type, line, msg)
    }
    pub fn value(line: u32, msg: impl Into<String>) -> Self {
        Self::fatal(ErrorKind::Value, line, msg)
    }
    pub fn index(line: u32, msg: impl Into<String>) -> Self {
        Self::fatal(ErrorKind::Index, line, msg)
    }
    pub fn zero_div(line: u32, msg: impl Into<String>) -> Self {
        Self::fatal(ErrorKind::ZeroDivision, line, msg)
    }
    pub fn syntax(line: u32, msg: impl Into<String>) -> Self {
        Self::fatal(ErrorKind::Syntax, line, msg)
    }
    pub fn runtime(line: u32, msg: impl Into<String>) -> Self {
        Self::fatal(ErrorKind::Runtime, line, msg)
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SlateError::Fatal { kind, .. } => Some(*kind),
            SlateError::Stopped => None,
        }
    }
    pub fn line(&self) -> Option<u32> {
        match self {
            SlateError::Fatal { line, .. } => Some(*line),
            SlateError::Stopped => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SlateError>;
