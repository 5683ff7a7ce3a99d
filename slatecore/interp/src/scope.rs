//! Frame-arena scope chain with case-insensitive, case-preserving bindings.
use std::collections::HashMap;

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::value::{Type, Value};

/// Words that still resolve as identifiers but deserve a collision warning
/// when a program declares them as variable names.
pub static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "DECLARE", "CONSTANT", "IF", "THEN", "ELSE", "ENDIF", "CASE", "OF", "OTHERWISE",
        "ENDCASE", "FOR", "TO", "STEP", "NEXT", "WHILE", "DO", "ENDWHILE", "REPEAT", "UNTIL",
        "PROCEDURE", "ENDPROCEDURE", "FUNCTION", "ENDFUNCTION", "RETURN", "RETURNS", "CALL",
        "INPUT", "OUTPUT", "AND", "OR", "NOT", "TRUE", "FALSE", "DIV", "MOD", "INTEGER",
        "REAL", "BOOLEAN", "CHAR", "STRING", "ARRAY", "RANDOM", "ROUND", "LENGTH", "LCASE",
        "UCASE", "SUBSTRING",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone)]
pub struct Binding {
    /// Exact spelling from the first declaration; immutable for the scope.
    pub canonical: String,
    pub ty: Type,
    pub value: Value,
    pub initialized: bool,
    pub constant: bool,
}

#[derive(Debug, Default)]
pub struct Frame {
    /// Uppercased name -> binding.
    vars: HashMap<String, Binding>,
    parent: Option<usize>,
}

/// All frames of one run. Frame 0 is the global scope; call frames are
/// pushed on entry and truncated away on return, each parented to global
/// (call-by-value, no closures).
#[derive(Debug)]
pub struct Scopes {
    frames: Vec<Frame>,
}

pub fn key(name: &str) -> String {
    name.to_ascii_uppercase()
}

impl Scopes {
    pub fn new() -> Self {
        Self { frames: vec![Frame::default()] }
    }

    pub fn push_frame(&mut self, parent: usize) -> usize {
        self.frames.push(Frame { vars: HashMap::new(), parent: Some(parent) });
        self.frames.len() - 1
    }

    /// Discard the given frame and everything above it (call return).
    pub fn drop_from(&mut self, frame: usize) {
        self.frames.truncate(frame);
    }

    /// Declare in exactly `frame`. A same-scope redeclaration replaces the
    /// type and value but keeps the original canonical spelling.
    pub fn declare(&mut self, frame: usize, name: &str, ty: Type, value: Value, initialized: bool, constant: bool) {
        let k = key(name);
        let canonical = match self.frames[frame].vars.get(&k) {
            Some(b) => b.canonical.clone(),
            None => name.to_string(),
        };
        self.frames[frame]
            .vars
            .insert(k, Binding { canonical, ty, value, initialized, constant });
    }

    /// Walk the chain outward; returns the frame index holding the binding.
    pub fn declaring_frame(&self, frame: usize, name: &str) -> Option<usize> {
        let k = key(name);
        let mut cur = Some(frame);
        while let Some(f) = cur {
            if self.frames[f].vars.contains_key(&k) {
                return Some(f);
            }
            cur = self.frames[f].parent;
        }
        None
    }

    pub fn is_declared(&self, frame: usize, name: &str) -> bool {
        self.declaring_frame(frame, name).is_some()
    }

    pub fn get(&self, frame: usize, name: &str) -> Option<&Binding> {
        let f = self.declaring_frame(frame, name)?;
        self.frames[f].vars.get(&key(name))
    }

    pub fn get_mut(&mut self, frame: usize, name: &str) -> Option<&mut Binding> {
        let f = self.declaring_frame(frame, name)?;
        self.frames[f].vars.get_mut(&key(name))
    }

    pub fn canonical_name(&self, frame: usize, name: &str) -> Option<&str> {
        self.get(frame, name).map(|b| b.canonical.as_str())
    }
}
