//! Block matcher: turns the flat line listing into PROCEDURE/FUNCTION
//! definitions plus a main body, and carves out construct bodies by
//! nesting-depth scanning during execution.
use std::collections::HashMap;

use slate_common::{Result, SlateError};

use crate::value::Type;

#[derive(Debug, Clone)]
pub struct Line {
    /// 1-based source line number.
    pub num: u32,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Option<Type>,
}

#[derive(Debug, Clone)]
pub struct ProcDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Line>,
}

#[derive(Debug, Clone)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Option<Type>,
    pub body: Vec<Line>,
}

/// Split raw source into trimmed, comment-stripped, line-numbered statements.
pub fn split_source(src: &str) -> Vec<Line> {
    let mut out = Vec::new();
    for (i, raw) in src.lines().enumerate() {
        let text = strip_comment(raw).trim().to_string();
        if text.is_empty() {
            continue;
        }
        out.push(Line { num: (i + 1) as u32, text });
    }
    out
}

// Remove a trailing // comment, ignoring slashes inside quoted literals.
fn strip_comment(raw: &str) -> &str {
    let mut in_d = false;
    let mut in_s = false;
    let bytes: Vec<char> = raw.chars().collect();
    let mut byte_pos = 0usize;
    for (i, &c) in bytes.iter().enumerate() {
        match c {
            '"' if !in_s => in_d = !in_d,
            '\'' if !in_d => in_s = !in_s,
            '/' if !in_d && !in_s => {
                if bytes.get(i + 1) == Some(&'/') {
                    return &raw[..byte_pos];
                }
            }
            _ => {}
        }
        byte_pos += c.len_utf8();
    }
    raw
}

/// First word of a statement, uppercased, plus the rest of the line.
pub fn first_word(text: &str) -> (String, &str) {
    let t = text.trim_start();
    let end = t
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphanumeric() && *c != '_')
        .map(|(i, _)| i)
        .unwrap_or(t.len());
    (t[..end].to_ascii_uppercase(), t[end..].trim_start())
}

/// Does this line open the given construct (keyword at start, word boundary)?
pub fn opens(text: &str, kw: &str) -> bool {
    first_word(text).0 == kw
}

/// Scan forward from `start` for the depth-0 `closer`, bumping depth on
/// every re-occurrence of `opener`. Returns the closer's index in `lines`.
pub fn find_closer(
    lines: &[Line],
    start: usize,
    opener: &str,
    closer: &str,
    opened_at: u32,
) -> Result<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i < lines.len() {
        let (word, _) = first_word(&lines[i].text);
        if word == opener {
            depth += 1;
        } else if word == closer {
            if depth == 0 {
                return Ok(i);
            }
            depth -= 1;
        }
        i += 1;
    }
    Err(SlateError::syntax(
        opened_at,
        format!("{} without a matching {}", opener, closer),
    ))
}

/// A matched IF construct: condition text, THEN arm, ELSE arm, and the
/// index just past ENDIF.
#[derive(Debug)]
pub struct IfBlock {
    pub cond: String,
    pub cond_line: u32,
    pub then_body: Vec<Line>,
    pub else_body: Vec<Line>,
    pub next: usize,
}

/// Match an IF opening at `lines[at]`. Both surface forms — `IF cond THEN`
/// on one line and `IF cond` followed by a bare `THEN` line — produce the
/// same THEN/ELSE/ENDIF partitioning. A depth-0 ELSE routes the remainder
/// to the ELSE arm; deeper ELSE/ENDIF belong to nested IFs.
pub fn match_if(lines: &[Line], at: usize) -> Result<IfBlock> {
    let header = &lines[at];
    let (_, rest) = first_word(&header.text);
    let mut cond = rest.trim().to_string();
    let mut body_start = at + 1;

    let upper = cond.to_ascii_uppercase();
    if let Some(stripped) = upper.strip_suffix("THEN") {
        // Inline form; make sure THEN is its own word.
        if stripped.ends_with(|c: char| c.is_whitespace()) || stripped.is_empty() {
            cond = cond[..stripped.len()].trim().to_string();
        } else {
            return Err(SlateError::syntax(header.num, "expected THEN after the IF condition"));
        }
    } else {
        // Two-line form: the next statement must be a bare THEN.
        match lines.get(body_start) {
            Some(l) if l.text.eq_ignore_ascii_case("THEN") => body_start += 1,
            _ => return Err(SlateError::syntax(header.num, "expected THEN after the IF condition")),
        }
    }
    if cond.is_empty() {
        return Err(SlateError::syntax(header.num, "IF is missing its condition"));
    }

    let mut depth = 0usize;
    let mut then_body = Vec::new();
    let mut else_body = Vec::new();
    let mut in_else = false;
    let mut i = body_start;
    while i < lines.len() {
        let (word, _) = first_word(&lines[i].text);
        if word == "IF" {
            depth += 1;
        } else if word == "ENDIF" {
            if depth == 0 {
                return Ok(IfBlock {
                    cond,
                    cond_line: header.num,
                    then_body,
                    else_body,
                    next: i + 1,
                });
            }
            depth -= 1;
        } else if word == "ELSE" && depth == 0 {
            if in_else {
                return Err(SlateError::syntax(lines[i].num, "duplicate ELSE in one IF"));
            }
            in_else = true;
            i += 1;
            continue;
        }
        if in_else {
            else_body.push(lines[i].clone());
        } else {
            then_body.push(lines[i].clone());
        }
        i += 1;
    }
    Err(SlateError::syntax(header.num, "IF without a matching ENDIF"))
}

/// Match a FOR opening at `lines[at]`: find the depth-0 NEXT and verify it
/// names the loop variable. Returns (body, index just past NEXT).
pub fn match_for(lines: &[Line], at: usize, var: &str) -> Result<(Vec<Line>, usize)> {
    let close = find_closer(lines, at + 1, "FOR", "NEXT", lines[at].num)?;
    let (_, rest) = first_word(&lines[close].text);
    let named = rest.trim();
    if !named.is_empty() && !named.eq_ignore_ascii_case(var) {
        return Err(SlateError::syntax(
            lines[close].num,
            format!("NEXT {} does not close FOR {}", named, var),
        ));
    }
    Ok((lines[at + 1..close].to_vec(), close + 1))
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_params(text: &str, line: u32) -> Result<Vec<Param>> {
    let t = text.trim();
    if t.is_empty() {
        return Ok(Vec::new());
    }
    let mut params = Vec::new();
    for piece in t.split(',') {
        let piece = piece.trim();
        let (name, ty) = match piece.split_once(':') {
            Some((n, ty_text)) => {
                let ty = Type::parse(ty_text).ok_or_else(|| {
                    SlateError::syntax(line, format!("unknown parameter type '{}'", ty_text.trim()))
                })?;
                (n.trim(), Some(ty))
            }
            None => (piece, None),
        };
        if !is_ident(name) {
            return Err(SlateError::syntax(line, format!("bad parameter name '{}'", name)));
        }
        params.push(Param { name: name.to_string(), ty });
    }
    Ok(params)
}

// Header forms: `PROCEDURE Name`, `PROCEDURE Name(p : TYPE, ...)`,
// `FUNCTION Name(...) RETURNS TYPE`.
fn parse_header(rest: &str, line: u32, is_func: bool) -> Result<(String, Vec<Param>, Option<Type>)> {
    let rest = rest.trim();
    let (sig, ret) = if is_func {
        match split_word(rest, "RETURNS") {
            Some((before, after)) => {
                let ty = Type::parse(after).ok_or_else(|| {
                    SlateError::syntax(line, format!("unknown return type '{}'", after.trim()))
                })?;
                (before.trim(), Some(ty))
            }
            None => (rest, None),
        }
    } else {
        (rest, None)
    };

    let (name, params) = match sig.find('(') {
        Some(open) => {
            let close = sig.rfind(')').ok_or_else(|| {
                SlateError::syntax(line, "missing ')' in the parameter list")
            })?;
            (sig[..open].trim(), parse_params(&sig[open + 1..close], line)?)
        }
        None => (sig, Vec::new()),
    };
    if !is_ident(name) {
        return Err(SlateError::syntax(line, format!("bad definition name '{}'", name)));
    }
    Ok((name.to_string(), params, ret))
}

/// Find a keyword as a standalone word outside quotes and brackets; returns
/// the text before and after it.
pub fn split_word<'a>(text: &'a str, word: &str) -> Option<(&'a str, &'a str)> {
    let chars: Vec<char> = text.chars().collect();
    let wlen = word.len();
    let mut in_d = false;
    let mut in_s = false;
    let mut depth = 0i32;
    let mut byte = 0usize;
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '"' if !in_s => in_d = !in_d,
            '\'' if !in_d => in_s = !in_s,
            '(' | '[' if !in_d && !in_s => depth += 1,
            ')' | ']' if !in_d && !in_s => depth -= 1,
            _ => {}
        }
        if !in_d && !in_s && depth == 0 {
            if let Some(slice) = text.get(byte..byte + wlen) {
                if slice.eq_ignore_ascii_case(word) {
                    let before_ok =
                        i == 0 || !(chars[i - 1].is_ascii_alphanumeric() || chars[i - 1] == '_');
                    let after = &text[byte + wlen..];
                    let after_ok = after
                        .chars()
                        .next()
                        .map(|c| !(c.is_ascii_alphanumeric() || c == '_'))
                        .unwrap_or(true);
                    if before_ok && after_ok {
                        return Some((&text[..byte], after));
                    }
                }
            }
        }
        byte += c.len_utf8();
    }
    None
}

/// Find a symbol (e.g. `<-`, `:`) outside quotes and brackets.
pub fn find_symbol(text: &str, sym: &str) -> Option<usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut in_d = false;
    let mut in_s = false;
    let mut depth = 0i32;
    let mut byte = 0usize;
    for &c in chars.iter() {
        match c {
            '"' if !in_s => in_d = !in_d,
            '\'' if !in_d => in_s = !in_s,
            '(' | '[' if !in_d && !in_s => depth += 1,
            ')' | ']' if !in_d && !in_s => depth -= 1,
            _ => {}
        }
        if !in_d && !in_s && depth == 0 && text[byte..].starts_with(sym) {
            return Some(byte);
        }
        byte += c.len_utf8();
    }
    None
}

/// Split on top-level commas (outside quotes and brackets).
pub fn split_commas(text: &str) -> Vec<&str> {
    let chars: Vec<char> = text.chars().collect();
    let mut in_d = false;
    let mut in_s = false;
    let mut depth = 0i32;
    let mut parts = Vec::new();
    let mut start = 0usize;
    let mut byte = 0usize;
    for &c in chars.iter() {
        match c {
            '"' if !in_s => in_d = !in_d,
            '\'' if !in_d => in_s = !in_s,
            '(' | '[' if !in_d && !in_s => depth += 1,
            ')' | ']' if !in_d && !in_s => depth -= 1,
            ',' if !in_d && !in_s && depth == 0 => {
                parts.push(&text[start..byte]);
                start = byte + 1;
            }
            _ => {}
        }
        byte += c.len_utf8();
    }
    parts.push(&text[start..]);
    parts
}

/// One pass over the listing: pull out every PROCEDURE/FUNCTION (keyed by
/// uppercased name) and return the remaining main-body lines.
pub fn extract_definitions(
    lines: Vec<Line>,
) -> Result<(Vec<Line>, HashMap<String, ProcDef>, HashMap<String, FuncDef>)> {
    let mut main = Vec::new();
    let mut procs = HashMap::new();
    let mut funcs = HashMap::new();

    let mut i = 0usize;
    while i < lines.len() {
        let (word, rest) = first_word(&lines[i].text);
        match word.as_str() {
            "PROCEDURE" => {
                let close = find_closer(&lines, i + 1, "PROCEDURE", "ENDPROCEDURE", lines[i].num)?;
                let (name, params, _) = parse_header(rest, lines[i].num, false)?;
                let body = lines[i + 1..close].to_vec();
                procs.insert(name.to_ascii_uppercase(), ProcDef { name, params, body });
                i = close + 1;
            }
            "FUNCTION" => {
                let close = find_closer(&lines, i + 1, "FUNCTION", "ENDFUNCTION", lines[i].num)?;
                let (name, params, ret) = parse_header(rest, lines[i].num, true)?;
                let body = lines[i + 1..close].to_vec();
                funcs.insert(name.to_ascii_uppercase(), FuncDef { name, params, ret, body });
                i = close + 1;
            }
            _ => {
                main.push(lines[i].clone());
                i += 1;
            }
        }
    }
    Ok((main, procs, funcs))
}
