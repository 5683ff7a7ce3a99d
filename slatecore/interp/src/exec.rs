//! Statement executor: walks one block of matched lines against the scope
//! chain, dispatching on a fixed table of statement forms.
use std::collections::{HashMap, HashSet};
use std::sync::atomic::Ordering;

use slate_ast::Expr;
use slate_common::{Result, SlateError, MAX_LOOP_ITERS};

use crate::blocks::{
    self, find_closer, find_symbol, first_word, match_for, match_if, split_commas, split_word,
    FuncDef, Line, ProcDef,
};
use crate::host::{Event, Host};
use crate::scope::{key, Scopes, RESERVED};
use crate::value::{check_assign, default_value, ArrayVal, Type, Value};

/// How a block finished: fell off the end, or hit RETURN. RETURN carries the
/// evaluated value together with the raw right-hand text so the caller can
/// apply the literal-form assignment rules against a declared return type.
pub(crate) enum Flow {
    Normal,
    Return(Option<(Value, String)>),
}

/// All state owned by one `interpret` call. Nothing here outlives the run,
/// so concurrent runs share no mutable state.
pub(crate) struct Run<'h> {
    pub host: &'h Host,
    pub scopes: Scopes,
    /// Index of the frame statements currently execute against.
    pub frame: usize,
    pub procs: HashMap<String, ProcDef>,
    pub funcs: HashMap<String, FuncDef>,
    /// 1-based source line attached to every diagnostic.
    pub line: u32,
    iters: u64,
    warned_case: HashSet<(String, u32)>,
    warned_reserved: HashSet<String>,
    pub log: Vec<String>,
}

impl<'h> Run<'h> {
    pub fn new(host: &'h Host, procs: HashMap<String, ProcDef>, funcs: HashMap<String, FuncDef>) -> Self {
        Self {
            host,
            scopes: Scopes::new(),
            frame: 0,
            procs,
            funcs,
            line: 0,
            iters: 0,
            warned_case: HashSet::new(),
            warned_reserved: HashSet::new(),
            log: Vec::new(),
        }
    }

    pub fn check_cancel(&self) -> Result<()> {
        if self.host.cancel.load(Ordering::Relaxed) {
            return Err(SlateError::Stopped);
        }
        Ok(())
    }

    fn bump_iters(&mut self) -> Result<()> {
        self.iters += 1;
        if self.iters > MAX_LOOP_ITERS {
            return Err(SlateError::runtime(
                self.line,
                format!("loop iteration limit of {} exceeded", MAX_LOOP_ITERS),
            ));
        }
        Ok(())
    }

    // ---- warnings (deduplicated per run) ----

    pub fn warn_case(&mut self, used: &str) {
        let canonical = match self.scopes.canonical_name(self.frame, used) {
            Some(c) => c.to_string(),
            None => return,
        };
        if canonical == used {
            return;
        }
        let sig = (key(used), self.line);
        if self.warned_case.insert(sig) {
            self.host.send(Event::Warning(format!(
                "Line {}: '{}' does not match the declared spelling '{}'",
                self.line, used, canonical
            )));
        }
    }

    fn warn_reserved(&mut self, name: &str) {
        let k = key(name);
        if RESERVED.contains(k.as_str()) && self.warned_reserved.insert(k) {
            self.host.send(Event::Warning(format!(
                "Line {}: '{}' is also a reserved word",
                self.line, name
            )));
        }
    }

    // ---- block execution ----

    pub fn exec_block(&mut self, lines: &[Line], in_func: bool) -> Result<Flow> {
        let mut i = 0usize;
        while i < lines.len() {
            self.check_cancel()?;
            self.line = lines[i].num;
            let text = lines[i].text.as_str();
            let (word, rest) = first_word(text);

            match word.as_str() {
                "DECLARE" => {
                    self.st_declare(rest)?;
                    i += 1;
                }
                "CONSTANT" => {
                    self.st_constant(rest)?;
                    i += 1;
                }
                "CALL" => {
                    self.st_call(rest)?;
                    i += 1;
                }
                "INPUT" => {
                    self.st_input(rest)?;
                    i += 1;
                }
                "OUTPUT" => {
                    self.st_output(rest)?;
                    i += 1;
                }
                "IF" => {
                    let blk = match_if(lines, i)?;
                    let cond = self.eval_condition(&blk.cond, "IF")?;
                    let flow = if cond {
                        self.exec_block(&blk.then_body, in_func)?
                    } else {
                        self.exec_block(&blk.else_body, in_func)?
                    };
                    if let Flow::Return(v) = flow {
                        return Ok(Flow::Return(v));
                    }
                    i = blk.next;
                }
                "CASE" => {
                    let next = self.st_case(lines, i, rest, in_func)?;
                    match next {
                        CaseOutcome::Continue(n) => i = n,
                        CaseOutcome::Returned(v) => return Ok(Flow::Return(v)),
                    }
                }
                "FOR" => {
                    let next = match self.st_for(lines, i, rest, in_func)? {
                        LoopOutcome::Continue(n) => n,
                        LoopOutcome::Returned(v) => return Ok(Flow::Return(v)),
                    };
                    i = next;
                }
                "WHILE" => {
                    let next = match self.st_while(lines, i, rest, in_func)? {
                        LoopOutcome::Continue(n) => n,
                        LoopOutcome::Returned(v) => return Ok(Flow::Return(v)),
                    };
                    i = next;
                }
                "REPEAT" => {
                    let next = match self.st_repeat(lines, i, in_func)? {
                        LoopOutcome::Continue(n) => n,
                        LoopOutcome::Returned(v) => return Ok(Flow::Return(v)),
                    };
                    i = next;
                }
                "RETURN" => {
                    if !in_func {
                        return Err(SlateError::syntax(self.line, "RETURN outside a FUNCTION"));
                    }
                    if rest.trim().is_empty() {
                        return Ok(Flow::Return(None));
                    }
                    let v = self.eval_return_list(rest)?;
                    return Ok(Flow::Return(Some((v, rest.trim().to_string()))));
                }
                "THEN" | "ELSE" | "ENDIF" | "OTHERWISE" | "ENDCASE" | "NEXT" | "ENDWHILE"
                | "UNTIL" | "ENDPROCEDURE" | "ENDFUNCTION" | "PROCEDURE" | "FUNCTION" => {
                    return Err(SlateError::syntax(
                        self.line,
                        format!("unexpected {} here", word),
                    ));
                }
                _ => {
                    self.st_assign_or_error(text)?;
                    i += 1;
                }
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_condition(&mut self, cond: &str, who: &str) -> Result<bool> {
        match self.eval_text(cond)? {
            Value::Boolean(b) => Ok(b),
            other => Err(SlateError::type_err(
                self.line,
                format!("{} condition must be a BOOLEAN, got {}", who, other.type_of()),
            )),
        }
    }

    // ---- DECLARE / CONSTANT ----

    fn st_declare(&mut self, rest: &str) -> Result<()> {
        let colon = find_symbol(rest, ":").ok_or_else(|| {
            SlateError::syntax(self.line, "DECLARE needs 'name : TYPE'")
        })?;
        let names_text = &rest[..colon];
        let ty_text = rest[colon + 1..].trim();

        let names: Vec<String> = split_commas(names_text)
            .into_iter()
            .map(|n| n.trim().to_string())
            .collect();
        for n in &names {
            if !is_ident(n) {
                return Err(SlateError::syntax(self.line, format!("bad variable name '{}'", n)));
            }
        }

        if ty_text.to_ascii_uppercase().starts_with("ARRAY") {
            let (bounds, elem) = self.parse_array_type(ty_text)?;
            for n in &names {
                self.warn_reserved(n);
                self.note_redeclare(n);
                let arr = ArrayVal::new(elem.clone(), bounds.clone(), self.line)?;
                // array storage is usable immediately; elements hold defaults
                self.scopes.declare(
                    self.frame,
                    n,
                    Type::Array(Box::new(elem.clone())),
                    Value::Array(arr),
                    true,
                    false,
                );
            }
            return Ok(());
        }

        let ty = Type::parse(ty_text)
            .ok_or_else(|| SlateError::syntax(self.line, format!("unknown type '{}'", ty_text)))?;
        for n in &names {
            self.warn_reserved(n);
            self.note_redeclare(n);
            self.scopes
                .declare(self.frame, n, ty.clone(), default_value(&ty), false, false);
        }
        Ok(())
    }

    // A same-scope redeclaration under different case references the same
    // binding; surface that as a case warning rather than a new variable.
    fn note_redeclare(&mut self, name: &str) {
        if self.scopes.declaring_frame(self.frame, name) == Some(self.frame) {
            self.warn_case(name);
        }
    }

    /// `ARRAY[lo:hi] OF TYPE` or `ARRAY[l1:u1, l2:u2] OF TYPE`; bound
    /// expressions are evaluated once, here.
    fn parse_array_type(&mut self, ty_text: &str) -> Result<(Vec<(i64, i64)>, Type)> {
        let open = ty_text
            .find('[')
            .ok_or_else(|| SlateError::syntax(self.line, "ARRAY needs '[bounds]'"))?;
        let close = ty_text
            .rfind(']')
            .ok_or_else(|| SlateError::syntax(self.line, "ARRAY bounds missing ']'"))?;
        let bounds_text = &ty_text[open + 1..close];
        let after = &ty_text[close + 1..];

        let elem_text = match split_word(after, "OF") {
            Some((before, elem)) if before.trim().is_empty() => elem.trim(),
            _ => return Err(SlateError::syntax(self.line, "ARRAY needs 'OF TYPE'")),
        };
        let elem = Type::parse(elem_text).ok_or_else(|| {
            SlateError::syntax(self.line, format!("unknown element type '{}'", elem_text))
        })?;

        let dims = split_commas(bounds_text);
        if dims.is_empty() || dims.len() > 2 {
            return Err(SlateError::syntax(self.line, "arrays have one or two dimensions"));
        }
        let mut bounds = Vec::new();
        for dim in dims {
            let colon = find_symbol(dim, ":").ok_or_else(|| {
                SlateError::syntax(self.line, "array bounds are written 'lower:upper'")
            })?;
            let lo = self.eval_bound(&dim[..colon])?;
            let hi = self.eval_bound(&dim[colon + 1..])?;
            bounds.push((lo, hi));
        }
        Ok((bounds, elem))
    }

    fn eval_bound(&mut self, text: &str) -> Result<i64> {
        match self.eval_text(text)? {
            Value::Integer(i) => Ok(i),
            other => Err(SlateError::type_err(
                self.line,
                format!("array bound must be an INTEGER, got {}", other.type_of()),
            )),
        }
    }

    fn st_constant(&mut self, rest: &str) -> Result<()> {
        let split = find_symbol(rest, "<-")
            .map(|p| (p, 2))
            .or_else(|| find_symbol(rest, "=").map(|p| (p, 1)))
            .ok_or_else(|| SlateError::syntax(self.line, "CONSTANT needs 'name = literal'"))?;
        let name = rest[..split.0].trim();
        let lit_text = rest[split.0 + split.1..].trim();
        if !is_ident(name) {
            return Err(SlateError::syntax(self.line, format!("bad constant name '{}'", name)));
        }
        let value = literal_value(lit_text).ok_or_else(|| {
            SlateError::type_err(
                self.line,
                format!("CONSTANT requires a literal value, not '{}'", lit_text),
            )
        })?;
        self.warn_reserved(name);
        self.note_redeclare(name);
        let ty = value.type_of();
        self.scopes.declare(self.frame, name, ty, value, true, true);
        Ok(())
    }

    // ---- INPUT / OUTPUT ----

    fn st_input(&mut self, rest: &str) -> Result<()> {
        let target = slate_parser::parse(rest, self.line)?;
        // Request one line from the host and block until it arrives.
        self.host.send(Event::InputRequest);
        let text = self.host.input.recv().map_err(|_| SlateError::Stopped)?;
        let raw = Value::Str(text.trim_end_matches(['\r', '\n']).to_string());

        match target {
            Expr::Ident(name) => {
                let line = self.line;
                self.warn_case(&name);
                let ty = match self.scopes.get(self.frame, &name) {
                    Some(b) => b.ty.clone(),
                    None => {
                        return Err(SlateError::name(line, format!("'{}' is not defined", name)))
                    }
                };
                let checked = check_assign(&ty, raw, None, true, line)?;
                let b = self.scopes.get_mut(self.frame, &name).unwrap();
                b.value = checked;
                b.initialized = true;
                Ok(())
            }
            Expr::Index { name, indices } => {
                let idx = self.eval_indices(&indices)?;
                self.store_element(&name, &idx, raw, None, true)
            }
            _ => Err(SlateError::syntax(self.line, "INPUT needs a variable")),
        }
    }

    fn st_output(&mut self, rest: &str) -> Result<()> {
        let text = rest.trim();
        let out = if text.is_empty() {
            String::new()
        } else {
            let args = slate_parser::parse_list(text, self.line)?;
            let mut s = String::new();
            for arg in &args {
                s.push_str(&self.format_output_arg(arg)?);
            }
            s
        };
        self.log.push(out.clone());
        self.host.send(Event::Output(out));
        Ok(())
    }

    // ---- CALL ----

    fn st_call(&mut self, rest: &str) -> Result<()> {
        let (name, args) = match slate_parser::parse(rest, self.line)? {
            Expr::Ident(name) => (name, Vec::new()),
            Expr::Call { name, args } => (name, args),
            _ => return Err(SlateError::syntax(self.line, "CALL needs a procedure name")),
        };
        let def = match self.procs.get(&key(&name)) {
            Some(d) => d.clone(),
            None => {
                if self.funcs.contains_key(&key(&name)) {
                    return Err(SlateError::type_err(
                        self.line,
                        format!("'{}' is a FUNCTION; call it inside an expression", name),
                    ));
                }
                return Err(SlateError::name(
                    self.line,
                    format!("PROCEDURE '{}' is not defined", name),
                ));
            }
        };
        if args.len() != def.params.len() {
            return Err(SlateError::type_err(
                self.line,
                format!(
                    "{} takes {} argument{}, got {}",
                    def.name,
                    def.params.len(),
                    if def.params.len() == 1 { "" } else { "s" },
                    args.len()
                ),
            ));
        }
        let mut bound = Vec::with_capacity(args.len());
        for a in &args {
            bound.push((self.eval(a)?, literal_text(a)));
        }

        // Procedures run in a fresh frame chained to global, never the caller.
        let caller = self.frame;
        let frame = self.scopes.push_frame(0);
        self.frame = frame;
        let result = self.bind_params_and_exec(&def.params, bound, &def.body, false);
        self.frame = caller;
        self.scopes.drop_from(frame);
        result.map(|_| ())
    }

    /// Each argument arrives as its evaluated value plus, when the call site
    /// wrote a literal, the literal's source text — so parameter binding
    /// applies the same literal-form rules as a plain assignment.
    pub(crate) fn bind_params_and_exec(
        &mut self,
        params: &[blocks::Param],
        args: Vec<(Value, Option<String>)>,
        body: &[Line],
        in_func: bool,
    ) -> Result<Flow> {
        for (p, (v, src)) in params.iter().zip(args) {
            let v = match &p.ty {
                Some(ty) => check_assign(ty, v, src.as_deref(), false, self.line)?,
                None => v,
            };
            let ty = match &p.ty {
                Some(t) => t.clone(),
                None => v.type_of(),
            };
            self.scopes.declare(self.frame, &p.name, ty, v, true, false);
        }
        self.exec_block(body, in_func)
    }

    // ---- control flow ----

    fn st_case(&mut self, lines: &[Line], at: usize, rest: &str, in_func: bool) -> Result<CaseOutcome> {
        // `CASE OF x` is the canonical form; `CASE x OF` is accepted too.
        let subject_text = match split_word(rest, "OF") {
            Some((before, after)) if before.trim().is_empty() && !after.trim().is_empty() => {
                after.trim()
            }
            Some((before, after)) if after.trim().is_empty() && !before.trim().is_empty() => {
                before.trim()
            }
            _ => return Err(SlateError::syntax(self.line, "expected CASE OF <expression>")),
        };
        let subject = self.eval_text(subject_text)?;
        let close = find_closer(lines, at + 1, "CASE", "ENDCASE", lines[at].num)?;

        let mut otherwise: Option<Line> = None;
        let mut chosen: Option<Line> = None;
        for arm in &lines[at + 1..close] {
            self.line = arm.num;
            let (label_text, stmt_text) = match find_symbol(&arm.text, ":") {
                Some(p) => (arm.text[..p].trim().to_string(), arm.text[p + 1..].trim().to_string()),
                None => {
                    let (w, r) = first_word(&arm.text);
                    if w == "OTHERWISE" {
                        ("OTHERWISE".to_string(), r.trim().to_string())
                    } else {
                        return Err(SlateError::syntax(
                            arm.num,
                            "CASE arm must be 'value : statement'",
                        ));
                    }
                }
            };
            if label_text.eq_ignore_ascii_case("OTHERWISE") {
                if otherwise.is_none() {
                    otherwise = Some(Line { num: arm.num, text: stmt_text });
                }
                continue;
            }
            if chosen.is_some() {
                continue; // first matching arm wins; later labels are not evaluated
            }
            let label = self.eval_text(&label_text)?;
            if crate::eval::values_equal(&subject, &label, arm.num)? {
                chosen = Some(Line { num: arm.num, text: stmt_text });
            }
        }

        let arm = chosen.or(otherwise);
        if let Some(stmt) = arm {
            if !stmt.text.is_empty() {
                match self.exec_block(std::slice::from_ref(&stmt), in_func)? {
                    Flow::Return(v) => return Ok(CaseOutcome::Returned(v)),
                    Flow::Normal => {}
                }
            }
        }
        Ok(CaseOutcome::Continue(close + 1))
    }

    fn st_for(&mut self, lines: &[Line], at: usize, rest: &str, in_func: bool) -> Result<LoopOutcome> {
        let arrow = find_symbol(rest, "<-")
            .ok_or_else(|| SlateError::syntax(self.line, "FOR needs 'variable <- start TO end'"))?;
        let var = rest[..arrow].trim().to_string();
        if !is_ident(&var) {
            return Err(SlateError::syntax(self.line, format!("bad loop variable '{}'", var)));
        }
        let after = &rest[arrow + 2..];
        let (start_text, tail) = split_word(after, "TO")
            .ok_or_else(|| SlateError::syntax(self.line, "FOR needs 'TO <end>'"))?;
        let (end_text, step_text) = match split_word(tail, "STEP") {
            Some((e, s)) => (e, Some(s)),
            None => (tail, None),
        };

        let start = self.eval_for_part(start_text, "start")?;
        let end = self.eval_for_part(end_text, "end")?;
        let step = match step_text {
            Some(s) => self.eval_for_part(s, "STEP")?,
            None => 1,
        };
        if step == 0 {
            return Err(SlateError::value(self.line, "FOR STEP must not be zero"));
        }

        // The loop variable is an INTEGER; auto-declare on first use.
        match self.scopes.get(self.frame, &var) {
            Some(b) => {
                if b.constant {
                    return Err(SlateError::type_err(
                        self.line,
                        format!("cannot use CONSTANT '{}' as a loop variable", var),
                    ));
                }
                if b.ty != Type::Integer {
                    return Err(SlateError::type_err(
                        self.line,
                        format!("FOR variable '{}' must be an INTEGER", var),
                    ));
                }
                self.warn_case(&var);
            }
            None => {
                self.warn_reserved(&var);
                self.scopes
                    .declare(self.frame, &var, Type::Integer, Value::Integer(start), false, false);
            }
        }

        let header_line = lines[at].num;
        let (body, next) = match_for(lines, at, &var)?;

        let mut v = start;
        loop {
            let done = if step > 0 { v > end } else { v < end };
            if done {
                break;
            }
            self.line = header_line;
            self.check_cancel()?;
            self.bump_iters()?;
            {
                let b = self.scopes.get_mut(self.frame, &var).unwrap();
                b.value = Value::Integer(v);
                b.initialized = true;
            }
            match self.exec_block(&body, in_func)? {
                Flow::Return(r) => return Ok(LoopOutcome::Returned(r)),
                Flow::Normal => {}
            }
            // an increment past the i64 range can only leave the end bound
            v = match v.checked_add(step) {
                Some(n) => n,
                None => break,
            };
        }
        Ok(LoopOutcome::Continue(next))
    }

    fn eval_for_part(&mut self, text: &str, part: &str) -> Result<i64> {
        match self.eval_text(text)? {
            Value::Integer(i) => Ok(i),
            other => Err(SlateError::type_err(
                self.line,
                format!("FOR {} must be an INTEGER, got {}", part, other.type_of()),
            )),
        }
    }

    fn st_while(&mut self, lines: &[Line], at: usize, rest: &str, in_func: bool) -> Result<LoopOutcome> {
        let mut cond = rest.trim();
        // optional trailing DO on the header
        if let Some((before, after)) = split_word(cond, "DO") {
            if after.trim().is_empty() {
                cond = before.trim();
            }
        }
        let header_line = lines[at].num;
        let close = find_closer(lines, at + 1, "WHILE", "ENDWHILE", header_line)?;
        let body = &lines[at + 1..close];

        loop {
            self.line = header_line;
            self.check_cancel()?;
            if !self.eval_condition(cond, "WHILE")? {
                break;
            }
            self.bump_iters()?;
            match self.exec_block(body, in_func)? {
                Flow::Return(r) => return Ok(LoopOutcome::Returned(r)),
                Flow::Normal => {}
            }
        }
        Ok(LoopOutcome::Continue(close + 1))
    }

    fn st_repeat(&mut self, lines: &[Line], at: usize, in_func: bool) -> Result<LoopOutcome> {
        let header_line = lines[at].num;
        let close = find_closer(lines, at + 1, "REPEAT", "UNTIL", header_line)?;
        let body = &lines[at + 1..close];
        let (_, cond) = first_word(&lines[close].text);
        if cond.trim().is_empty() {
            return Err(SlateError::syntax(lines[close].num, "UNTIL needs a condition"));
        }

        loop {
            self.check_cancel()?;
            self.bump_iters()?;
            match self.exec_block(body, in_func)? {
                Flow::Return(r) => return Ok(LoopOutcome::Returned(r)),
                Flow::Normal => {}
            }
            self.line = lines[close].num;
            if self.eval_condition(cond, "UNTIL")? {
                break;
            }
        }
        Ok(LoopOutcome::Continue(close + 1))
    }

    fn eval_return_list(&mut self, rest: &str) -> Result<Value> {
        let args = slate_parser::parse_list(rest, self.line)?;
        if args.len() == 1 {
            return self.eval(&args[0]);
        }
        // multiple comma-joined values concatenate as strings
        let mut s = String::new();
        for a in &args {
            let v = self.eval(a)?;
            s.push_str(&crate::value::fmt_default(&v));
        }
        Ok(Value::Str(s))
    }

    // ---- assignment ----

    fn st_assign_or_error(&mut self, text: &str) -> Result<()> {
        if let Some(p) = find_symbol(text, "<-") {
            let lhs = text[..p].trim();
            let rhs = text[p + 2..].trim();
            return self.st_assign(lhs, rhs);
        }
        // `x = expr` is the classic slip; offer the corrected form.
        if let Some(p) = find_symbol(text, "=") {
            let lhs = text[..p].trim();
            if lvalue_shaped(lhs) {
                return Err(SlateError::syntax(
                    self.line,
                    format!(
                        "'=' compares; to assign write: {} <- {}",
                        lhs,
                        text[p + 1..].trim()
                    ),
                ));
            }
        }
        Err(SlateError::syntax(
            self.line,
            format!("unrecognized statement: {}", text),
        ))
    }

    fn st_assign(&mut self, lhs: &str, rhs: &str) -> Result<()> {
        let target = slate_parser::parse(lhs, self.line)?;
        let value = self.eval_text(rhs)?;
        match target {
            Expr::Ident(name) => {
                let line = self.line;
                self.warn_case(&name);
                let (ty, constant) = match self.scopes.get(self.frame, &name) {
                    Some(b) => (b.ty.clone(), b.constant),
                    None => {
                        return Err(SlateError::name(line, format!("'{}' is not defined", name)))
                    }
                };
                if constant {
                    return Err(SlateError::type_err(
                        line,
                        format!("cannot assign to CONSTANT '{}'", name),
                    ));
                }
                let checked = check_assign(&ty, value, Some(rhs), false, line)?;
                let b = self.scopes.get_mut(self.frame, &name).unwrap();
                b.value = checked;
                b.initialized = true;
                Ok(())
            }
            Expr::Index { name, indices } => {
                let idx = self.eval_indices(&indices)?;
                self.store_element(&name, &idx, value, Some(rhs), false)
            }
            _ => Err(SlateError::syntax(
                self.line,
                "assignment target must be a variable or array element",
            )),
        }
    }

    pub(crate) fn eval_indices(&mut self, indices: &[Expr]) -> Result<Vec<i64>> {
        let mut out = Vec::with_capacity(indices.len());
        for ix in indices {
            let v = self.eval(ix)?;
            out.push(crate::eval::as_index(&v, self.line)?);
        }
        Ok(out)
    }

    fn store_element(
        &mut self,
        name: &str,
        indices: &[i64],
        value: Value,
        src_text: Option<&str>,
        from_input: bool,
    ) -> Result<()> {
        let line = self.line;
        self.warn_case(name);
        let elem = match self.scopes.get(self.frame, name) {
            Some(b) => match &b.ty {
                Type::Array(elem) => (**elem).clone(),
                other => {
                    return Err(SlateError::type_err(
                        line,
                        format!("'{}' is a {}, not an array", name, other),
                    ))
                }
            },
            None => return Err(SlateError::name(line, format!("'{}' is not defined", name))),
        };
        let checked = check_assign(&elem, value, src_text, from_input, line)?;
        let b = self.scopes.get_mut(self.frame, name).unwrap();
        match &mut b.value {
            Value::Array(arr) => arr.set(indices, checked, line),
            _ => Err(SlateError::type_err(line, format!("'{}' is not an array", name))),
        }
    }

    fn format_output_arg(&mut self, arg: &Expr) -> Result<String> {
        let v = self.eval(arg)?;
        // A bare Real-typed variable keeps its `.0` so REALs stay visibly REAL.
        if let Expr::Ident(name) = arg {
            if let Some(b) = self.scopes.get(self.frame, name) {
                if b.ty == Type::Real {
                    if let Value::Real(n) = v {
                        return Ok(crate::value::fmt_real_typed(n));
                    }
                }
            }
        }
        Ok(crate::value::fmt_default(&v))
    }
}

enum LoopOutcome {
    Continue(usize),
    Returned(Option<(Value, String)>),
}

enum CaseOutcome {
    Continue(usize),
    Returned(Option<(Value, String)>),
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The source text of a literal argument, reconstructed in its written form
/// so the literal-form assignment rules can inspect it. Non-literal
/// expressions carry no text.
pub(crate) fn literal_text(e: &Expr) -> Option<String> {
    match e {
        Expr::Number { lexeme, .. } => Some(lexeme.clone()),
        Expr::Str(s) => Some(format!("\"{}\"", s)),
        Expr::Char(c) => Some(format!("'{}'", c)),
        _ => None,
    }
}

// Accepts `name` and `name[...]` shapes without evaluating anything.
fn lvalue_shaped(s: &str) -> bool {
    let t = s.trim();
    if is_ident(t) {
        return true;
    }
    match t.find('[') {
        Some(open) => t.ends_with(']') && is_ident(t[..open].trim()),
        None => false,
    }
}

/// Literal recognizer for CONSTANT: numbers (optionally negative), quoted
/// char/string, TRUE/FALSE. Anything else is not a literal.
fn literal_value(text: &str) -> Option<Value> {
    let t = text.trim();
    match &*t.to_ascii_uppercase() {
        "TRUE" => return Some(Value::Boolean(true)),
        "FALSE" => return Some(Value::Boolean(false)),
        _ => {}
    }
    if t.len() >= 2 && t.starts_with('"') && t.ends_with('"') {
        let inner = &t[1..t.len() - 1];
        if !inner.contains('"') {
            return Some(Value::Str(inner.to_string()));
        }
        return None;
    }
    if t.len() >= 3 && t.starts_with('\'') && t.ends_with('\'') {
        let inner = &t[1..t.len() - 1];
        let mut it = inner.chars();
        if let (Some(c), None) = (it.next(), it.next()) {
            return Some(Value::Char(c));
        }
        return None;
    }
    let digits = t.strip_prefix('-').unwrap_or(t);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        if digits.contains('.') {
            return t.parse::<f64>().ok().map(Value::Real);
        }
        return t.parse::<i64>().ok().map(Value::Integer);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_recognizer() {
        assert_eq!(literal_value("3.14"), Some(Value::Real(3.14)));
        assert_eq!(literal_value("-5"), Some(Value::Integer(-5)));
        assert_eq!(literal_value("\"hi\""), Some(Value::Str("hi".into())));
        assert_eq!(literal_value("'x'"), Some(Value::Char('x')));
        assert_eq!(literal_value("TRUE"), Some(Value::Boolean(true)));
        assert_eq!(literal_value("1 + 2"), None);
        assert_eq!(literal_value("X"), None);
    }

    #[test]
    fn literal_arguments_keep_their_written_form() {
        let num = slate_parser::parse("3.0", 1).unwrap();
        assert_eq!(literal_text(&num), Some("3.0".to_string()));
        let ch = slate_parser::parse("'a'", 1).unwrap();
        assert_eq!(literal_text(&ch), Some("'a'".to_string()));
        let s = slate_parser::parse("\"hi\"", 1).unwrap();
        assert_eq!(literal_text(&s), Some("\"hi\"".to_string()));
        let expr = slate_parser::parse("1 + 2", 1).unwrap();
        assert_eq!(literal_text(&expr), None);
    }

    #[test]
    fn lvalue_shapes() {
        assert!(lvalue_shaped("x"));
        assert!(lvalue_shaped("A[1]"));
        assert!(lvalue_shaped("Grid[i, j]"));
        assert!(!lvalue_shaped("1 + 2"));
        assert!(!lvalue_shaped("f(x)"));
    }
}
