//! Expression evaluation over the parsed AST.
use slate_ast::{BinOp, Expr, UnOp};
use slate_common::{Result, SlateError};

use crate::builtins;
use crate::exec::{Flow, Run};
use crate::scope::key;
use crate::value::{check_assign, fmt_default, Value};

impl<'h> Run<'h> {
    /// Parse and evaluate one expression text at the current line.
    pub(crate) fn eval_text(&mut self, text: &str) -> Result<Value> {
        let expr = slate_parser::parse(text, self.line)?;
        self.eval(&expr)
    }

    pub(crate) fn eval(&mut self, e: &Expr) -> Result<Value> {
        self.check_cancel()?;
        match e {
            Expr::Number { value, lexeme } => {
                if lexeme.contains('.') {
                    Ok(Value::Real(*value))
                } else {
                    Ok(Value::Integer(*value as i64))
                }
            }
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Char(c) => Ok(Value::Char(*c)),
            Expr::Bool(b) => Ok(Value::Boolean(*b)),
            Expr::Ident(name) => self.read_var(name),
            Expr::Unary { op, expr } => {
                let v = self.eval(expr)?;
                match op {
                    UnOp::Neg => match v {
                        Value::Integer(i) => Ok(Value::Integer(-i)),
                        Value::Real(n) => Ok(Value::Real(-n)),
                        other => Err(SlateError::type_err(
                            self.line,
                            format!("cannot negate a {}", other.type_of()),
                        )),
                    },
                    UnOp::Not => match v {
                        Value::Boolean(b) => Ok(Value::Boolean(!b)),
                        other => Err(SlateError::type_err(
                            self.line,
                            format!("NOT requires a BOOLEAN, got {}", other.type_of()),
                        )),
                    },
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                self.binary(*op, l, r)
            }
            Expr::Index { name, indices } => {
                let idx = self.eval_indices(indices)?;
                let line = self.line;
                self.warn_case(name);
                match self.scopes.get(self.frame, name) {
                    Some(b) => match &b.value {
                        Value::Array(arr) => arr.get(&idx, line),
                        _ => Err(SlateError::type_err(
                            line,
                            format!("'{}' is a {}, not an array", name, b.ty),
                        )),
                    },
                    None => Err(SlateError::name(line, format!("'{}' is not defined", name))),
                }
            }
            Expr::Call { name, args } => self.call(name, args),
        }
    }

    fn read_var(&mut self, name: &str) -> Result<Value> {
        let line = self.line;
        self.warn_case(name);
        match self.scopes.get(self.frame, name) {
            Some(b) => {
                if !b.initialized {
                    return Err(SlateError::name(
                        line,
                        format!("'{}' referenced before initialization", name),
                    ));
                }
                Ok(b.value.clone())
            }
            None => Err(SlateError::name(line, format!("'{}' is not defined", name))),
        }
    }

    fn binary(&mut self, op: BinOp, l: Value, r: Value) -> Result<Value> {
        let line = self.line;
        match op {
            BinOp::Concat => Ok(Value::Str(format!("{}{}", fmt_default(&l), fmt_default(&r)))),
            BinOp::And | BinOp::Or => match (l, r) {
                (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(if op == BinOp::And {
                    a && b
                } else {
                    a || b
                })),
                (a, b) => Err(SlateError::type_err(
                    line,
                    format!(
                        "{} requires BOOLEAN operands, got {} and {}",
                        if op == BinOp::And { "AND" } else { "OR" },
                        a.type_of(),
                        b.type_of()
                    ),
                )),
            },
            BinOp::Eq => Ok(Value::Boolean(values_equal(&l, &r, line)?)),
            BinOp::Ne => Ok(Value::Boolean(!values_equal(&l, &r, line)?)),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let ord = compare(&l, &r, line)?;
                Ok(Value::Boolean(match op {
                    BinOp::Lt => ord == std::cmp::Ordering::Less,
                    BinOp::Le => ord != std::cmp::Ordering::Greater,
                    BinOp::Gt => ord == std::cmp::Ordering::Greater,
                    _ => ord != std::cmp::Ordering::Less,
                }))
            }
            BinOp::Add => match (&l, &r) {
                // `+` doubles as concatenation when either side is text
                (Value::Char(_) | Value::Str(_), _) | (_, Value::Char(_) | Value::Str(_)) => {
                    Ok(Value::Str(format!("{}{}", fmt_default(&l), fmt_default(&r))))
                }
                _ => self.arith(op, l, r),
            },
            BinOp::Sub | BinOp::Mul => self.arith(op, l, r),
            BinOp::Div => {
                let (a, b) = both_nums(&l, &r, "/", line)?;
                if b == 0.0 {
                    return Err(SlateError::zero_div(line, "division by zero"));
                }
                Ok(Value::Real(a / b))
            }
            BinOp::IntDiv => builtins::call("DIV", &[l, r], line),
            BinOp::Mod => builtins::call("MOD", &[l, r], line),
            BinOp::Pow => {
                let (a, b) = both_nums(&l, &r, "^", line)?;
                match (l, r) {
                    (Value::Integer(base), Value::Integer(exp)) if exp >= 0 => {
                        match (exp <= u32::MAX as i64)
                            .then(|| base.checked_pow(exp as u32))
                            .flatten()
                        {
                            Some(n) => Ok(Value::Integer(n)),
                            None => Ok(Value::Real(a.powf(b))),
                        }
                    }
                    _ => Ok(Value::Real(a.powf(b))),
                }
            }
        }
    }

    fn arith(&mut self, op: BinOp, l: Value, r: Value) -> Result<Value> {
        let line = self.line;
        let sym = match op {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            _ => "*",
        };
        let (a, b) = both_nums(&l, &r, sym, line)?;
        // two INTEGER operands keep INTEGER; anything else widens to REAL
        if let (Value::Integer(x), Value::Integer(y)) = (&l, &r) {
            let n = match op {
                BinOp::Add => x.checked_add(*y),
                BinOp::Sub => x.checked_sub(*y),
                _ => x.checked_mul(*y),
            };
            if let Some(n) = n {
                return Ok(Value::Integer(n));
            }
        }
        Ok(Value::Real(match op {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            _ => a * b,
        }))
    }

    // ---- calls ----

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<Value> {
        if builtins::is_builtin(name) {
            let mut vals = Vec::with_capacity(args.len());
            for a in args {
                vals.push(self.eval(a)?);
            }
            return builtins::call(name, &vals, self.line);
        }
        let def = match self.funcs.get(&key(name)) {
            Some(d) => d.clone(),
            None => {
                if self.procs.contains_key(&key(name)) {
                    return Err(SlateError::type_err(
                        self.line,
                        format!("'{}' is a PROCEDURE; use CALL {}", name, name),
                    ));
                }
                return Err(SlateError::name(
                    self.line,
                    format!("'{}' is not defined", name),
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
        let mut vals = Vec::with_capacity(args.len());
        for a in args {
            vals.push((self.eval(a)?, crate::exec::literal_text(a)));
        }

        let call_line = self.line;
        let caller = self.frame;
        let frame = self.scopes.push_frame(0);
        self.frame = frame;
        let flow = self.bind_params_and_exec(&def.params, vals, &def.body, true);
        self.frame = caller;
        self.scopes.drop_from(frame);
        self.line = call_line;

        match flow? {
            Flow::Return(Some((v, text))) => match &def.ret {
                Some(ret) => check_assign(ret, v, Some(&text), false, call_line),
                None => Ok(v),
            },
            Flow::Return(None) | Flow::Normal => match &def.ret {
                Some(ret) => Err(SlateError::type_err(
                    call_line,
                    format!("FUNCTION {} ended without returning a {}", def.name, ret),
                )),
                None => Ok(Value::Str("undefined".into())),
            },
        }
    }
}

/// Equality across the scalar types: numbers compare numerically, CHAR and
/// STRING compare textually, BOOLEANs by value. Mixed categories are a
/// TypeError rather than silently unequal.
pub(crate) fn values_equal(l: &Value, r: &Value, line: u32) -> Result<bool> {
    if let (Some(a), Some(b)) = (l.as_num(), r.as_num()) {
        return Ok(a == b);
    }
    if let (Some(a), Some(b)) = (l.as_text(), r.as_text()) {
        return Ok(a == b);
    }
    if let (Value::Boolean(a), Value::Boolean(b)) = (l, r) {
        return Ok(a == b);
    }
    Err(SlateError::type_err(
        line,
        format!("cannot compare {} with {}", l.type_of(), r.type_of()),
    ))
}

fn compare(l: &Value, r: &Value, line: u32) -> Result<std::cmp::Ordering> {
    if let (Some(a), Some(b)) = (l.as_num(), r.as_num()) {
        return a.partial_cmp(&b).ok_or_else(|| {
            SlateError::value(line, "cannot order a non-finite REAL")
        });
    }
    if let (Some(a), Some(b)) = (l.as_text(), r.as_text()) {
        return Ok(a.cmp(&b));
    }
    Err(SlateError::type_err(
        line,
        format!("cannot order {} against {}", l.type_of(), r.type_of()),
    ))
}

fn both_nums(l: &Value, r: &Value, sym: &str, line: u32) -> Result<(f64, f64)> {
    match (l.as_num(), r.as_num()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(SlateError::type_err(
            line,
            format!("'{}' requires numbers, got {} and {}", sym, l.type_of(), r.type_of()),
        )),
    }
}

/// Array subscript: INTEGERs directly, whole REALs by truncation-free
/// conversion. Fractional or non-numeric subscripts are a TypeError.
pub(crate) fn as_index(v: &Value, line: u32) -> Result<i64> {
    match v {
        Value::Integer(i) => Ok(*i),
        Value::Real(n) if n.is_finite() && n.fract() == 0.0 => Ok(*n as i64),
        other => Err(SlateError::type_err(
            line,
            format!("array index must be a whole number, got {}", other.type_of()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_by_category() {
        assert!(values_equal(&Value::Integer(3), &Value::Real(3.0), 1).unwrap());
        assert!(values_equal(&Value::Char('a'), &Value::Str("a".into()), 1).unwrap());
        assert!(!values_equal(&Value::Str("a".into()), &Value::Str("A".into()), 1).unwrap());
        assert!(values_equal(&Value::Integer(1), &Value::Str("1".into()), 1).is_err());
        assert!(values_equal(&Value::Boolean(true), &Value::Integer(1), 1).is_err());
    }

    #[test]
    fn ordering_by_category() {
        assert_eq!(
            compare(&Value::Integer(2), &Value::Real(2.5), 1).unwrap(),
            std::cmp::Ordering::Less
        );
        assert_eq!(
            compare(&Value::Str("apple".into()), &Value::Str("banana".into()), 1).unwrap(),
            std::cmp::Ordering::Less
        );
        assert!(compare(&Value::Boolean(true), &Value::Boolean(false), 1).is_err());
    }

    #[test]
    fn index_conversion() {
        assert_eq!(as_index(&Value::Integer(4), 1).unwrap(), 4);
        assert_eq!(as_index(&Value::Real(4.0), 1).unwrap(), 4);
        assert!(as_index(&Value::Real(4.5), 1).is_err());
        assert!(as_index(&Value::Str("4".into()), 1).is_err());
    }
}
