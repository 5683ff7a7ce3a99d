//! Typed values, declared types, and assignment compatibility.
use slate_common::{Result, SlateError, MAX_ARRAY_ELEMS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Integer,
    Real,
    Boolean,
    Char,
    Str,
    Array(Box<Type>),
}

impl Type {
    pub fn parse(name: &str) -> Option<Type> {
        match &*name.trim().to_ascii_uppercase() {
            "INTEGER" => Some(Type::Integer),
            "REAL" => Some(Type::Real),
            "BOOLEAN" => Some(Type::Boolean),
            "CHAR" => Some(Type::Char),
            "STRING" => Some(Type::Str),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Integer => write!(f, "INTEGER"),
            Type::Real => write!(f, "REAL"),
            Type::Boolean => write!(f, "BOOLEAN"),
            Type::Char => write!(f, "CHAR"),
            Type::Str => write!(f, "STRING"),
            Type::Array(elem) => write!(f, "ARRAY OF {}", elem),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Char(char),
    Str(String),
    Array(ArrayVal),
}

impl Value {
    pub fn type_of(&self) -> Type {
        match self {
            Value::Integer(_) => Type::Integer,
            Value::Real(_) => Type::Real,
            Value::Boolean(_) => Type::Boolean,
            Value::Char(_) => Type::Char,
            Value::Str(_) => Type::Str,
            Value::Array(a) => Type::Array(Box::new(a.elem.clone())),
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Char(c) => Some(c.to_string()),
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

pub fn default_value(ty: &Type) -> Value {
    match ty {
        Type::Integer => Value::Integer(0),
        Type::Real => Value::Real(0.0),
        Type::Boolean => Value::Boolean(false),
        Type::Char => Value::Char(' '),
        Type::Str => Value::Str(String::new()),
        Type::Array(elem) => default_value(elem),
    }
}

/// Default stringification: the form OUTPUT uses for everything except a
/// bare Real-typed variable.
pub fn fmt_default(v: &Value) -> String {
    match v {
        Value::Integer(i) => i.to_string(),
        Value::Real(n) => {
            if n.fract() == 0.0 && n.is_finite() {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Value::Boolean(b) => if *b { "TRUE".into() } else { "FALSE".into() },
        Value::Char(c) => c.to_string(),
        Value::Str(s) => s.clone(),
        Value::Array(a) => format!("<{}>", Type::Array(Box::new(a.elem.clone()))),
    }
}

/// Type-aware form for a Real-typed variable: integral values keep a `.0`
/// so `1` round-trips as `1.0`.
pub fn fmt_real_typed(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}.0", n as i64)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayVal {
    pub elem: Type,
    /// (lower, upper) per dimension; 1 or 2 entries.
    pub bounds: Vec<(i64, i64)>,
    pub data: Vec<Value>,
}

impl ArrayVal {
    pub fn new(elem: Type, bounds: Vec<(i64, i64)>, line: u32) -> Result<ArrayVal> {
        let mut total: i64 = 1;
        for &(lo, hi) in &bounds {
            if hi < lo {
                return Err(SlateError::value(
                    line,
                    format!("bad array bounds {}:{} (upper below lower)", lo, hi),
                ));
            }
            total = total.saturating_mul(hi - lo + 1);
        }
        if total > MAX_ARRAY_ELEMS {
            return Err(SlateError::value(
                line,
                format!("array of {} elements exceeds the limit of {}", total, MAX_ARRAY_ELEMS),
            ));
        }
        let data = vec![default_value(&elem); total as usize];
        Ok(ArrayVal { elem, bounds, data })
    }

    pub fn range_text(&self) -> String {
        self.bounds
            .iter()
            .map(|(lo, hi)| format!("{}..{}", lo, hi))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn flat_index(&self, indices: &[i64], line: u32) -> Result<usize> {
        if indices.len() != self.bounds.len() {
            return Err(SlateError::type_err(
                line,
                format!(
                    "{}-dimensional index applied to a {}-dimensional array",
                    indices.len(),
                    self.bounds.len()
                ),
            ));
        }
        let mut flat: usize = 0;
        for (dim, (&ix, &(lo, hi))) in indices.iter().zip(self.bounds.iter()).enumerate() {
            if ix < lo || ix > hi {
                return Err(SlateError::index(
                    line,
                    format!("index {} out of range {} (dimension {})", ix, self.range_text(), dim + 1),
                ));
            }
            let width = (hi - lo + 1) as usize;
            flat = flat * width + (ix - lo) as usize;
        }
        Ok(flat)
    }

    pub fn get(&self, indices: &[i64], line: u32) -> Result<Value> {
        let i = self.flat_index(indices, line)?;
        Ok(self.data[i].clone())
    }

    pub fn set(&mut self, indices: &[i64], v: Value, line: u32) -> Result<()> {
        let i = self.flat_index(indices, line)?;
        self.data[i] = v;
        Ok(())
    }
}

/// True when the raw right-hand text is lexically a Real literal: it parses
/// as a number and is written with a decimal point.
fn is_real_literal(text: &str) -> bool {
    let t = text.trim();
    t.contains('.') && t.parse::<f64>().is_ok()
}

fn is_single_quoted(text: &str) -> bool {
    let t = text.trim();
    t.len() >= 2 && t.starts_with('\'') && t.ends_with('\'')
}

fn is_double_quoted(text: &str) -> bool {
    let t = text.trim();
    t.len() >= 2 && t.starts_with('"') && t.ends_with('"')
}

/// Assignment-compatibility check, applied on every store: DECLARE
/// initialization, assignment, parameter bind, RETURN, array-element write.
/// Returns the value converted to the destination's representation.
///
/// `src_text` is the raw right-hand-side text when the store comes from a
/// source expression; it drives the literal-form rules (a `3.0` literal may
/// not land in an INTEGER, a double-quoted literal may not land in a CHAR,
/// a single-quoted literal may not land in a STRING). `from_input` relaxes
/// the literal rules and turns on the opportunistic INPUT coercion.
pub fn check_assign(
    dest: &Type,
    value: Value,
    src_text: Option<&str>,
    from_input: bool,
    line: u32,
) -> Result<Value> {
    let value = if from_input { coerce_input(dest, value) } else { value };

    match dest {
        Type::Integer => {
            if !from_input {
                if let Some(t) = src_text {
                    if is_real_literal(t) {
                        return Err(SlateError::type_err(
                            line,
                            format!("cannot store the REAL literal {} in an INTEGER", t.trim()),
                        ));
                    }
                }
            }
            match value {
                Value::Integer(i) => Ok(Value::Integer(i)),
                Value::Real(n) if n.is_finite() && n.fract() == 0.0 => Ok(Value::Integer(n as i64)),
                other => Err(SlateError::type_err(
                    line,
                    format!("expected an INTEGER value, got {}", other.type_of()),
                )),
            }
        }
        Type::Real => match value {
            Value::Integer(i) => Ok(Value::Real(i as f64)),
            Value::Real(n) if n.is_finite() => Ok(Value::Real(n)),
            Value::Real(_) => Err(SlateError::type_err(line, "REAL value is not finite")),
            other => Err(SlateError::type_err(
                line,
                format!("expected a REAL value, got {}", other.type_of()),
            )),
        },
        Type::Boolean => match value {
            Value::Boolean(b) => Ok(Value::Boolean(b)),
            other => Err(SlateError::type_err(
                line,
                format!("expected a BOOLEAN value, got {}", other.type_of()),
            )),
        },
        Type::Char => match value {
            Value::Char(c) => Ok(Value::Char(c)),
            Value::Str(s) => {
                if !from_input {
                    // Double-quoted sources never satisfy CHAR; only
                    // single-quoted literals or Char-typed expressions do.
                    return Err(SlateError::type_err(
                        line,
                        "CHAR requires a single-quoted character, not a STRING",
                    ));
                }
                let mut it = s.chars();
                match (it.next(), it.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(SlateError::type_err(
                        line,
                        format!("CHAR requires exactly one character, got \"{}\"", s),
                    )),
                }
            }
            other => Err(SlateError::type_err(
                line,
                format!("expected a CHAR value, got {}", other.type_of()),
            )),
        },
        Type::Str => {
            if !from_input {
                if let Some(t) = src_text {
                    if is_single_quoted(t) {
                        return Err(SlateError::type_err(
                            line,
                            "STRING literals are written in double quotes",
                        ));
                    }
                }
            }
            match value {
                Value::Str(s) => Ok(Value::Str(s)),
                Value::Char(c) => Ok(Value::Str(c.to_string())),
                other => Err(SlateError::type_err(
                    line,
                    format!("expected a STRING value, got {}", other.type_of()),
                )),
            }
        }
        Type::Array(_) => Err(SlateError::type_err(
            line,
            "cannot assign to an entire array",
        )),
    }
}

// Opportunistic coercion of raw INPUT text toward the destination type;
// failures fall through to the standard check above.
fn coerce_input(dest: &Type, value: Value) -> Value {
    let s = match &value {
        Value::Str(s) => s.clone(),
        _ => return value,
    };
    let t = s.trim();
    match dest {
        Type::Integer | Type::Real => {
            if let Ok(n) = t.parse::<f64>() {
                if n.fract() == 0.0 && !t.contains('.') {
                    return Value::Integer(n as i64);
                }
                return Value::Real(n);
            }
            value
        }
        Type::Boolean => match &*t.to_ascii_uppercase() {
            "TRUE" => Value::Boolean(true),
            "FALSE" => Value::Boolean(false),
            _ => value,
        },
        Type::Char => value, // handled by the CHAR arm (single char accepted)
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_literal_rejected_for_integer_even_when_whole() {
        let e = check_assign(&Type::Integer, Value::Real(3.0), Some("3.0"), false, 1);
        assert!(e.is_err());
        // but a computed whole Real is fine
        let v = check_assign(&Type::Integer, Value::Real(3.0), Some("6/2"), false, 1).unwrap();
        assert_eq!(v, Value::Integer(3));
    }

    #[test]
    fn char_rejects_double_quoted_source() {
        assert!(check_assign(&Type::Char, Value::Str("a".into()), Some("\"a\""), false, 1).is_err());
        assert_eq!(
            check_assign(&Type::Char, Value::Char('a'), Some("'a'"), false, 1).unwrap(),
            Value::Char('a')
        );
    }

    #[test]
    fn string_rejects_single_quoted_source() {
        assert!(check_assign(&Type::Str, Value::Char('a'), Some("'a'"), false, 1).is_err());
        assert_eq!(
            check_assign(&Type::Str, Value::Str("hi".into()), Some("\"hi\""), false, 1).unwrap(),
            Value::Str("hi".into())
        );
    }

    #[test]
    fn input_coercion() {
        assert_eq!(
            check_assign(&Type::Integer, Value::Str("42".into()), None, true, 1).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            check_assign(&Type::Real, Value::Str("2.5".into()), None, true, 1).unwrap(),
            Value::Real(2.5)
        );
        assert_eq!(
            check_assign(&Type::Boolean, Value::Str("true".into()), None, true, 1).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            check_assign(&Type::Char, Value::Str("x".into()), None, true, 1).unwrap(),
            Value::Char('x')
        );
        // non-numeric text into INTEGER still fails
        assert!(check_assign(&Type::Integer, Value::Str("abc".into()), None, true, 1).is_err());
    }

    #[test]
    fn array_bounds_checked_at_construction() {
        assert!(ArrayVal::new(Type::Integer, vec![(3, 1)], 1).is_err());
        assert!(ArrayVal::new(Type::Integer, vec![(1, 2_000_000)], 1).is_err());
        let a = ArrayVal::new(Type::Integer, vec![(1, 3)], 1).unwrap();
        assert_eq!(a.data.len(), 3);
    }

    #[test]
    fn array_get_set_in_and_out_of_range() {
        let mut a = ArrayVal::new(Type::Integer, vec![(1, 3)], 1).unwrap();
        for i in 1..=3 {
            a.set(&[i], Value::Integer(i * 10), 1).unwrap();
            assert_eq!(a.get(&[i], 1).unwrap(), Value::Integer(i * 10));
        }
        assert!(a.get(&[0], 1).is_err());
        assert!(a.get(&[4], 1).is_err());
        // dimension mismatch is a TypeError, not an IndexError
        let e = a.get(&[1, 1], 1).unwrap_err();
        assert_eq!(e.kind(), Some(slate_common::ErrorKind::Type));
    }

    #[test]
    fn two_dimensional_layout() {
        let mut a = ArrayVal::new(Type::Integer, vec![(1, 2), (1, 3)], 1).unwrap();
        a.set(&[2, 3], Value::Integer(7), 1).unwrap();
        assert_eq!(a.get(&[2, 3], 1).unwrap(), Value::Integer(7));
        assert_eq!(a.get(&[1, 1], 1).unwrap(), Value::Integer(0));
    }

    #[test]
    fn real_formatting_round_trip() {
        assert_eq!(fmt_real_typed(1.0), "1.0");
        assert_eq!(fmt_real_typed(1.0).parse::<f64>().unwrap(), 1.0);
        assert_eq!(fmt_real_typed(2.5), "2.5");
        assert_eq!(fmt_default(&Value::Real(3.0)), "3");
        assert_eq!(fmt_default(&Value::Boolean(true)), "TRUE");
    }
}
