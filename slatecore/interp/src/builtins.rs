//! Builtin function library. Every builtin validates its argument shape
//! before computing.
use rand::Rng;
use slate_common::{Result, SlateError};

use crate::value::{fmt_default, Value};

pub const NAMES: [&str; 8] = [
    "RANDOM", "ROUND", "LENGTH", "LCASE", "UCASE", "SUBSTRING", "DIV", "MOD",
];

pub fn is_builtin(name: &str) -> bool {
    NAMES.contains(&name.to_ascii_uppercase().as_str())
}

pub fn call(name: &str, args: &[Value], line: u32) -> Result<Value> {
    match &*name.to_ascii_uppercase() {
        "RANDOM" => {
            arity(name, args, 0, line)?;
            Ok(Value::Real(rand::thread_rng().gen::<f64>()))
        }
        "ROUND" => {
            arity(name, args, 2, line)?;
            let x = num(&args[0], "ROUND", line)?;
            let places = int(&args[1], "ROUND", line)?;
            // past 15 places the factor exceeds f64 precision anyway
            if !(0..=15).contains(&places) {
                return Err(SlateError::value(line, "ROUND places must be between 0 and 15"));
            }
            let f = 10f64.powi(places as i32);
            // half-up: .5 always rounds toward positive infinity
            let r = (x * f + 0.5).floor() / f;
            if places == 0 {
                Ok(Value::Integer(r as i64))
            } else {
                Ok(Value::Real(r))
            }
        }
        "LENGTH" => {
            arity(name, args, 1, line)?;
            Ok(Value::Integer(fmt_default(&args[0]).chars().count() as i64))
        }
        "LCASE" => {
            arity(name, args, 1, line)?;
            Ok(Value::Str(fmt_default(&args[0]).to_lowercase()))
        }
        "UCASE" => {
            arity(name, args, 1, line)?;
            Ok(Value::Str(fmt_default(&args[0]).to_uppercase()))
        }
        "SUBSTRING" => {
            arity(name, args, 3, line)?;
            let s = fmt_default(&args[0]);
            let start = int(&args[1], "SUBSTRING", line)?;
            let len = int(&args[2], "SUBSTRING", line)?;
            if start < 1 {
                return Err(SlateError::value(line, "SUBSTRING start must be at least 1"));
            }
            if len < 1 {
                return Err(SlateError::value(line, "SUBSTRING length must be at least 1"));
            }
            let chars: Vec<char> = s.chars().collect();
            let end = match (start - 1).checked_add(len) {
                Some(e) if e <= chars.len() as i64 => e,
                _ => {
                    return Err(SlateError::value(
                        line,
                        format!(
                            "SUBSTRING({}, {}) runs past the end of a {}-character string",
                            start,
                            len,
                            chars.len()
                        ),
                    ))
                }
            };
            Ok(Value::Str(chars[(start - 1) as usize..end as usize].iter().collect()))
        }
        "DIV" => {
            arity(name, args, 2, line)?;
            let a = int(&args[0], "DIV", line)?;
            let b = int(&args[1], "DIV", line)?;
            if b == 0 {
                return Err(SlateError::zero_div(line, "DIV by zero"));
            }
            Ok(Value::Integer(a.div_euclid(b)))
        }
        "MOD" => {
            arity(name, args, 2, line)?;
            let a = int(&args[0], "MOD", line)?;
            let b = int(&args[1], "MOD", line)?;
            if b == 0 {
                return Err(SlateError::zero_div(line, "MOD by zero"));
            }
            // mathematical modulo: result always in [0, |b|)
            Ok(Value::Integer(a.rem_euclid(b)))
        }
        other => Err(SlateError::name(line, format!("'{}' is not defined", other))),
    }
}

fn arity(name: &str, args: &[Value], want: usize, line: u32) -> Result<()> {
    if args.len() != want {
        return Err(SlateError::type_err(
            line,
            format!(
                "{} takes {} argument{}, got {}",
                name.to_ascii_uppercase(),
                want,
                if want == 1 { "" } else { "s" },
                args.len()
            ),
        ));
    }
    Ok(())
}

fn num(v: &Value, who: &str, line: u32) -> Result<f64> {
    v.as_num()
        .ok_or_else(|| SlateError::type_err(line, format!("{} expects a number", who)))
}

fn int(v: &Value, who: &str, line: u32) -> Result<i64> {
    match v {
        Value::Integer(i) => Ok(*i),
        _ => Err(SlateError::type_err(line, format!("{} expects an INTEGER", who))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_common::ErrorKind;

    #[test]
    fn div_mod_euclidean_identity() {
        for a in [-7i64, -1, 0, 1, 7, 23] {
            for b in [-5i64, -2, 2, 5] {
                let d = match call("DIV", &[Value::Integer(a), Value::Integer(b)], 1).unwrap() {
                    Value::Integer(i) => i,
                    other => panic!("DIV returned {:?}", other),
                };
                let m = match call("MOD", &[Value::Integer(a), Value::Integer(b)], 1).unwrap() {
                    Value::Integer(i) => i,
                    other => panic!("MOD returned {:?}", other),
                };
                assert_eq!(b * d + m, a, "identity failed for {} / {}", a, b);
                assert!(m >= 0 && m < b.abs(), "MOD({}, {}) = {}", a, b, m);
            }
        }
    }

    #[test]
    fn div_mod_zero_divisor() {
        let e = call("DIV", &[Value::Integer(5), Value::Integer(0)], 3).unwrap_err();
        assert_eq!(e.kind(), Some(ErrorKind::ZeroDivision));
        let e = call("MOD", &[Value::Integer(5), Value::Integer(0)], 3).unwrap_err();
        assert_eq!(e.kind(), Some(ErrorKind::ZeroDivision));
    }

    #[test]
    fn round_half_up() {
        assert_eq!(call("ROUND", &[Value::Real(2.5), Value::Integer(0)], 1).unwrap(), Value::Integer(3));
        assert_eq!(call("ROUND", &[Value::Real(2.4), Value::Integer(0)], 1).unwrap(), Value::Integer(2));
        assert_eq!(
            call("ROUND", &[Value::Real(1.005e2), Value::Integer(1)], 1).unwrap(),
            Value::Real(100.5)
        );
        assert!(call("ROUND", &[Value::Real(1.0), Value::Integer(-1)], 1).is_err());
        assert!(call("ROUND", &[Value::Real(1.0), Value::Real(1.5)], 1).is_err());
    }

    #[test]
    fn substring_one_based_inclusive() {
        let s = Value::Str("HELLO".into());
        assert_eq!(
            call("SUBSTRING", &[s.clone(), Value::Integer(2), Value::Integer(3)], 1).unwrap(),
            Value::Str("ELL".into())
        );
        assert!(call("SUBSTRING", &[s.clone(), Value::Integer(0), Value::Integer(1)], 1).is_err());
        assert!(call("SUBSTRING", &[s.clone(), Value::Integer(1), Value::Integer(0)], 1).is_err());
        assert!(call("SUBSTRING", &[s, Value::Integer(4), Value::Integer(3)], 1).is_err());
    }

    #[test]
    fn substring_huge_bounds_error_instead_of_wrapping() {
        let s = Value::Str("abc".into());
        let e = call(
            "SUBSTRING",
            &[s, Value::Integer(i64::MAX), Value::Integer(i64::MAX)],
            2,
        )
        .unwrap_err();
        assert_eq!(e.kind(), Some(ErrorKind::Value));
    }

    #[test]
    fn round_places_outside_the_supported_range() {
        let e = call("ROUND", &[Value::Real(1.5), Value::Integer(1_i64 << 32)], 1).unwrap_err();
        assert_eq!(e.kind(), Some(ErrorKind::Value));
        let e = call("ROUND", &[Value::Real(1.5), Value::Integer(16)], 1).unwrap_err();
        assert_eq!(e.kind(), Some(ErrorKind::Value));
    }

    #[test]
    fn case_and_length_stringify_their_argument() {
        assert_eq!(call("LENGTH", &[Value::Integer(1234)], 1).unwrap(), Value::Integer(4));
        assert_eq!(call("UCASE", &[Value::Str("abc".into())], 1).unwrap(), Value::Str("ABC".into()));
        assert_eq!(call("LCASE", &[Value::Char('A')], 1).unwrap(), Value::Str("a".into()));
    }

    #[test]
    fn random_in_unit_interval() {
        for _ in 0..100 {
            match call("RANDOM", &[], 1).unwrap() {
                Value::Real(x) => assert!((0.0..1.0).contains(&x)),
                other => panic!("RANDOM returned {:?}", other),
            }
        }
        assert!(call("RANDOM", &[Value::Integer(1)], 1).is_err());
    }
}
