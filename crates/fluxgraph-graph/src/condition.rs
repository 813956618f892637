//! Rule condition grammar: `<signal_path> <op> <number>`.
//!
//! The path charset is `[A-Za-z0-9_./-]`; the operator is one of
//! `< <= > >= == !=`; the number is a decimal with optional sign,
//! fractional part, and exponent. Word spellings such as `inf` or `nan`
//! are not numbers under this grammar.
//!
//! Parsing splits at the first comparator character — the path charset
//! cannot contain one, so the split point is unambiguous.

use fluxgraph_core::{SignalId, SignalStore};

/// A comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparator {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

impl Comparator {
    /// Evaluate `lhs OP rhs`.
    pub fn eval(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
        }
    }

    /// The operator's source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

/// A compiled rule condition: read one signal, compare to a constant.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    /// The signal read each evaluation.
    pub signal: SignalId,
    /// The comparison operator.
    pub op: Comparator,
    /// The right-hand constant.
    pub rhs: f64,
}

impl Condition {
    /// Evaluate against the current store state.
    pub fn eval(&self, store: &SignalStore) -> bool {
        self.op.eval(store.read_value(self.signal), self.rhs)
    }
}

/// A parsed but not yet interned condition.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionExpr {
    /// The signal path on the left-hand side.
    pub path: String,
    /// The comparison operator.
    pub op: Comparator,
    /// The right-hand constant.
    pub rhs: f64,
}

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-')
}

/// Strict decimal number check: optional sign, `\d+.?\d*` or `.\d+`,
/// optional `[eE][+-]?\d+` exponent. Rejects `inf`/`nan` spellings that
/// `f64::from_str` would otherwise accept.
fn is_valid_number(text: &str) -> bool {
    let unsigned = text
        .strip_prefix(['+', '-'])
        .unwrap_or(text);

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
        None => (unsigned, None),
    };

    let mantissa_ok = match mantissa.find('.') {
        Some(idx) => {
            let (int_part, frac_part) = (&mantissa[..idx], &mantissa[idx + 1..]);
            let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
            // Either `\d+.\d*` or `.\d+`.
            (digits(int_part) && frac_part.bytes().all(|b| b.is_ascii_digit()))
                || (int_part.is_empty() && digits(frac_part))
        }
        None => !mantissa.is_empty() && mantissa.bytes().all(|b| b.is_ascii_digit()),
    };

    let exponent_ok = match exponent {
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && exp.bytes().all(|b| b.is_ascii_digit())
        }
        None => true,
    };

    mantissa_ok && exponent_ok
}

/// Parse a condition expression.
///
/// Returns a human-readable reason on failure; the compiler wraps it in
/// [`CompileError::InvalidCondition`](crate::CompileError::InvalidCondition)
/// together with the rule id.
pub fn parse_condition(text: &str) -> Result<ConditionExpr, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("empty condition".to_string());
    }

    let split = trimmed
        .find(['<', '>', '=', '!'])
        .ok_or_else(|| "missing comparison operator".to_string())?;

    let (lhs, rest) = trimmed.split_at(split);

    let (op, rhs_text) = if let Some(rem) = rest.strip_prefix("<=") {
        (Comparator::Le, rem)
    } else if let Some(rem) = rest.strip_prefix(">=") {
        (Comparator::Ge, rem)
    } else if let Some(rem) = rest.strip_prefix("==") {
        (Comparator::Eq, rem)
    } else if let Some(rem) = rest.strip_prefix("!=") {
        (Comparator::Ne, rem)
    } else if let Some(rem) = rest.strip_prefix('<') {
        (Comparator::Lt, rem)
    } else if let Some(rem) = rest.strip_prefix('>') {
        (Comparator::Gt, rem)
    } else {
        return Err(format!("unsupported operator at '{rest}'"));
    };

    let path = lhs.trim_end();
    if path.is_empty() {
        return Err("missing signal path before operator".to_string());
    }
    if !path.chars().all(is_path_char) {
        return Err(format!("invalid character in signal path '{path}'"));
    }

    let number = rhs_text.trim();
    if !is_valid_number(number) {
        return Err(format!("invalid number '{number}'"));
    }
    let rhs: f64 = number
        .parse()
        .map_err(|_| format!("invalid number '{number}'"))?;

    Ok(ConditionExpr {
        path: path.to_string(),
        op,
        rhs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_operators() {
        let cases = [
            ("a/b < 1", Comparator::Lt),
            ("a/b <= 1", Comparator::Le),
            ("a/b > 1", Comparator::Gt),
            ("a/b >= 1", Comparator::Ge),
            ("a/b == 1", Comparator::Eq),
            ("a/b != 1", Comparator::Ne),
        ];
        for (text, op) in cases {
            let expr = parse_condition(text).unwrap();
            assert_eq!(expr.op, op, "for {text:?}");
            assert_eq!(expr.path, "a/b");
            assert_eq!(expr.rhs, 1.0);
        }
    }

    #[test]
    fn whitespace_is_optional() {
        let expr = parse_condition("chamber/temp>100.5").unwrap();
        assert_eq!(expr.path, "chamber/temp");
        assert_eq!(expr.op, Comparator::Gt);
        assert_eq!(expr.rhs, 100.5);

        let expr = parse_condition("  x   <=   -3  ").unwrap();
        assert_eq!(expr.path, "x");
        assert_eq!(expr.rhs, -3.0);
    }

    #[test]
    fn signed_fraction_and_exponent_numbers() {
        assert_eq!(parse_condition("x > -1.5e-3").unwrap().rhs, -1.5e-3);
        assert_eq!(parse_condition("x > +.25").unwrap().rhs, 0.25);
        assert_eq!(parse_condition("x > 2.").unwrap().rhs, 2.0);
        assert_eq!(parse_condition("x > 1E6").unwrap().rhs, 1e6);
    }

    #[test]
    fn path_charset_allows_dots_dashes_slashes() {
        let expr = parse_condition("dev-1/ch.0/out_b > 0").unwrap();
        assert_eq!(expr.path, "dev-1/ch.0/out_b");
    }

    #[test]
    fn rejects_malformed_conditions() {
        for bad in [
            "",
            "no_operator_here",
            "< 5",
            "x <",
            "x < ",
            "x = 5",
            "x ! 5",
            "x < inf",
            "x < nan",
            "x < 1.2.3",
            "x < 1e",
            "x < --3",
            "a b < 3",
            "x < 5 extra",
        ] {
            assert!(
                parse_condition(bad).is_err(),
                "expected parse failure for {bad:?}"
            );
        }
    }

    #[test]
    fn comparator_eval_semantics() {
        assert!(Comparator::Lt.eval(1.0, 2.0));
        assert!(!Comparator::Lt.eval(2.0, 2.0));
        assert!(Comparator::Le.eval(2.0, 2.0));
        assert!(Comparator::Ge.eval(2.0, 2.0));
        assert!(Comparator::Eq.eval(2.0, 2.0));
        assert!(Comparator::Ne.eval(1.0, 2.0));
    }

    #[test]
    fn condition_reads_store() {
        let mut store = SignalStore::new();
        store.write(SignalId(0), 55.0, "").unwrap();
        let cond = Condition {
            signal: SignalId(0),
            op: Comparator::Gt,
            rhs: 50.0,
        };
        assert!(cond.eval(&store));
        store.write(SignalId(0), 45.0, "").unwrap();
        assert!(!cond.eval(&store));
    }
}
