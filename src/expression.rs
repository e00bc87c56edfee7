// src/expression.rs
use crate::context::EvalContext;
use crate::errors::{FormulaError, Result};
use crate::functions::Registry;
use crate::parser::{ParseError, Parser};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// Bare wildcard name, resolved against the context at evaluation time.
    Variable(String),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

pub type EParseErr = ParseError;

/// Parse one expression body into an AST. Grammar:
///
/// ```text
/// expr    := term (('+' | '-') term)*
/// term    := unary (('*' | '/') unary)*
/// unary   := ('-' | '+') unary | power
/// power   := primary ('^' unary)?          // right-associative
/// primary := number | name ('(' expr (',' expr)* ')')? | '(' expr ')'
/// ```
pub fn parse_expr(input: &str) -> std::result::Result<Expr, EParseErr> {
    if input.is_empty() {
        return Err(EParseErr::InvalidSyntax("empty expression".into()));
    }
    let mut p = EParser::new(input);
    let node = p.parse_sum()?;
    if !p.eof() {
        return Err(EParseErr::InvalidSyntax(format!(
            "unexpected character '{}'",
            p.peek().unwrap_or(' ')
        )));
    }
    Ok(node)
}

struct EParser<'a> {
    parser: Parser<'a>,
}

impl<'a> EParser<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            parser: Parser::new(s),
        }
    }

    fn parse_sum(&mut self) -> std::result::Result<Expr, EParseErr> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = if self.parser.consume_char('+') {
                BinOp::Add
            } else if self.parser.consume_char('-') {
                BinOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_term()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_term(&mut self) -> std::result::Result<Expr, EParseErr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = if self.parser.consume_char('*') {
                BinOp::Mul
            } else if self.parser.consume_char('/') {
                BinOp::Div
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> std::result::Result<Expr, EParseErr> {
        if self.parser.consume_char('-') {
            return Ok(Expr::Neg(Box::new(self.parse_unary()?)));
        }
        if self.parser.consume_char('+') {
            return self.parse_unary();
        }
        self.parse_power()
    }

    // Exponentiation binds tighter than unary minus ("-2^2" is "-(2^2)") and
    // is right-associative; the exponent may itself carry a sign.
    fn parse_power(&mut self) -> std::result::Result<Expr, EParseErr> {
        let base = self.parse_primary()?;
        if self.parser.consume_char('^') {
            let exp = self.parse_unary()?;
            return Ok(binary(BinOp::Pow, base, exp));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> std::result::Result<Expr, EParseErr> {
        match self.peek() {
            None => Err(EParseErr::InvalidSyntax(
                "missing operand (expression ends with an operator)".into(),
            )),
            Some('(') => {
                self.parser.expect('(')?;
                let inner = self.parse_sum()?;
                self.parser
                    .expect(')')
                    .map_err(|_| EParseErr::InvalidSyntax("mismatched parentheses".into()))?;
                Ok(inner)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => {
                Ok(Expr::Number(self.parser.parse_number()?))
            }
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {
                let name = self.parser.parse_identifier()?;
                if !self.parser.consume_char('(') {
                    return Ok(Expr::Variable(name));
                }
                let args = self.parse_args()?;
                self.parser
                    .expect(')')
                    .map_err(|_| EParseErr::InvalidSyntax("mismatched parentheses".into()))?;
                Ok(Expr::Call { name, args })
            }
            Some(c) if is_operator_char(c) => Err(EParseErr::InvalidSyntax(format!(
                "misplaced operator '{c}'"
            ))),
            Some(c) => Err(EParseErr::InvalidSyntax(format!(
                "unexpected character '{c}'"
            ))),
        }
    }

    fn parse_args(&mut self) -> std::result::Result<Vec<Expr>, EParseErr> {
        let mut out = Vec::new();
        if self.peek() == Some(')') {
            return Ok(out);
        }
        loop {
            out.push(self.parse_sum()?);
            if !self.parser.consume_char(',') {
                return Ok(out);
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.parser.peek_char()
    }

    fn eof(&self) -> bool {
        self.parser.eof()
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '^' | ',')
}

/// Static admissibility check of a parsed expression: allow-listed function
/// names with acceptable arity, and (when `allowed` is given) wildcard names
/// drawn from that set. A division by the literal `0` is caught here too.
/// Never evaluates anything.
pub fn validate_ast(
    raw: &str,
    node: &Expr,
    registry: &Registry,
    allowed: Option<&BTreeSet<String>>,
) -> Result<()> {
    match node {
        Expr::Number(_) => Ok(()),
        Expr::Variable(name) => match allowed {
            Some(set) if !set.contains(name) => Err(FormulaError::invalid(
                raw,
                format!("unknown wildcard '{name}'"),
            )),
            _ => Ok(()),
        },
        Expr::Neg(inner) => validate_ast(raw, inner, registry, allowed),
        Expr::Binary { op, lhs, rhs } => {
            validate_ast(raw, lhs, registry, allowed)?;
            validate_ast(raw, rhs, registry, allowed)?;
            if *op == BinOp::Div && matches!(**rhs, Expr::Number(n) if n == 0.0) {
                return Err(FormulaError::DivisionByZero);
            }
            Ok(())
        }
        Expr::Call { name, args } => {
            let f = registry
                .get(name)
                .ok_or_else(|| FormulaError::invalid(raw, format!("unknown function '{name}'")))?;
            if !f.arity().contains(&args.len()) {
                return Err(FormulaError::invalid(
                    raw,
                    format!("wrong number of arguments for '{name}'"),
                ));
            }
            for arg in args {
                validate_ast(raw, arg, registry, allowed)?;
            }
            Ok(())
        }
    }
}

/// Evaluate AST node → f64 against an immutable context.
pub fn eval_ast(node: &Expr, ctx: &EvalContext, registry: &Registry) -> Result<f64> {
    match node {
        Expr::Number(n) => Ok(*n),
        Expr::Variable(name) => ctx
            .get(name)
            .ok_or_else(|| FormulaError::UnboundVariable(name.clone())),
        Expr::Neg(inner) => Ok(-eval_ast(inner, ctx, registry)?),
        Expr::Binary { op, lhs, rhs } => {
            let l = eval_ast(lhs, ctx, registry)?;
            let r = eval_ast(rhs, ctx, registry)?;
            match op {
                BinOp::Add => Ok(l + r),
                BinOp::Sub => Ok(l - r),
                BinOp::Mul => Ok(l * r),
                BinOp::Div => {
                    if r == 0.0 {
                        Err(FormulaError::DivisionByZero)
                    } else {
                        Ok(l / r)
                    }
                }
                BinOp::Pow => {
                    if l == 0.0 && r < 0.0 {
                        Err(FormulaError::DivisionByZero)
                    } else {
                        Ok(l.powf(r))
                    }
                }
            }
        }
        Expr::Call { name, args } => {
            let f = registry
                .get(name)
                .ok_or_else(|| FormulaError::invalid(name.clone(), "unknown function"))?;
            if !f.arity().contains(&args.len()) {
                return Err(FormulaError::invalid(
                    name.clone(),
                    format!("wrong number of arguments for '{name}'"),
                ));
            }
            let values = args
                .iter()
                .map(|a| eval_ast(a, ctx, registry))
                .collect::<Result<Vec<f64>>>()?;
            f.call(&values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn eval(src: &str) -> Result<f64> {
        let node = parse_expr(src).map_err(|e| FormulaError::invalid(src, format!("{e:?}")))?;
        eval_ast(&node, &EvalContext::new(), &Registry::with_builtins())
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval("2+3*4").unwrap(), 14.0);
        assert_eq!(eval("(2+3)*4").unwrap(), 20.0);
        assert_eq!(eval("2^3^2").unwrap(), 512.0); // right-assoc
        assert_eq!(eval("10-4-3").unwrap(), 3.0); // left-assoc
        assert_eq!(eval("-2^2").unwrap(), -4.0);
        assert_eq!(eval("2^-1").unwrap(), 0.5);
    }

    #[test]
    fn unary_signs() {
        assert_eq!(eval("-3+5").unwrap(), 2.0);
        assert_eq!(eval("2*-3").unwrap(), -6.0);
        assert_eq!(eval("+4").unwrap(), 4.0);
        assert_eq!(eval("--4").unwrap(), 4.0);
    }

    #[test]
    fn variables_resolve_from_context() {
        let node = parse_expr("x*y+1").unwrap();
        let ctx: EvalContext = [("x", 3.0), ("y", 4.0)].into_iter().collect();
        assert_eq!(
            eval_ast(&node, &ctx, &Registry::with_builtins()).unwrap(),
            13.0
        );
    }

    #[test]
    fn unbound_variable() {
        let node = parse_expr("x+1").unwrap();
        let err = eval_ast(&node, &EvalContext::new(), &Registry::with_builtins()).unwrap_err();
        assert_eq!(err, FormulaError::UnboundVariable("x".into()));
    }

    #[test]
    fn division_by_zero_at_eval() {
        assert_eq!(eval("1/0").unwrap_err(), FormulaError::DivisionByZero);
        assert_eq!(eval("1/(2-2)").unwrap_err(), FormulaError::DivisionByZero);
        assert_eq!(eval("0^-1").unwrap_err(), FormulaError::DivisionByZero);
    }

    #[test]
    fn static_division_by_literal_zero() {
        let registry = Registry::with_builtins();
        let node = parse_expr("1/0").unwrap();
        assert_eq!(
            validate_ast("1/0", &node, &registry, None).unwrap_err(),
            FormulaError::DivisionByZero
        );
        // A zero that only appears at runtime passes the static check.
        let node = parse_expr("1/(2-2)").unwrap();
        assert!(validate_ast("1/(2-2)", &node, &registry, None).is_ok());
    }

    #[test]
    fn parse_rejections() {
        for bad in ["", "2+", "*2", "(1+2", "1+2)", "2 + 3", "1;2", "2+$x"] {
            assert!(parse_expr(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn wildcard_allow_list() {
        let registry = Registry::with_builtins();
        let node = parse_expr("x+y").unwrap();
        let allowed: BTreeSet<String> = ["x".to_string()].into();
        let err = validate_ast("x+y", &node, &registry, Some(&allowed)).unwrap_err();
        assert_eq!(
            err,
            FormulaError::invalid("x+y", "unknown wildcard 'y'")
        );
        assert!(validate_ast("x+y", &node, &registry, None).is_ok());
    }

    #[test]
    fn unknown_function_rejected_statically() {
        let registry = Registry::with_builtins();
        let node = parse_expr("frob(1)").unwrap();
        let err = validate_ast("frob(1)", &node, &registry, None).unwrap_err();
        assert_eq!(err, FormulaError::invalid("frob(1)", "unknown function 'frob'"));
    }
}
