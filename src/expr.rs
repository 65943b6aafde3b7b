//! Expression grammar, syntax tree and tree-walking evaluator.
//!
//! Text is parsed with the pest grammar in `expr.pest`; operator precedence is
//! resolved by a Pratt parser:
//!
//! ```text
//! lowest   + -        left
//!          * /        left
//!          unary - +
//! highest  ^ **       right      (-x^2 == -(x^2), 2^3^2 == 2^9)
//! ```

use std::sync::LazyLock;

use pest::{
    Parser,
    error::{Error as PestError, ErrorVariant},
    iterators::{Pair, Pairs},
    pratt_parser::{Assoc, Op, PrattParser},
};
use pest_derive::Parser;

use crate::{
    error::{EvalError, ParseError},
    types::Scalar,
};

#[derive(Parser)]
#[grammar = "expr.pest"]
pub struct ExprParser;

static PRATT: LazyLock<PrattParser<Rule>> = LazyLock::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left) | Op::infix(Rule::div, Assoc::Left))
        .op(Op::prefix(Rule::neg) | Op::prefix(Rule::pos))
        .op(Op::infix(Rule::pow, Assoc::Right))
});

/// One of the two free variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Var {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn apply(self, a: Scalar, b: Scalar) -> Result<Scalar, EvalError> {
        Ok(match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => power(a, b)?,
        })
    }
}

/// Syntax tree of a parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Scalar),
    Variable(Var),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Builtin,
        args: Vec<Expr>,
    },
    /// An identifier or function name that is not known. Fails when evaluated.
    Unknown(String),
}

impl Expr {
    /// Evaluates the tree at `(x, y)`.
    ///
    /// Arithmetic follows IEEE semantics (`1/0` is `inf`); only operations with
    /// no real result are reported as errors.
    pub fn eval(&self, x: Scalar, y: Scalar) -> Result<Scalar, EvalError> {
        match self {
            Expr::Literal(v) => Ok(*v),
            Expr::Variable(Var::X) => Ok(x),
            Expr::Variable(Var::Y) => Ok(y),
            Expr::Unary { op, operand } => {
                let v = operand.eval(x, y)?;
                Ok(match op {
                    UnaryOp::Neg => -v,
                    UnaryOp::Plus => v,
                })
            }
            Expr::Binary { op, lhs, rhs } => op.apply(lhs.eval(x, y)?, rhs.eval(x, y)?),
            Expr::Call { func, args } => {
                if args.len() != func.arity() {
                    return Err(EvalError::Arity {
                        name: func.name(),
                        expected: func.arity(),
                        found: args.len(),
                    });
                }
                let mut values = [0.0; 2];
                for (slot, arg) in values.iter_mut().zip(args) {
                    *slot = arg.eval(x, y)?;
                }
                func.apply(&values[..args.len()])
            }
            Expr::Unknown(name) => Err(EvalError::UnknownSymbol(name.clone())),
        }
    }
}

/// Named functions callable from expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Exp,
    Ln,
    Log10,
    Log2,
    Sqrt,
    Cbrt,
    Abs,
    Sign,
    Floor,
    Ceil,
    Round,
    Atan2,
    Pow,
    Min,
    Max,
    Hypot,
    Mod,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        use Builtin::*;
        Some(match name {
            "sin" => Sin,
            "cos" => Cos,
            "tan" => Tan,
            "asin" => Asin,
            "acos" => Acos,
            "atan" => Atan,
            "sinh" => Sinh,
            "cosh" => Cosh,
            "tanh" => Tanh,
            "asinh" => Asinh,
            "acosh" => Acosh,
            "atanh" => Atanh,
            "exp" => Exp,
            "ln" | "log" => Ln,
            "log10" => Log10,
            "log2" => Log2,
            "sqrt" => Sqrt,
            "cbrt" => Cbrt,
            "abs" => Abs,
            "sign" => Sign,
            "floor" => Floor,
            "ceil" => Ceil,
            "round" => Round,
            "atan2" => Atan2,
            "pow" => Pow,
            "min" => Min,
            "max" => Max,
            "hypot" => Hypot,
            "mod" => Mod,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        use Builtin::*;
        match self {
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Asin => "asin",
            Acos => "acos",
            Atan => "atan",
            Sinh => "sinh",
            Cosh => "cosh",
            Tanh => "tanh",
            Asinh => "asinh",
            Acosh => "acosh",
            Atanh => "atanh",
            Exp => "exp",
            Ln => "ln",
            Log10 => "log10",
            Log2 => "log2",
            Sqrt => "sqrt",
            Cbrt => "cbrt",
            Abs => "abs",
            Sign => "sign",
            Floor => "floor",
            Ceil => "ceil",
            Round => "round",
            Atan2 => "atan2",
            Pow => "pow",
            Min => "min",
            Max => "max",
            Hypot => "hypot",
            Mod => "mod",
        }
    }

    pub fn arity(self) -> usize {
        use Builtin::*;
        match self {
            Atan2 | Pow | Min | Max | Hypot | Mod => 2,
            _ => 1,
        }
    }

    /// Applies the function. `args.len()` must equal [`arity`](Builtin::arity).
    fn apply(self, args: &[Scalar]) -> Result<Scalar, EvalError> {
        use Builtin::*;
        let a = args[0];
        let domain = |ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(EvalError::Domain {
                    name: self.name(),
                    arg: a,
                })
            }
        };
        Ok(match self {
            Sin => a.sin(),
            Cos => a.cos(),
            Tan => a.tan(),
            Asin => {
                domain(a.abs() <= 1.0)?;
                a.asin()
            }
            Acos => {
                domain(a.abs() <= 1.0)?;
                a.acos()
            }
            Atan => a.atan(),
            Sinh => a.sinh(),
            Cosh => a.cosh(),
            Tanh => a.tanh(),
            Asinh => a.asinh(),
            Acosh => {
                domain(a >= 1.0)?;
                a.acosh()
            }
            Atanh => {
                domain(a.abs() <= 1.0)?;
                a.atanh()
            }
            Exp => a.exp(),
            Ln => {
                domain(a >= 0.0)?;
                a.ln()
            }
            Log10 => {
                domain(a >= 0.0)?;
                a.log10()
            }
            Log2 => {
                domain(a >= 0.0)?;
                a.log2()
            }
            Sqrt => {
                domain(a >= 0.0)?;
                a.sqrt()
            }
            Cbrt => a.cbrt(),
            Abs => a.abs(),
            Sign => {
                if a > 0.0 {
                    1.0
                } else if a < 0.0 {
                    -1.0
                } else {
                    a
                }
            }
            Floor => a.floor(),
            Ceil => a.ceil(),
            Round => a.round(),
            Atan2 => a.atan2(args[1]),
            Pow => power(a, args[1])?,
            Min => a.min(args[1]),
            Max => a.max(args[1]),
            Hypot => a.hypot(args[1]),
            Mod => {
                let b = args[1];
                if b == 0.0 { a } else { a - b * (a / b).floor() }
            }
        })
    }
}

/// `base ^ exponent`, rejecting results that would be complex.
fn power(base: Scalar, exponent: Scalar) -> Result<Scalar, EvalError> {
    if base < 0.0 && exponent.is_finite() && exponent.fract() != 0.0 {
        return Err(EvalError::Domain {
            name: "pow",
            arg: base,
        });
    }
    Ok(base.powf(exponent))
}

/// Parses `source` into a syntax tree without evaluating it.
pub fn parse_tree(source: &str) -> Result<Expr, ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError::EmptyExpression);
    }

    let mut pairs = ExprParser::parse(Rule::expression, source)
        .map_err(|e| ParseError::SyntaxError(Box::new(e)))?;

    // expression = { SOI ~ expr ~ EOI }
    match pairs.next().and_then(|p| p.into_inner().next()) {
        Some(expr) if expr.as_rule() == Rule::expr => build(expr.into_inner()),
        _ => Err(ParseError::EmptyExpression),
    }
}

fn build(pairs: Pairs<'_, Rule>) -> Result<Expr, ParseError> {
    PRATT
        .map_primary(build_primary)
        .map_prefix(|op, operand| {
            let op = match op.as_rule() {
                Rule::neg => UnaryOp::Neg,
                _ => UnaryOp::Plus,
            };
            Ok(Expr::Unary {
                op,
                operand: Box::new(operand?),
            })
        })
        .map_infix(|lhs, op, rhs| {
            let op = match op.as_rule() {
                Rule::add => BinaryOp::Add,
                Rule::sub => BinaryOp::Sub,
                Rule::mul => BinaryOp::Mul,
                Rule::div => BinaryOp::Div,
                _ => BinaryOp::Pow,
            };
            Ok(Expr::Binary {
                op,
                lhs: Box::new(lhs?),
                rhs: Box::new(rhs?),
            })
        })
        .parse(pairs)
}

fn build_primary(pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
    match pair.as_rule() {
        Rule::number => pair.as_str().parse::<Scalar>().map(Expr::Literal).map_err(|e| {
            ParseError::SyntaxError(Box::new(PestError::new_from_span(
                ErrorVariant::CustomError {
                    message: format!("invalid number: {e}"),
                },
                pair.as_span(),
            )))
        }),
        Rule::ident => Ok(resolve_identifier(pair.as_str())),
        Rule::call => {
            let mut inner = pair.into_inner();
            let name = inner.next().map(|p| p.as_str()).unwrap_or_default();
            let args = inner
                .map(|arg| build(arg.into_inner()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(match Builtin::from_name(name) {
                Some(func) => Expr::Call { func, args },
                None => Expr::Unknown(format!("{name}()")),
            })
        }
        Rule::expr => build(pair.into_inner()),
        rule => Err(ParseError::SyntaxError(Box::new(PestError::new_from_span(
            ErrorVariant::ParsingError {
                positives: vec![Rule::expr],
                negatives: vec![rule],
            },
            pair.as_span(),
        )))),
    }
}

fn resolve_identifier(name: &str) -> Expr {
    use std::f64::consts::{E, PI, TAU};
    match name {
        "x" => Expr::Variable(Var::X),
        "y" => Expr::Variable(Var::Y),
        "pi" | "PI" => Expr::Literal(PI),
        "e" | "E" => Expr::Literal(E),
        "tau" => Expr::Literal(TAU),
        other => Expr::Unknown(other.to_owned()),
    }
}
