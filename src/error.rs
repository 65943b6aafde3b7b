use derive_more::{Display, From};

use crate::{expr::Rule, types::Scalar};

pub type Result<T> = core::result::Result<T, PlotError>;

/// Failure to turn expression text into a [`CompiledFunction`](crate::function::CompiledFunction).
#[derive(Debug, Display, PartialEq)]
pub enum ParseError {
    #[display("expression is empty")]
    EmptyExpression,
    #[display("syntax error:\n{_0}")]
    SyntaxError(Box<pest::error::Error<Rule>>),
    #[display("expression does not evaluate to a real number: {_0}")]
    NonNumericResult(EvalError),
}

impl std::error::Error for ParseError {}

/// A single evaluation fault. [`CompiledFunction::evaluate`](crate::function::CompiledFunction::evaluate)
/// replaces these with `0`; only the trial evaluation during parsing reports them.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum EvalError {
    #[display("unknown symbol `{_0}`")]
    UnknownSymbol(String),
    #[display("{name}() takes {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    #[display("{name}({arg}) is not a real number")]
    Domain { name: &'static str, arg: Scalar },
    #[display("NaN result")]
    NotANumber,
}

impl std::error::Error for EvalError {}

/// Invalid plot parameters.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum ConfigError {
    #[display("{axis} range [{low}, {high}] must be finite with low < high")]
    InvalidDomain { axis: char, low: Scalar, high: Scalar },
    #[display("resolution {_0} is outside 1..=65534")]
    InvalidResolution(u32),
    #[display("z range [{low}, {high}] must be finite with low <= high")]
    InvalidZRange { low: Scalar, high: Scalar },
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Display, From)]
pub enum PlotError {
    Parse(ParseError),
    Config(ConfigError),
}

impl std::error::Error for PlotError {}
