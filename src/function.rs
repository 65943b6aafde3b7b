use crate::{
    error::{EvalError, ParseError},
    expr::{Expr, parse_tree},
    types::Scalar,
};

/// Magnitude substituted for non-finite results.
pub const DEFAULT_SENTINEL: Scalar = 1.0e6;

/// Step `h` used by [`CompiledFunction::gradient`].
pub const DEFAULT_GRADIENT_STEP: Scalar = 1.0e-3;

/// Point at which a freshly parsed expression is trial-evaluated.
const TRIAL_POINT: (Scalar, Scalar) = (1.0, 1.0);

/// A real function of two variables that a surface can be sampled from.
///
/// Implemented by [`CompiledFunction`] and by plain closures, so tests and
/// callers with a native function can skip the parser:
///
/// ```rust,ignore
/// let bowl = |x: f64, y: f64| x * x + y * y;
/// let mesh = SurfaceMeshGenerator::default().generate(&bowl, &domain, resolution, None);
/// ```
pub trait SurfaceFunction: Sync {
    fn evaluate(&self, x: Scalar, y: Scalar) -> Scalar;
}

impl<F> SurfaceFunction for F
where
    F: Fn(Scalar, Scalar) -> Scalar + Sync,
{
    fn evaluate(&self, x: Scalar, y: Scalar) -> Scalar {
        self(x, y)
    }
}

/// A parsed expression ready for repeated evaluation.
///
/// Evaluation never fails: faults become `0` and non-finite results become
/// `±sentinel`, so every grid sample is a usable number.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    source: String,
    tree: Expr,
    sentinel: Scalar,
    gradient_step: Scalar,
}

/// Parses `expression` and checks that it evaluates to a real number at `(1, 1)`.
pub fn parse(expression: &str) -> Result<CompiledFunction, ParseError> {
    let tree = parse_tree(expression)?;

    let (x, y) = TRIAL_POINT;
    match tree.eval(x, y) {
        Ok(v) if v.is_nan() => return Err(ParseError::NonNumericResult(EvalError::NotANumber)),
        Ok(_) => {}
        Err(e) => return Err(ParseError::NonNumericResult(e)),
    }

    log::debug!("compiled expression `{}`", expression.trim());
    Ok(CompiledFunction {
        source: expression.to_owned(),
        tree,
        sentinel: DEFAULT_SENTINEL,
        gradient_step: DEFAULT_GRADIENT_STEP,
    })
}

impl CompiledFunction {
    /// Sets the magnitude substituted for non-finite results.
    pub fn with_sentinel(mut self, sentinel: Scalar) -> Self {
        self.sentinel = sentinel.abs();
        self
    }

    /// Sets the finite difference step used by [`gradient`](CompiledFunction::gradient).
    pub fn with_gradient_step(mut self, h: Scalar) -> Self {
        self.gradient_step = h;
        self
    }

    /// The text this function was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Expr {
        &self.tree
    }

    pub fn sentinel(&self) -> Scalar {
        self.sentinel
    }

    /// Evaluates at `(x, y)`.
    ///
    /// ```text
    /// eval error        → 0
    /// +inf, v > 0       → +sentinel
    /// -inf, NaN         → -sentinel
    /// ```
    pub fn evaluate(&self, x: Scalar, y: Scalar) -> Scalar {
        match self.tree.eval(x, y) {
            Ok(v) if v.is_finite() => v,
            Ok(v) if v > 0.0 => self.sentinel,
            Ok(_) => -self.sentinel,
            Err(e) => {
                log::trace!("`{}` at ({x}, {y}): {e}", self.source);
                0.0
            }
        }
    }

    /// Central-difference gradient `(∂f/∂x, ∂f/∂y)` at `(x, y)`.
    pub fn gradient(&self, x: Scalar, y: Scalar) -> (Scalar, Scalar) {
        let h = self.gradient_step;
        let dx = (self.evaluate(x + h, y) - self.evaluate(x - h, y)) / (2.0 * h);
        let dy = (self.evaluate(x, y + h) - self.evaluate(x, y - h)) / (2.0 * h);
        (dx, dy)
    }
}

impl SurfaceFunction for CompiledFunction {
    fn evaluate(&self, x: Scalar, y: Scalar) -> Scalar {
        CompiledFunction::evaluate(self, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_expression() {
        assert_eq!(parse(""), Err(ParseError::EmptyExpression));
        assert_eq!(parse("   "), Err(ParseError::EmptyExpression));
    }

    #[test]
    fn dangling_operator_is_syntax_error() {
        assert!(matches!(parse("x +"), Err(ParseError::SyntaxError(_))));
    }

    #[test]
    fn linear_function() {
        let f = parse("2*x+3*y").unwrap();
        assert_eq!(f.evaluate(1.0, 1.0), 5.0);
        assert_eq!(f.source(), "2*x+3*y");
    }

    #[test]
    fn non_numeric_trial_result() {
        assert!(matches!(
            parse("x + z"),
            Err(ParseError::NonNumericResult(EvalError::UnknownSymbol(_)))
        ));
        assert!(matches!(
            parse("sqrt(-x)"),
            Err(ParseError::NonNumericResult(EvalError::Domain { .. }))
        ));
        assert!(matches!(
            parse("(x - y) / (x - y)"),
            Err(ParseError::NonNumericResult(EvalError::NotANumber))
        ));
        assert!(matches!(
            parse("atan2(x)"),
            Err(ParseError::NonNumericResult(EvalError::Arity { .. }))
        ));
    }

    #[test]
    fn infinity_at_trial_point_is_accepted() {
        let f = parse("1 / (x - 1)").unwrap();
        assert_eq!(f.evaluate(1.0, 0.0), DEFAULT_SENTINEL);
        assert_eq!(f.evaluate(3.0, 0.0), 0.5);
    }

    #[test]
    fn faults_evaluate_to_zero() {
        let f = parse("sqrt(x)").unwrap();
        assert_eq!(f.evaluate(-4.0, 0.0), 0.0);
        assert_eq!(f.evaluate(4.0, 0.0), 2.0);
    }

    #[test]
    fn non_finite_results_use_sentinel() {
        let f = parse("1 / y - 1 / y + x / y").unwrap();
        // x / 0 with x > 0 and the inf - inf term makes NaN
        assert_eq!(f.evaluate(1.0, 0.0), -DEFAULT_SENTINEL);

        let f = parse("x / y").unwrap();
        assert_eq!(f.evaluate(1.0, 0.0), DEFAULT_SENTINEL);
        assert_eq!(f.evaluate(-1.0, 0.0), -DEFAULT_SENTINEL);

        let f = f.with_sentinel(10.0);
        assert_eq!(f.evaluate(1.0, 0.0), 10.0);
    }

    #[test]
    fn gradient_of_bowl() {
        let f = parse("x^2 + y^2").unwrap();
        let (dx, dy) = f.gradient(1.0, -2.0);
        assert_relative_eq!(dx, 2.0, epsilon = 1e-6);
        assert_relative_eq!(dy, -4.0, epsilon = 1e-6);
    }

    #[test]
    fn gradient_step_is_configurable() {
        let f = parse("x^3").unwrap().with_gradient_step(0.5);
        // ((1.5)^3 - (0.5)^3) / 1.0
        let (dx, dy) = f.gradient(1.0, 0.0);
        assert_relative_eq!(dx, 3.25, epsilon = 1e-12);
        assert_eq!(dy, 0.0);
    }

    #[test]
    fn closures_are_surface_functions() {
        fn sample<F: SurfaceFunction + ?Sized>(f: &F) -> Scalar {
            f.evaluate(2.0, 3.0)
        }
        assert_eq!(sample(&|x: Scalar, y: Scalar| x * y), 6.0);
        assert_eq!(sample(&parse("x * y").unwrap()), 6.0);
    }
}
