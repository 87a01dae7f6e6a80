use crate::{ast::Expr, error::EvalError};

/// Evaluates a bound expression against input values.
///
/// Every intermediate value must be finite, so a NaN swallowed by `min` or
/// an infinity divided back to zero is still reported against `output`.
pub(crate) fn evaluate(expr: &Expr<usize>, values: &[f64], output: &str) -> Result<f64, EvalError> {
    let value = match expr {
        Expr::Number(n) => *n,
        Expr::Variable(slot) => *values.get(*slot).ok_or(EvalError::MissingInput {
            slot: *slot,
            len: values.len(),
        })?,
        Expr::Negate(inner) => -evaluate(inner, values, output)?,
        Expr::Binary { op, lhs, rhs } => op.apply(
            evaluate(lhs, values, output)?,
            evaluate(rhs, values, output)?,
        ),
        Expr::Call { function, args } => {
            if args.len() != function.arity() {
                return Err(EvalError::Arity {
                    name: function.name(),
                    expected: function.arity(),
                    found: args.len(),
                });
            }
            let mut evaluated = [0.0; 2];
            for (slot, arg) in evaluated.iter_mut().zip(args) {
                *slot = evaluate(arg, values, output)?;
            }
            function.apply(&evaluated[..args.len()])
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite {
            output: output.to_string(),
            value,
        })
    }
}
