use crate::{
    ast::Expr,
    error::{BindError, EvalError, ParseError},
    eval::evaluate,
    lexer::tokenize,
    parser::Parser,
};

/// A single `output = expression` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<V = String> {
    pub output: String,
    pub expr: Expr<V>,
}

/// A parsed set of assignments with variables still referenced by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    assignments: Vec<Assignment>,
}

impl Program {
    /// Parses one or more assignments separated by `;` or newlines.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the source is not a valid program.
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(src)?;
        let assignments = Parser::new(tokens).program()?;
        Ok(Self { assignments })
    }

    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Returns the output names in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|a| a.output.as_str())
    }

    /// Resolves every free identifier to an input slot.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] naming the first identifier `resolve` rejects.
    pub fn bind(
        &self,
        mut resolve: impl FnMut(&str) -> Option<usize>,
    ) -> Result<BoundProgram, BindError> {
        let mut lookup = |name: &String| {
            resolve(name.as_str()).ok_or_else(|| BindError { name: name.clone() })
        };

        let assignments = self
            .assignments
            .iter()
            .map(|a| -> Result<Assignment<usize>, BindError> {
                Ok(Assignment {
                    output: a.output.clone(),
                    expr: a.expr.try_map_variables(&mut lookup)?,
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(BoundProgram { assignments })
    }
}

/// A program whose variables are slot indices into an input slice.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundProgram {
    assignments: Vec<Assignment<usize>>,
}

impl BoundProgram {
    /// Evaluates every assignment, returning outputs in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::NonFinite`] if any output or intermediate value is
    /// NaN or infinite, or
    /// [`EvalError::MissingInput`] if `values` is shorter than a bound slot.
    pub fn evaluate(&self, values: &[f64]) -> Result<Vec<f64>, EvalError> {
        self.assignments
            .iter()
            .map(|a| evaluate(&a.expr, values, &a.output))
            .collect()
    }
}
