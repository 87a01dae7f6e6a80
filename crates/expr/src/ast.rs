/// An expression tree.
///
/// The type parameter `V` is how variables are represented: names (`String`)
/// straight out of the parser, or slot indices (`usize`) once bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<V = String> {
    Number(f64),
    Variable(V),
    Negate(Box<Expr<V>>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr<V>>,
        rhs: Box<Expr<V>>,
    },
    Call {
        function: Function,
        args: Vec<Expr<V>>,
    },
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
    pub(crate) fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
            Self::Pow => lhs.powf(rhs),
        }
    }
}

/// Built-in functions callable from an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Exp,
    Log,
    Log10,
    Sin,
    Cos,
    Tan,
    Abs,
    Min,
    Max,
}

impl Function {
    /// Looks up a function by the name used in expressions.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sqrt" => Self::Sqrt,
            "exp" => Self::Exp,
            "log" => Self::Log,
            "log10" => Self::Log10,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "abs" => Self::Abs,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => return None,
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Log10 => "log10",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Number of arguments the function takes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Min | Self::Max => 2,
            _ => 1,
        }
    }

    /// Applies the function; `args.len()` has already been checked against [`Self::arity`].
    pub(crate) fn apply(self, args: &[f64]) -> f64 {
        match self {
            Self::Sqrt => args[0].sqrt(),
            Self::Exp => args[0].exp(),
            Self::Log => args[0].ln(),
            Self::Log10 => args[0].log10(),
            Self::Sin => args[0].sin(),
            Self::Cos => args[0].cos(),
            Self::Tan => args[0].tan(),
            Self::Abs => args[0].abs(),
            Self::Min => args[0].min(args[1]),
            Self::Max => args[0].max(args[1]),
        }
    }
}

impl<V> Expr<V> {
    /// Returns every variable in the tree, left to right, including repeats.
    #[must_use]
    pub fn variables(&self) -> Vec<&V> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a V>) {
        match self {
            Self::Number(_) => {}
            Self::Variable(v) => out.push(v),
            Self::Negate(inner) => inner.collect_variables(out),
            Self::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            Self::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
        }
    }

    /// Rebuilds the tree with every variable mapped through `f`.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map_variables<W, E>(
        &self,
        f: &mut impl FnMut(&V) -> Result<W, E>,
    ) -> Result<Expr<W>, E> {
        Ok(match self {
            Self::Number(n) => Expr::Number(*n),
            Self::Variable(v) => Expr::Variable(f(v)?),
            Self::Negate(inner) => Expr::Negate(Box::new(inner.try_map_variables(f)?)),
            Self::Binary { op, lhs, rhs } => Expr::Binary {
                op: *op,
                lhs: Box::new(lhs.try_map_variables(f)?),
                rhs: Box::new(rhs.try_map_variables(f)?),
            },
            Self::Call { function, args } => {
                let mut mapped = Vec::with_capacity(args.len());
                for arg in args {
                    mapped.push(arg.try_map_variables(f)?);
                }
                Expr::Call {
                    function: *function,
                    args: mapped,
                }
            }
        })
    }
}
