use crate::{
    Component, DesignVariable, Driver, DriverOptions, IndependentVariable, Objective,
    ProblemDescription,
};

/// The paraboloid problem: minimize `(x-3)^2 + xy + (y+4)^2 - 3` over `[-50, 50]²`.
pub(crate) fn paraboloid() -> ProblemDescription {
    ProblemDescription {
        id: "paraboloid-problem".into(),
        driver: Driver {
            id: "driver".into(),
            optimizer_name: "SLSQP".into(),
            options: DriverOptions::default(),
        },
        independents: vec![
            IndependentVariable {
                id: "x".into(),
                value: 3.0,
            },
            IndependentVariable {
                id: "y".into(),
                value: -4.0,
            },
        ],
        component: Component {
            id: "paraboloid".into(),
            kind: "ExecComp".into(),
            expression: "f = (x-3)**2 + x*y + (y+4)**2 - 3".into(),
        },
        design_variables: vec![
            DesignVariable {
                id: "x".into(),
                lower_bound: -50.0,
                upper_bound: 50.0,
            },
            DesignVariable {
                id: "y".into(),
                lower_bound: -50.0,
                upper_bound: 50.0,
            },
        ],
        objective: Objective { id: "f".into() },
    }
}
