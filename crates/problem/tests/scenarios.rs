use approx::assert_relative_eq;
use serde_json::json;

use mdao_problem::{
    ErrorKind, Executor, ProblemDescription, ProblemError, SolveStatus, solve, solve_with,
};

fn paraboloid() -> serde_json::Value {
    json!({
        "id": "paraboloid-problem",
        "driver": { "id": "driver", "optimizerName": "SLSQP" },
        "independents": [
            { "id": "x", "value": 3.0 },
            { "id": "y", "value": -4.0 }
        ],
        "component": {
            "id": "paraboloid",
            "type": "ExecComp",
            "expression": "f = (x-3)**2 + x*y + (y+4)**2 - 3"
        },
        "designVariables": [
            { "id": "x", "lowerBound": -50.0, "upperBound": 50.0 },
            { "id": "y", "lowerBound": -50.0, "upperBound": 50.0 }
        ],
        "objective": { "id": "f" }
    })
}

fn parse(value: serde_json::Value) -> ProblemDescription {
    serde_json::from_value(value).expect("valid problem description")
}

#[test]
fn paraboloid_converges_to_known_optimum() {
    let solution = solve(&parse(paraboloid())).expect("should solve");

    assert_eq!(solution.status, SolveStatus::Converged);
    assert_eq!(solution.results.len(), 3);

    let [f, x, y] = [&solution.results[0], &solution.results[1], &solution.results[2]];
    assert_eq!((f.id.as_str(), x.id.as_str(), y.id.as_str()), ("f", "x", "y"));
    assert_relative_eq!(f.value, -82.0 / 3.0, epsilon = 1e-6);
    assert_relative_eq!(x.value, 20.0 / 3.0, epsilon = 1e-3);
    assert_relative_eq!(y.value, -22.0 / 3.0, epsilon = 1e-3);
}

#[test]
fn nelder_mead_reaches_the_same_optimum() {
    let mut value = paraboloid();
    value["driver"]["optimizerName"] = json!("nelder-mead");
    value["driver"]["options"] = json!({ "maxIterations": 1000, "tolerance": 1e-8 });

    let solution = solve(&parse(value)).expect("should solve");

    assert_eq!(solution.status, SolveStatus::Converged);
    assert_relative_eq!(solution.results[0].value, -82.0 / 3.0, epsilon = 1e-6);
    assert_relative_eq!(solution.results[1].value, 20.0 / 3.0, epsilon = 1e-3);
    assert_relative_eq!(solution.results[2].value, -22.0 / 3.0, epsilon = 1e-3);
}

#[test]
fn undeclared_identifier_is_unresolved_reference() {
    let mut value = paraboloid();
    value["component"]["expression"] = json!("f = (x-3)**2 + x*y + (y+4)**2 - 3 + z");

    let error = solve(&parse(value)).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnresolvedReference);
    assert!(error.to_string().contains("`z`"));
}

#[test]
fn unknown_optimizer_is_unsupported() {
    let mut value = paraboloid();
    value["driver"]["optimizerName"] = json!("bogus");

    let error = solve(&parse(value)).unwrap_err();
    assert_eq!(
        error,
        ProblemError::UnsupportedOptimizer {
            name: "bogus".into()
        }
    );
}

#[test]
fn inverted_bounds_are_a_validation_error() {
    let mut value = paraboloid();
    value["designVariables"][0]["lowerBound"] = json!(10.0);
    value["designVariables"][0]["upperBound"] = json!(0.0);

    let error = solve(&parse(value)).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert!(error.is_fail_fast());
}

#[test]
fn exhausted_iterations_report_best_values() {
    let mut value = paraboloid();
    value["driver"]["options"] = json!({ "maxIterations": 1 });

    let solution = solve(&parse(value)).expect("budget exhaustion is not an error");

    assert_eq!(solution.status, SolveStatus::NotConverged);
    assert_eq!(solution.iterations, 1);
    assert!(solution.message.is_some());

    // One steepest-descent step from (3, -4) lands on (7, -7).
    assert_relative_eq!(solution.results[0].value, -27.0, epsilon = 1e-5);
    assert_relative_eq!(solution.results[1].value, 7.0, epsilon = 1e-5);
    assert_relative_eq!(solution.results[2].value, -7.0, epsilon = 1e-5);
}

#[test]
fn qualified_ids_are_echoed_as_written() {
    let mut value = paraboloid();
    value["designVariables"][0]["id"] = json!("indeps.x");
    value["objective"]["id"] = json!("paraboloid.f");

    let solution = solve(&parse(value)).expect("should solve");

    let ids: Vec<_> = solution.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["paraboloid.f", "indeps.x", "y"]);
}

#[test]
fn design_variable_order_follows_the_request() {
    let mut value = paraboloid();
    let dvs = value["designVariables"].as_array_mut().unwrap();
    dvs.reverse();

    let solution = solve(&parse(value)).expect("should solve");

    assert_eq!(solution.results[1].id, "y");
    assert_relative_eq!(solution.results[1].value, -22.0 / 3.0, epsilon = 1e-3);
    assert_eq!(solution.results[2].id, "x");
}

#[test]
fn optimum_on_a_bound_is_reported_exactly() {
    let mut value = paraboloid();
    value["designVariables"][0]["upperBound"] = json!(5.0);
    value["designVariables"][1]["lowerBound"] = json!(-5.0);

    let solution = solve(&parse(value)).expect("should solve");

    assert_eq!(solution.status, SolveStatus::Converged);
    assert_eq!(solution.results[1].value, 5.0);
    assert_eq!(solution.results[2].value, -5.0);
    assert_relative_eq!(solution.results[0].value, -23.0);
}

#[test]
fn objective_can_be_a_single_design_variable() {
    // Minimizing `x` itself drives it to its lower bound.
    let mut value = paraboloid();
    value["objective"]["id"] = json!("x");
    value["designVariables"] = json!([{ "id": "x", "lowerBound": -2.0, "upperBound": 4.0 }]);

    let solution = solve(&parse(value)).expect("should solve");

    assert_relative_eq!(solution.results[0].value, -2.0);
    assert_relative_eq!(solution.results[1].value, -2.0);
}

#[test]
fn numerical_failure_is_fatal() {
    let mut value = paraboloid();
    value["component"]["expression"] = json!("f = log(x) + y");
    value["independents"][0]["value"] = json!(1.0);

    let error = solve(&parse(value)).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Numerical);
    assert!(!error.is_fail_fast());
}

#[test]
fn timeout_is_reported_as_timed_out() {
    let executor = Executor::new().with_timeout(std::time::Duration::ZERO);

    let error = solve_with(&parse(paraboloid()), &executor).unwrap_err();
    assert_eq!(error, ProblemError::TimedOut);
}

#[test]
fn multiple_statements_define_multiple_outputs() {
    let mut value = paraboloid();
    value["component"]["expression"] =
        json!("g = x + y\nf = (x-3)^2 + x*y + (y+4)^2 - 3");

    let solution = solve(&parse(value)).expect("should solve");
    assert_relative_eq!(solution.results[0].value, -82.0 / 3.0, epsilon = 1e-6);
}

#[test]
fn large_objective_offset_still_converges() {
    let mut value = paraboloid();
    value["component"]["expression"] = json!("f = (x-3)**2 + x*y + (y+4)**2 + 1e6");

    let solution = solve(&parse(value)).expect("should solve");

    assert_eq!(solution.status, SolveStatus::Converged);
    assert_relative_eq!(solution.results[0].value, 1e6 - 82.0 / 3.0 + 3.0, epsilon = 1e-3);
    assert_relative_eq!(solution.results[1].value, 20.0 / 3.0, epsilon = 1e-3);
    assert_relative_eq!(solution.results[2].value, -22.0 / 3.0, epsilon = 1e-3);
}

#[test]
fn scaled_objective_still_converges() {
    let mut value = paraboloid();
    value["component"]["expression"] = json!("f = 1e4 * ((x-3)**2 + x*y + (y+4)**2 - 3)");

    let solution = solve(&parse(value)).expect("should solve");

    assert_eq!(solution.status, SolveStatus::Converged);
    assert_relative_eq!(solution.results[1].value, 20.0 / 3.0, epsilon = 1e-3);
    assert_relative_eq!(solution.results[2].value, -22.0 / 3.0, epsilon = 1e-3);
}

#[test]
fn nelder_mead_from_near_zero_start_reaches_optimum() {
    let mut value = paraboloid();
    value["independents"] = json!([
        { "id": "x", "value": 1e-7 },
        { "id": "y", "value": 1e-7 }
    ]);
    value["driver"]["optimizerName"] = json!("nelder-mead");
    value["driver"]["options"] = json!({ "maxIterations": 1000, "tolerance": 1e-8 });

    let solution = solve(&parse(value)).expect("should solve");

    assert_eq!(solution.status, SolveStatus::Converged);
    assert!(solution.iterations > 0);
    assert_relative_eq!(solution.results[0].value, -82.0 / 3.0, epsilon = 1e-6);
    assert_relative_eq!(solution.results[1].value, 20.0 / 3.0, epsilon = 1e-3);
}

#[test]
fn nan_inside_min_or_max_is_a_numerical_error() {
    let mut value = paraboloid();
    value["component"]["expression"] = json!("f = max(x, sqrt(-1)) + y");

    let error = solve(&parse(value)).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Numerical);
}

#[test]
fn deeply_nested_expression_is_rejected() {
    let mut value = paraboloid();
    let nested = format!("f = {}x{} + y", "(".repeat(100_000), ")".repeat(100_000));
    value["component"]["expression"] = json!(nested);

    let error = solve(&parse(value)).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
}
