//! HTTP routes.
//!
//! - `POST /solve` takes a JSON problem description and returns its solution.
//! - `GET /health` reports liveness and whether the service client is set up.
//!
//! Failures are returned as `{ "kind": ..., "message": ... }`.

use std::{convert::Infallible, sync::Arc};

use mdao_problem::{CancelToken, ErrorKind, Executor, ProblemDescription, ProblemError, solve_with};
use serde::Serialize;
use tracing::{error, info, warn};
use warp::{
    Filter, Rejection, Reply,
    http::StatusCode,
    reply::{Json, WithStatus},
};

use crate::client::AppContext;

/// Largest accepted request body.
const MAX_BODY_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    service_client: bool,
}

/// All routes, with rejections rendered as JSON errors.
pub fn routes(
    context: Arc<AppContext>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    solve(Arc::clone(&context))
        .or(health(context))
        .recover(handle_rejection)
}

fn with_context(
    context: Arc<AppContext>,
) -> impl Filter<Extract = (Arc<AppContext>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&context))
}

fn solve(
    context: Arc<AppContext>,
) -> impl Filter<Extract = (WithStatus<Json>,), Error = Rejection> + Clone {
    warp::path("solve")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_context(context))
        .then(handle_solve)
}

fn health(
    context: Arc<AppContext>,
) -> impl Filter<Extract = (Json,), Error = Rejection> + Clone {
    warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_context(context))
        .map(|context: Arc<AppContext>| {
            warp::reply::json(&Health {
                status: "ok",
                service_client: context.client().is_some(),
            })
        })
}

/// Runs the solve off the async runtime and enforces the timeout.
///
/// When the timeout fires the cancel token is tripped so the blocking search
/// stops at its next evaluation instead of running on unobserved.
async fn handle_solve(
    description: ProblemDescription,
    context: Arc<AppContext>,
) -> WithStatus<Json> {
    let timeout = context.solve_timeout();
    let token = CancelToken::new();
    let executor = Executor::new()
        .with_timeout(timeout)
        .with_cancel_token(token.clone());

    let id = description.id.clone();
    info!(problem = %id, "solve requested");

    let task = tokio::task::spawn_blocking(move || solve_with(&description, &executor));
    let outcome = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => {
            error!(problem = %id, error = %join_error, "solve task failed");
            return error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "solve task failed".into(),
            );
        }
        Err(_) => {
            token.cancel();
            Err(ProblemError::TimedOut)
        }
    };

    match outcome {
        Ok(solution) => warp::reply::with_status(warp::reply::json(&solution), StatusCode::OK),
        Err(err) => {
            warn!(problem = %id, kind = err.kind().as_str(), error = %err, "solve failed");
            error_reply(status_for(err.kind()), err.kind().as_str(), err.to_string())
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Numerical => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::TimedOut => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Validation
        | ErrorKind::UnresolvedReference
        | ErrorKind::DuplicateId
        | ErrorKind::AmbiguousWiring
        | ErrorKind::UnsupportedOptimizer => StatusCode::BAD_REQUEST,
    }
}

fn error_reply(status: StatusCode, kind: &'static str, message: String) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&ErrorBody { kind, message }), status)
}

async fn handle_rejection(rejection: Rejection) -> Result<WithStatus<Json>, Infallible> {
    let reply = if rejection.is_not_found() {
        error_reply(StatusCode::NOT_FOUND, "notFound", "no such route".into())
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        error_reply(
            StatusCode::BAD_REQUEST,
            ErrorKind::Validation.as_str(),
            err.to_string(),
        )
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        error_reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::Validation.as_str(),
            format!("request body exceeds {MAX_BODY_BYTES} bytes"),
        )
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "methodNotAllowed",
            "method not allowed".into(),
        )
    } else if rejection.find::<warp::reject::UnsupportedMediaType>().is_some() {
        error_reply(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorKind::Validation.as_str(),
            "expected a JSON body".into(),
        )
    } else {
        error!(?rejection, "unhandled rejection");
        error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "unhandled request".into(),
        )
    };
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{Value, json};

    use super::*;

    fn filter(
        timeout: Duration,
    ) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        routes(Arc::new(AppContext::without_client(timeout)))
    }

    fn paraboloid(optimizer: &str, expression: &str, lower: f64, upper: f64) -> Value {
        json!({
            "id": "paraboloid-problem",
            "independents": [
                { "id": "x", "value": 3.0 },
                { "id": "y", "value": -4.0 }
            ],
            "component": {
                "id": "paraboloid",
                "type": "ExecComp",
                "expression": expression
            },
            "driver": { "id": "driver", "optimizerName": optimizer },
            "designVariables": [
                { "id": "x", "lowerBound": lower, "upperBound": upper },
                { "id": "y", "lowerBound": -50.0, "upperBound": 50.0 }
            ],
            "objective": { "id": "f" }
        })
    }

    const PARABOLOID: &str = "f = (x-3)**2 + x*y + (y+4)**2 - 3";

    async fn post(body: &Value, timeout: Duration) -> (StatusCode, Value) {
        let response = warp::test::request()
            .method("POST")
            .path("/solve")
            .json(body)
            .reply(&filter(timeout))
            .await;
        let body = serde_json::from_slice(response.body()).expect("response is JSON");
        (response.status(), body)
    }

    #[tokio::test]
    async fn solves_paraboloid() {
        let (status, body) = post(
            &paraboloid("SLSQP", PARABOLOID, -50.0, 50.0),
            Duration::from_secs(30),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "converged");

        let results = body["results"].as_array().unwrap();
        assert_eq!(results[0]["id"], "f");
        assert!((results[0]["value"].as_f64().unwrap() + 82.0 / 3.0).abs() < 1e-4);
        assert_eq!(results[1]["id"], "x");
        assert!((results[1]["value"].as_f64().unwrap() - 20.0 / 3.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn fail_fast_errors_are_bad_requests() {
        let (status, body) = post(
            &paraboloid("bogus", PARABOLOID, -50.0, 50.0),
            Duration::from_secs(30),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "unsupportedOptimizer");

        let (status, body) = post(
            &paraboloid("SLSQP", "f = x + z", -50.0, 50.0),
            Duration::from_secs(30),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "unresolvedReference");
        assert!(body["message"].as_str().unwrap().contains('z'));

        let (status, body) = post(
            &paraboloid("SLSQP", PARABOLOID, 10.0, 0.0),
            Duration::from_secs(30),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");
    }

    #[tokio::test]
    async fn numerical_failures_are_unprocessable() {
        let (status, body) = post(
            &paraboloid("SLSQP", "f = log(x) + y", -50.0, 50.0),
            Duration::from_secs(30),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "numerical");
    }

    #[tokio::test]
    async fn expired_timeout_is_gateway_timeout() {
        let (status, body) = post(
            &paraboloid("SLSQP", PARABOLOID, -50.0, 50.0),
            Duration::from_nanos(1),
        )
        .await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["kind"], "timedOut");
    }

    #[tokio::test]
    async fn malformed_body_is_validation_error() {
        let response = warp::test::request()
            .method("POST")
            .path("/solve")
            .header("content-type", "application/json")
            .body(r#"{ "id": "p", "independents": "#)
            .reply(&filter(Duration::from_secs(30)))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["kind"], "validation");
    }

    #[tokio::test]
    async fn unknown_fields_are_rejected() {
        let mut problem = paraboloid("SLSQP", PARABOLOID, -50.0, 50.0);
        problem["extra"] = json!(true);

        let (status, body) = post(&problem, Duration::from_secs(30)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");
    }

    #[tokio::test]
    async fn health_reports_client_state() {
        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&filter(Duration::from_secs(30)))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({ "status": "ok", "serviceClient": false }));
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let response = warp::test::request()
            .method("GET")
            .path("/nowhere")
            .reply(&filter(Duration::from_secs(30)))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
