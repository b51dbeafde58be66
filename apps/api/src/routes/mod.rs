pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/interviews",
            post(handlers::handle_start_interview).get(handlers::handle_list_interviews),
        )
        .route("/api/v1/interviews/:id", get(handlers::handle_get_interview))
        .route(
            "/api/v1/interviews/:id/answers",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/results",
            get(handlers::handle_get_results),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::test_config;
    use crate::interview::session_store::SessionStore;
    use crate::interview::testing::{InMemoryInterviewRepository, ScriptedGateway};

    struct TestApp {
        router: Router,
        repository: Arc<InMemoryInterviewRepository>,
        gateway: Arc<ScriptedGateway>,
    }

    fn app(script: Vec<String>) -> TestApp {
        let repository = Arc::new(InMemoryInterviewRepository::new());
        let gateway = Arc::new(ScriptedGateway::new(script));
        let state = AppState {
            interviews: repository.clone(),
            sessions: SessionStore::new(),
            llm: gateway.clone(),
            config: test_config(),
        };
        TestApp {
            router: build_router(state),
            repository,
            gateway,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn evaluation_text(score: u32) -> String {
        format!("SCORE: {score}\nFEEDBACK: feedback {score}\nRECOMMENDATIONS: rec {score}")
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(Vec::new());
        let (status, body) = send(&app.router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_interview_end_to_end() {
        let mut script = vec!["Question 1".to_string()];
        for (i, score) in [6, 7, 8, 5, 9].iter().enumerate() {
            script.push(evaluation_text(*score));
            if i < 4 {
                script.push(format!("Question {}", i + 2));
            }
        }
        let app = app(script);
        let user = Uuid::new_v4();

        let (status, started) = send(
            &app.router,
            post_json(
                "/api/v1/interviews",
                json!({"userId": user, "role": "Backend Developer", "difficulty": "Intermediate"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(started["question"], "Question 1");
        assert_eq!(started["questionNumber"], 1);
        assert_eq!(started["totalQuestions"], 5);
        let id = started["interviewId"].as_str().unwrap().to_string();
        let answers_uri = format!("/api/v1/interviews/{id}/answers");

        let (status, first) = send(
            &app.router,
            post_json(&answers_uri, json!({"userId": user, "answer": "An index is..."})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["evaluation"]["score"], 6);
        assert_eq!(first["completed"], false);
        assert_eq!(first["nextQuestion"]["questionNumber"], 2);
        assert_eq!(first["progress"]["total"], 5);

        let mut last = Value::Null;
        for round in 2..=5 {
            let (status, body) = send(
                &app.router,
                post_json(&answers_uri, json!({"userId": user, "answer": format!("answer {round}")})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            last = body;
        }
        assert_eq!(last["completed"], true);
        assert!(last["nextQuestion"].is_null());
        assert_eq!(last["totalScore"], 7);

        let (status, detail) = send(
            &app.router,
            get(&format!("/api/v1/interviews/{id}?userId={user}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["completed"], true);
        assert_eq!(detail["totalScore"], 7);
        assert_eq!(detail["questions"].as_array().unwrap().len(), 5);
        assert_eq!(detail["questions"][0]["userAnswer"], "An index is...");

        let (status, results) = send(
            &app.router,
            get(&format!("/api/v1/interviews/{id}/results?userId={user}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(results["totalScore"], 7);
        assert_eq!(results["completed"], true);

        let (status, list) = send(
            &app.router,
            get(&format!("/api/v1/interviews?userId={user}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["questionCount"], 5);

        let (status, _) = send(
            &app.router,
            post_json(&answers_uri, json!({"userId": user, "answer": "one more"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_start_rejects_empty_role() {
        let app = app(vec!["Question 1".into()]);
        let (status, body) = send(
            &app.router,
            post_json(
                "/api/v1/interviews",
                json!({"userId": Uuid::new_v4(), "role": "   ", "difficulty": "Beginner"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(app.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_start_rejects_unknown_difficulty() {
        let app = app(vec!["Question 1".into()]);
        let (status, body) = send(
            &app.router,
            post_json(
                "/api/v1/interviews",
                json!({"userId": Uuid::new_v4(), "role": "QA", "difficulty": "Impossible"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(app.repository.len(), 0);
        assert_eq!(app.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_requests_use_error_body() {
        let app = app(Vec::new());

        let not_json = Request::post("/api/v1/interviews")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app.router, not_json).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(&app.router, get("/api/v1/interviews")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app.router,
            post_json(
                "/api/v1/interviews/not-a-uuid/answers",
                json!({"userId": Uuid::new_v4(), "answer": "hi"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_start_gateway_failure_is_generic_server_error() {
        let app = app(Vec::new());
        let (status, body) = send(
            &app.router,
            post_json(
                "/api/v1/interviews",
                json!({"userId": Uuid::new_v4(), "role": "QA", "difficulty": "Advanced"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
        assert_eq!(app.repository.len(), 0);
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_answer() {
        let app = app(Vec::new());
        let (status, _) = send(
            &app.router,
            post_json(
                &format!("/api/v1/interviews/{}/answers", Uuid::new_v4()),
                json!({"userId": Uuid::new_v4(), "answer": ""}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_unknown_interview_not_found() {
        let app = app(Vec::new());
        let (status, body) = send(
            &app.router,
            get(&format!(
                "/api/v1/interviews/{}?userId={}",
                Uuid::new_v4(),
                Uuid::new_v4()
            )),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
