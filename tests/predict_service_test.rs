//! Prediction service driven through its routers

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use pronostico::config::titanic_config;
use pronostico::data::Dataset;
use pronostico::engine::{Engine, LogisticModel};
use pronostico::server::{parse_form, predict_row, PredictionServer, ServerConfig};
use proptest::prelude::*;
use tower::ServiceExt;

fn trained_model() -> LogisticModel {
    let mut csv = String::from("Survived,Pclass,Sex,Age,SibSp,Parch,Fare\n");
    for i in 0..100 {
        let female = i % 2 == 0;
        let _ = writeln!(
            csv,
            "{},{},{},{},{},0,{}",
            u8::from(female),
            i % 3 + 1,
            if female { "female" } else { "male" },
            20 + i % 30,
            (i / 2) % 2,
            8 + i % 50,
        );
    }

    let mut config = titanic_config();
    config.trainer.epochs = 40;
    config.trainer.learning_rate = 0.05;
    config.trainer.batch_size = 16;

    let mut model = LogisticModel::new(config, 7).unwrap();
    model.train(&Dataset::from_csv_str(&csv).unwrap()).unwrap();
    model
}

/// One trained model shared by the property cases
fn shared_model() -> &'static LogisticModel {
    static MODEL: OnceLock<LogisticModel> = OnceLock::new();
    MODEL.get_or_init(trained_model)
}

fn server() -> PredictionServer {
    PredictionServer::new(ServerConfig::default(), Arc::new(trained_model())).unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn scrape(server: &PredictionServer) -> String {
    let response = server
        .metrics_router()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_string(response).await
}

#[tokio::test]
async fn test_male_third_class_prediction() {
    let server = server();

    let response = server
        .router()
        .oneshot(post_form(
            "Pclass=3&Sex=male&Age=22&SibSp=1&Parch=0&Fare=7.25",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Prediction: <strong>Did not survive</strong> (False)"));
    assert!(html.contains("Probability: <strong>"));
    assert!(html.contains("%</strong>"));

    assert_eq!(server.state().metrics.predictions(), 1);
    assert!(scrape(&server).await.contains("num_predictions_total 1"));
}

#[tokio::test]
async fn test_non_numeric_age_returns_error_payload() {
    let server = server();

    let response = server
        .router()
        .oneshot(post_form(
            "Pclass=3&Sex=male&Age=abc&SibSp=1&Parch=0&Fare=7.25",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("Age"), "{message}");

    assert_eq!(server.state().metrics.predictions(), 0);
    assert!(scrape(&server).await.contains("num_predictions_total 0"));
}

#[tokio::test]
async fn test_missing_field_returns_error_payload() {
    let server = server();

    let response = server
        .router()
        .oneshot(post_form("Pclass=1&Sex=female&Age=30&SibSp=0&Parch=0"))
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(json["error"].as_str().unwrap().contains("Fare"));
}

#[tokio::test]
async fn test_metrics_exposition() {
    let server = server();
    for body in [
        "Pclass=1&Sex=female&Age=38&SibSp=1&Parch=0&Fare=71.28",
        "Pclass=2&Sex=female&Age=27&SibSp=0&Parch=2&Fare=21",
    ] {
        let response = server.router().oneshot(post_form(body)).await.unwrap();
        assert!(body_string(response).await.contains("Survived"));
    }

    let text = scrape(&server).await;
    assert!(text.contains("num_predictions_total 2"));
    assert!(text.contains("prediction_latency_seconds_count 2"));
    assert!(text.contains("request_processing_seconds_count 2"));
}

#[tokio::test]
async fn test_home_page() {
    let response = server()
        .router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("<form action=\"/predict\" method=\"post\">"));
}

#[tokio::test]
async fn test_non_finite_and_negative_reals_are_rejected() {
    let server = server();

    for body in [
        "Pclass=3&Sex=male&Age=NaN&SibSp=1&Parch=0&Fare=7.25",
        "Pclass=3&Sex=male&Age=inf&SibSp=1&Parch=0&Fare=7.25",
        "Pclass=3&Sex=male&Age=-5&SibSp=1&Parch=0&Fare=7.25",
        "Pclass=3&Sex=male&Age=22&SibSp=1&Parch=0&Fare=-inf",
    ] {
        let response = server.router().oneshot(post_form(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert!(json["error"].is_string(), "{body}");
    }

    assert_eq!(server.state().metrics.predictions(), 0);
    assert_eq!(server.state().metrics.requests_observed(), 4);
}

/// Six well-formed form fields for a plausible passenger
fn valid_form() -> impl Strategy<Value = HashMap<String, String>> {
    (
        1i64..=3,
        prop_oneof![Just("male"), Just("female")],
        0.0f64..100.0,
        0i64..=8,
        0i64..=6,
        0.0f64..600.0,
    )
        .prop_map(|(pclass, sex, age, sib_sp, parch, fare)| {
            [
                ("Pclass", pclass.to_string()),
                ("Sex", sex.to_string()),
                ("Age", age.to_string()),
                ("SibSp", sib_sp.to_string()),
                ("Parch", parch.to_string()),
                ("Fare", fare.to_string()),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
        })
}

proptest! {
    #[test]
    fn prop_valid_form_yields_label_and_percentage(form in valid_form()) {
        let row = parse_form(&form).unwrap();
        let outcome = predict_row(shared_model(), &row).unwrap();

        prop_assert!((0.0..=100.0).contains(&outcome.probability));
        let label = outcome.label();
        prop_assert!(label == "Survived" || label == "Did not survive");
    }
}
