mod support;

use churninsight::domain::customer::{
    CustomerFeatures, PaymentMethod, PredictionRequest, SubscriptionType,
};
use churninsight::domain::errors::PredictorError;
use churninsight::domain::ports::ChurnPredictor;
use churninsight::domain::prediction::PredictionLabel;
use churninsight::infrastructure::MlServiceClient;
use std::time::Duration;
use support::{CannedResponse, CannedServer, closed_port_url};

fn request() -> PredictionRequest {
    PredictionRequest::new(
        "user-123",
        CustomerFeatures {
            subscription_type: SubscriptionType::Basic,
            watch_hours: 3.0,
            last_login_days: 45,
            monthly_fee: 8.99,
            number_of_profiles: 1,
            avg_watch_time_per_day: 0.2,
            payment_method: PaymentMethod::Crypto,
        },
    )
}

fn client(base_url: &str) -> MlServiceClient {
    MlServiceClient::new(base_url, Duration::from_millis(500), Duration::from_millis(500)).unwrap()
}

#[tokio::test]
async fn test_successful_prediction_posts_wire_payload() {
    let server = CannedServer::start(CannedResponse::json(
        200,
        r#"{"customer_id":"user-123","prediction":{"label":"will_churn","probability":0.82}}"#,
    ))
    .await;

    let result = client(&server.base_url()).predict(&request()).await.unwrap();

    assert_eq!(result.label, PredictionLabel::WillChurn);
    assert_eq!(result.probability, 0.82);

    let sent = server.requests().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("POST /predict"));
    assert!(sent[0].contains(r#""customer_id":"user-123""#));
    assert!(sent[0].contains(r#""subscription_type":"Basic""#));
    assert!(sent[0].contains(r#""payment_method":"Crypto""#));
}

#[tokio::test]
async fn test_client_error_is_rejected_with_body() {
    let server = CannedServer::start(CannedResponse::json(400, "Invalid request")).await;

    let err = client(&server.base_url())
        .predict(&request())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PredictorError::Rejected {
            status: 400,
            body: "Invalid request".to_string()
        }
    );
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = CannedServer::start(CannedResponse::json(500, "boom")).await;

    let err = client(&server.base_url())
        .predict(&request())
        .await
        .unwrap_err();

    assert_eq!(err, PredictorError::Unavailable { status: 500 });
}

#[tokio::test]
async fn test_empty_and_malformed_bodies() {
    let empty = CannedServer::start(CannedResponse::json(200, "")).await;
    let err = client(&empty.base_url()).predict(&request()).await.unwrap_err();
    assert_eq!(err, PredictorError::Empty);

    let garbage = CannedServer::start(CannedResponse::json(
        200,
        r#"{"customer_id":"user-123","prediction":{"label":"maybe","probability":0.5}}"#,
    ))
    .await;
    let err = client(&garbage.base_url())
        .predict(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, PredictorError::Protocol { .. }));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let server = CannedServer::start(
        CannedResponse::json(200, "{}").delayed(Duration::from_secs(3)),
    )
    .await;

    let err = client(&server.base_url())
        .predict(&request())
        .await
        .unwrap_err();

    assert_eq!(err, PredictorError::Timeout);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_closed_port_is_unreachable() {
    let url = closed_port_url().await;

    let err = client(&url).predict(&request()).await.unwrap_err();

    assert!(matches!(err, PredictorError::Unreachable { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_health_probe() {
    let up = CannedServer::start(CannedResponse::json(200, r#"{"status":"ok"}"#)).await;
    assert!(client(&up.base_url()).is_healthy().await);
    assert!(up.requests().await[0].starts_with("GET /health"));

    let failing = CannedServer::start(CannedResponse::json(503, "")).await;
    assert!(!client(&failing.base_url()).is_healthy().await);

    let down = closed_port_url().await;
    assert!(!client(&down).is_healthy().await);
}

#[tokio::test]
async fn test_base_path_is_preserved() {
    let client = client("http://ml-service:8000/api/v1");

    assert_eq!(
        client.predict_url().as_str(),
        "http://ml-service:8000/api/v1/predict"
    );
    assert_eq!(client.endpoint(), "http://ml-service:8000/api/v1");
}
