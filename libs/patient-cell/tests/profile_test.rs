use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use patient_cell::models::{ChasTier, UpsertProfileRequest};
use patient_cell::services::profile::ProfileService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn upsert_request(nric: &str) -> UpsertProfileRequest {
    serde_json::from_value(json!({
        "full_name": "Tan Mei Ling",
        "nric": nric,
        "dob": "1990-06-15",
        "language": "en",
        "chas_tier": "blue"
    }))
    .expect("request payload should deserialize")
}

#[tokio::test]
async fn upsert_sends_hash_and_mask_but_never_the_raw_nric() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();
    let profile_id = Uuid::new_v4().to_string();

    Mock::given(method("POST"))
        .and(path("/rest/v1/patient_profiles"))
        .and(body_partial_json(json!({ "nric_masked": "S*******A" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::patient_profile_row(&profile_id, &user_id, "Tan Mei Ling")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let service = ProfileService::new(&config);

    let profile = service
        .upsert_profile(&user_id, upsert_request("s1234567a"), "test-secret", "token")
        .await
        .expect("upsert should succeed");

    assert_eq!(profile.nric_masked, "S*******A");
    assert_eq!(profile.chas_tier, ChasTier::Unknown);

    // The raw identifier must not appear anywhere in what we sent.
    let requests: Vec<Request> = mock_server.received_requests().await.unwrap();
    for request in &requests {
        let body = String::from_utf8_lossy(&request.body);
        assert!(!body.contains("S1234567A"));
        assert!(!body.contains("s1234567a"));
    }
}

#[tokio::test]
async fn upsert_rejects_a_malformed_nric_without_touching_the_store() {
    let mock_server = MockServer::start().await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let service = ProfileService::new(&config);

    let result = service
        .upsert_profile(&Uuid::new_v4().to_string(), upsert_request("x!"), "test-secret", "token")
        .await;

    assert!(result.is_err());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn upsert_refuses_to_run_without_the_hashing_secret() {
    let mock_server = MockServer::start().await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let service = ProfileService::new(&config);

    let result = service
        .upsert_profile(&Uuid::new_v4().to_string(), upsert_request("S1234567A"), "", "token")
        .await;

    assert!(result.is_err());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_profile_reads_as_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patient_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let service = ProfileService::new(&config);

    let profile = service
        .get_profile(&Uuid::new_v4().to_string(), "token")
        .await
        .expect("lookup should succeed");

    assert!(profile.is_none());
}
