//! Contract tests for the authority client against a simulated
//! verification authority.
//!
//! These tests use wiremock to stand in for the live authority. Every
//! path, header, request shape, and reply shape the client relies on is
//! pinned here.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/api/verifyPresentation` | `verify_presentation_*` |
//! | POST   | `/api/verifyNoPresentation` | `verify_no_presentation_*` |
//! | POST   | `/api/verifyEncryptedPresentation` | `verify_encrypted_*` |

use std::time::Duration;

use credex_authority_client::{
    AuthorityClient, AuthorityConfig, AuthorityError, VerifyEncryptedPresentationBody,
    VerifyNoPresentationBody, VerifyPresentationBody,
};
use credex_core::{
    Credential, EncryptedData, EncryptedKey, NoPresentation, Presentation, ProtocolVersion,
    VerdictKind,
};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a client pointed at a wiremock server.
fn test_client(mock_server: &MockServer) -> AuthorityClient {
    let config = AuthorityConfig::local_mock(mock_server.uri().parse().unwrap());
    AuthorityClient::new(config).unwrap()
}

fn sample_presentation(request_id: Uuid) -> Presentation {
    Presentation {
        context: vec!["https://www.w3.org/2018/credentials/v1".into()],
        types: vec!["VerifiablePresentation".into()],
        presentation_request_id: request_id,
        verifiable_credentials: vec![Credential {
            context: vec![],
            types: vec!["VerifiableCredential".into(), "EmailCredential".into()],
            id: "cred-1".into(),
            issuer: "did:cx:issuer-1".into(),
            credential_subject: serde_json::json!({"id": "did:cx:subject-1"}),
            credential_status: None,
            issuance_date: None,
            expiration_date: None,
            proof: None,
        }],
        proof: None,
    }
}

fn sample_no_presentation(request_id: Uuid) -> NoPresentation {
    NoPresentation {
        types: vec!["NoPresentation".into()],
        presentation_request_id: request_id,
        holder: "did:cx:holder-1".into(),
        proof: None,
    }
}

fn sample_encrypted() -> EncryptedData {
    EncryptedData {
        data: "Y2lwaGVydGV4dA==".into(),
        key: EncryptedKey {
            iv: "aXY=".into(),
            ephemeral_public_key: "ZXBr".into(),
            encrypted_key: "d3JhcHBlZA==".into(),
            algorithm: "RSA-OAEP".into(),
        },
    }
}

// ── POST /api/verifyPresentation ─────────────────────────────────────

#[tokio::test]
async fn verify_presentation_sends_correct_path_and_parses_verdict() {
    let mock_server = MockServer::start().await;
    let request_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/api/verifyPresentation"))
        .and(body_partial_json(serde_json::json!({
            "verifier": "did:cx:verifier-1"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("x-auth-token", "reissued-token")
                .set_body_json(serde_json::json!({
                    "isVerified": true,
                    "type": "VerifiablePresentation",
                    "presentation": sample_presentation(request_id)
                })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = VerifyPresentationBody {
        presentation: sample_presentation(request_id),
        verifier: "did:cx:verifier-1".into(),
    };
    let version = ProtocolVersion::parse("1.2.0").unwrap();

    let reply = client
        .verify_presentation(&body, "stored-token", &version)
        .await
        .unwrap();

    assert!(reply.verdict.is_verified);
    assert_eq!(reply.verdict.kind, Some(VerdictKind::VerifiablePresentation));
    let presentation = reply.verdict.presentation.unwrap();
    assert_eq!(presentation.presentation_request_id, request_id);
    assert_eq!(reply.rotated_token.as_deref(), Some("reissued-token"));
}

#[tokio::test]
async fn verify_presentation_normalizes_raw_token_to_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verifyPresentation"))
        .and(header("authorization", "Bearer raw-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "isVerified": true,
            "type": "NoPresentation"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = VerifyPresentationBody {
        presentation: sample_presentation(Uuid::new_v4()),
        verifier: "did:cx:verifier-1".into(),
    };

    client
        .verify_presentation(&body, "raw-token", &ProtocolVersion::oldest_supported())
        .await
        .unwrap();
}

#[tokio::test]
async fn verify_presentation_keeps_already_prefixed_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verifyPresentation"))
        .and(header("authorization", "Bearer stored-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "isVerified": true,
            "type": "NoPresentation"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = VerifyPresentationBody {
        presentation: sample_presentation(Uuid::new_v4()),
        verifier: "did:cx:verifier-1".into(),
    };

    client
        .verify_presentation(
            &body,
            "Bearer stored-token",
            &ProtocolVersion::oldest_supported(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn verify_presentation_forwards_version_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verifyPresentation"))
        .and(header("version", "1.3.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "isVerified": true,
            "type": "NoPresentation"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = VerifyPresentationBody {
        presentation: sample_presentation(Uuid::new_v4()),
        verifier: "did:cx:verifier-1".into(),
    };

    client
        .verify_presentation(&body, "tok", &ProtocolVersion::parse("1.3.7").unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn verify_presentation_rejection_carries_rotated_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verifyPresentation"))
        .respond_with(
            ResponseTemplate::new(400)
                .append_header("x-auth-token", "reissued-after-reject")
                .set_body_string(r#"{"isVerified":false,"message":"proof invalid"}"#),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = VerifyPresentationBody {
        presentation: sample_presentation(Uuid::new_v4()),
        verifier: "did:cx:verifier-1".into(),
    };

    let result = client
        .verify_presentation(&body, "tok", &ProtocolVersion::oldest_supported())
        .await;

    match result.unwrap_err() {
        AuthorityError::Api {
            status,
            body,
            rotated_token,
            ..
        } => {
            assert_eq!(status, 400);
            assert!(body.contains("proof invalid"));
            assert_eq!(rotated_token.as_deref(), Some("reissued-after-reject"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn verify_presentation_malformed_success_body_is_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verifyPresentation"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = VerifyPresentationBody {
        presentation: sample_presentation(Uuid::new_v4()),
        verifier: "did:cx:verifier-1".into(),
    };

    let result = client
        .verify_presentation(&body, "tok", &ProtocolVersion::oldest_supported())
        .await;
    assert!(matches!(
        result.unwrap_err(),
        AuthorityError::Deserialization { .. }
    ));
}

#[tokio::test]
async fn verify_presentation_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verifyPresentation"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_json(serde_json::json!({"isVerified": true})),
        )
        .mount(&mock_server)
        .await;

    let config = AuthorityConfig {
        base_url: mock_server.uri().parse().unwrap(),
        timeout_secs: 1,
    };
    let client = AuthorityClient::new(config).unwrap();
    let body = VerifyPresentationBody {
        presentation: sample_presentation(Uuid::new_v4()),
        verifier: "did:cx:verifier-1".into(),
    };

    let result = client
        .verify_presentation(&body, "tok", &ProtocolVersion::oldest_supported())
        .await;

    match result.unwrap_err() {
        AuthorityError::Http { source, .. } => assert!(source.is_timeout()),
        other => panic!("expected Http error, got: {other:?}"),
    }
}

// ── POST /api/verifyNoPresentation ───────────────────────────────────

#[tokio::test]
async fn verify_no_presentation_sends_correct_path_and_body() {
    let mock_server = MockServer::start().await;
    let request_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/api/verifyNoPresentation"))
        .and(body_partial_json(serde_json::json!({
            "noPresentation": { "holder": "did:cx:holder-1" },
            "verifier": "did:cx:verifier-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "isVerified": true,
            "type": "NoPresentation",
            "presentation": sample_no_presentation(request_id)
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = VerifyNoPresentationBody {
        no_presentation: sample_no_presentation(request_id),
        verifier: "did:cx:verifier-1".into(),
    };

    let reply = client
        .verify_no_presentation(&body, "tok", &ProtocolVersion::oldest_supported())
        .await
        .unwrap();

    assert!(reply.verdict.is_verified);
    assert_eq!(reply.verdict.kind, Some(VerdictKind::NoPresentation));
    assert!(reply.rotated_token.is_none());
}

// ── POST /api/verifyEncryptedPresentation ────────────────────────────

#[tokio::test]
async fn verify_encrypted_sends_encryption_key_and_parses_v2_presentation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verifyEncryptedPresentation"))
        .and(body_partial_json(serde_json::json!({
            "verifier": "did:cx:verifier-1",
            "encryptionPrivateKey": "pem-encoded-key"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("x-auth-token", "rotated")
                .set_body_json(serde_json::json!({
                    "isVerified": true,
                    "type": "VerifiablePresentation",
                    "presentation": {
                        "@context": ["https://www.w3.org/2018/credentials/v1"],
                        "type": ["VerifiablePresentation"],
                        "verifiableCredential": [{
                            "@context": [],
                            "type": ["VerifiableCredential", "DobCredential"],
                            "id": "cred-2",
                            "issuer": "did:cx:issuer-1#key-1",
                            "credentialSubject": "{\"id\":\"did:cx:subject-1\"}"
                        }]
                    }
                })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = VerifyEncryptedPresentationBody {
        encrypted_presentation: sample_encrypted(),
        verifier: "did:cx:verifier-1".into(),
        encryption_private_key: "pem-encoded-key".into(),
    };

    let reply = client
        .verify_encrypted_presentation(&body, "tok", &ProtocolVersion::parse("2.0.0").unwrap())
        .await
        .unwrap();

    let presentation = reply.verdict.presentation.unwrap();
    assert_eq!(presentation.verifiable_credential.len(), 1);
    assert_eq!(
        presentation.verifiable_credential[0].subject_did().as_deref(),
        Some("did:cx:subject-1")
    );
    assert_eq!(reply.rotated_token.as_deref(), Some("rotated"));
}

#[tokio::test]
async fn verify_encrypted_declined_verdict_parses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verifyEncryptedPresentation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "isVerified": true,
            "type": "Declined",
            "presentation": {
                "@context": [],
                "type": ["DeclinedPresentation"],
                "verifiableCredential": []
            }
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = VerifyEncryptedPresentationBody {
        encrypted_presentation: sample_encrypted(),
        verifier: "did:cx:verifier-1".into(),
        encryption_private_key: "pem".into(),
    };

    let reply = client
        .verify_encrypted_presentation(&body, "tok", &ProtocolVersion::parse("2.1.0").unwrap())
        .await
        .unwrap();

    assert_eq!(reply.verdict.kind, Some(VerdictKind::Declined));
    assert!(reply
        .verdict
        .presentation
        .unwrap()
        .verifiable_credential
        .is_empty());
}

#[tokio::test]
async fn authority_5xx_is_api_error_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verifyEncryptedPresentation"))
        .respond_with(ResponseTemplate::new(500).set_body_string("authority exploded"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = VerifyEncryptedPresentationBody {
        encrypted_presentation: sample_encrypted(),
        verifier: "did:cx:verifier-1".into(),
        encryption_private_key: "pem".into(),
    };

    match client
        .verify_encrypted_presentation(&body, "tok", &ProtocolVersion::parse("2.0.0").unwrap())
        .await
        .unwrap_err()
    {
        AuthorityError::Api {
            status,
            rotated_token,
            ..
        } => {
            assert_eq!(status, 500);
            assert!(rotated_token.is_none());
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
