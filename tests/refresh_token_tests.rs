mod support;

use pretty_assertions::assert_eq;
use tokengate::controllers::RefreshTokenController;
use tokengate::error::OAuthError;
use tokengate::storage::Storage;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{secure_memory, test_config, token_response};

#[tokio::test]
async fn exchanges_stored_refresh_token_for_new_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=old-refresh"))
        .and(body_string_contains("client_id=abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response(Some("rotated-refresh"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (secure, secure_storage) = secure_memory();
    secure.set("refresh_token", "old-refresh", None).unwrap();
    let controller = RefreshTokenController::new(None)
        .set_config_provider(test_config(&server.uri()))
        .set_secure_storage_provider(secure_storage);

    let token = controller
        .generate_new_access_token_from_refresh_token()
        .await
        .expect("refresh succeeds");

    assert_eq!(token.access_token(), "fresh-access-token");
    assert_eq!(token.token_type(), "Bearer");
    assert_eq!(token.expires_in(), 3600);
    // The rotated refresh token replaces the old one.
    assert_eq!(
        secure.get("refresh_token").unwrap().as_deref(),
        Some("rotated-refresh")
    );
}

#[tokio::test]
async fn response_without_refresh_token_clears_stored_one() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response(None)))
        .expect(1)
        .mount(&server)
        .await;

    let (secure, secure_storage) = secure_memory();
    secure.set("refresh_token", "old-refresh", None).unwrap();
    let controller = RefreshTokenController::new(None)
        .set_config_provider(test_config(&server.uri()))
        .set_secure_storage_provider(secure_storage);

    let token = controller
        .generate_new_access_token_from_refresh_token()
        .await
        .expect("refresh succeeds");

    assert!(token.refresh_token().is_none());
    assert!(secure.get("refresh_token").unwrap().is_none());
}

#[tokio::test]
async fn missing_refresh_token_is_reported() {
    let (_secure, secure_storage) = secure_memory();
    let controller = RefreshTokenController::new(None)
        .set_config_provider(test_config("https://authorization.example.org"))
        .set_secure_storage_provider(secure_storage);

    let result = controller.generate_new_access_token_from_refresh_token().await;
    match result {
        Err(OAuthError::MissingToken(message)) => {
            assert_eq!(message, "Could not locate a refresh token");
        }
        other => panic!("expected MissingToken, got {other:?}"),
    }
}

#[tokio::test]
async fn revoked_refresh_token_surfaces_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant"
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (secure, secure_storage) = secure_memory();
    secure.set("refresh_token", "revoked-upstream", None).unwrap();
    let controller = RefreshTokenController::new(None)
        .set_config_provider(test_config(&server.uri()))
        .set_secure_storage_provider(secure_storage);

    let result = controller.generate_new_access_token_from_refresh_token().await;
    match result {
        Err(OAuthError::Api { status, .. }) => assert_eq!(status, 400),
        other => panic!("expected Api error, got {other:?}"),
    }
    // The stored token is left in place on failure.
    assert_eq!(
        secure.get("refresh_token").unwrap().as_deref(),
        Some("revoked-upstream")
    );
}
