//! OAuth2 client-credentials token acquisition against Azure AD.

use crate::config::{Config, Credentials};
use crate::error::AuthError;
use crate::secure::SecureString;
use anyhow::{Context, Result};
use tracing::{debug, error, info};

/// OAuth2 client for the Azure AD v1 token endpoint.
pub struct OAuth2Client {
    login_base_url: String,
    resource: String,
    http_client: reqwest::Client,
}

impl OAuth2Client {
    /// Create a new OAuth2 client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .connect_timeout(config.http_connect_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            login_base_url: config.identity.login_base_url.clone(),
            resource: config.identity.resource.clone(),
            http_client,
        })
    }

    fn token_endpoint(&self, tenant_id: &str) -> String {
        format!("{}/{}/oauth2/token", self.login_base_url, tenant_id)
    }

    /// Exchange the application's own credentials for a bearer token.
    ///
    /// Any status other than 200 is logged with its headers and body and
    /// reported as [`AuthError::UnexpectedStatus`]; nothing is retried.
    pub async fn client_credentials_token(
        &self,
        credentials: &Credentials,
    ) -> Result<SecureString, AuthError> {
        info!("Start getting Microsoft Azure AD login token");

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("resource", self.resource.as_str()),
        ];

        let token_endpoint = self.token_endpoint(&credentials.tenant_id);
        debug!("Requesting token from {}", token_endpoint);

        // `form` sets Content-Type: application/x-www-form-urlencoded.
        let response = self
            .http_client
            .post(token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(AuthError::RequestFailed)?;

        let status = response.status();
        if status.as_u16() != 200 {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP Call was not okay. HTTP Status: {}", status.as_u16());
            error!("Headers are: {:?}", headers);
            error!("Body is: {}", body);
            return Err(AuthError::UnexpectedStatus(status.as_u16()));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ParseFailed(e.to_string()))?;

        Ok(SecureString::new(token_response.access_token))
    }
}

/// Token response from the Azure AD v1 endpoint.
///
/// Only `access_token` is required; v1 reports `expires_in` as a string, and
/// it is never looked at anyway.
#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::LogCapture;
    use wiremock::matchers::{body_string_contains, header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(login_base_url: &str) -> Config {
        let mut config = Config::embedded().unwrap();
        config.identity.login_base_url = login_base_url.to_string();
        config
    }

    fn test_credentials() -> Credentials {
        Credentials {
            client_id: "client-123".into(),
            client_secret: SecureString::from("s3cret".to_string()),
            tenant_id: "tenant-abc".into(),
        }
    }

    #[test]
    fn test_token_endpoint_doubled_separator() {
        let client = OAuth2Client::new(&test_config("https://login.microsoftonline.com/")).unwrap();
        assert_eq!(
            client.token_endpoint("tenant-abc"),
            "https://login.microsoftonline.com//tenant-abc/oauth2/token"
        );
    }

    #[tokio::test]
    async fn test_token_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"/tenant-abc/oauth2/token$"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=client-123"))
            .and(body_string_contains("client_secret=s3cret"))
            .and(body_string_contains("resource=https%3A%2F%2Fgraph.microsoft.com%2F"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": "3599",
                "access_token": "X"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuth2Client::new(&test_config(&format!("{}/", server.uri()))).unwrap();
        let token = client
            .client_credentials_token(&test_credentials())
            .await
            .unwrap();

        assert_eq!(token.as_str(), "X");
    }

    #[tokio::test]
    async fn test_token_non_200() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_client"
            })))
            .mount(&server)
            .await;

        let logs = LogCapture::default();
        let _guard = logs.install();

        let client = OAuth2Client::new(&test_config(&format!("{}/", server.uri()))).unwrap();
        let result = client.client_credentials_token(&test_credentials()).await;

        assert!(matches!(result, Err(AuthError::UnexpectedStatus(401))));

        let output = logs.contents();
        assert!(output.contains("HTTP Call was not okay. HTTP Status: 401"));
        assert!(output.contains("Headers are:"));
        assert!(output.contains("content-type"));
        assert!(output.contains(r#"Body is: {"error":"invalid_client"}"#));
    }

    #[tokio::test]
    async fn test_token_follows_redirect() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"/tenant-abc/oauth2/token$"))
            .respond_with(
                ResponseTemplate::new(307)
                    .insert_header("location", format!("{}/moved/token", server.uri()).as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/moved/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "moved" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuth2Client::new(&test_config(&format!("{}/", server.uri()))).unwrap();
        let token = client
            .client_credentials_token(&test_credentials())
            .await
            .unwrap();

        assert_eq!(token.as_str(), "moved");
    }

    #[tokio::test]
    async fn test_token_other_2xx_is_not_accepted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = OAuth2Client::new(&test_config(&format!("{}/", server.uri()))).unwrap();
        let result = client.client_credentials_token(&test_credentials()).await;

        assert!(matches!(result, Err(AuthError::UnexpectedStatus(204))));
    }

    #[tokio::test]
    async fn test_token_missing_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "token_type": "Bearer" })),
            )
            .mount(&server)
            .await;

        let client = OAuth2Client::new(&test_config(&format!("{}/", server.uri()))).unwrap();
        let result = client.client_credentials_token(&test_credentials()).await;

        assert!(matches!(result, Err(AuthError::ParseFailed(_))));
    }
}
