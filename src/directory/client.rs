//! Microsoft Graph API client for the users search.

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use super::models::{UserQuery, UserRecord, UsersResponse};
use crate::config::Config;
use crate::error::ApiError;

/// Microsoft Graph API client.
pub struct GraphClient {
    users_url: String,
    http_client: reqwest::Client,
}

impl GraphClient {
    /// Create a new Graph client.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .connect_timeout(config.http_connect_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            users_url: config.users_url(),
            http_client,
        })
    }

    /// Full request URL for a query.
    pub fn search_url(&self, query: &UserQuery) -> String {
        format!("{}?{}", self.users_url, query.query_string())
    }

    /// Run one user search and return the `value` array as received.
    ///
    /// Only the first page is read.
    pub async fn search_users(
        &self,
        query: &UserQuery,
        access_token: &str,
    ) -> Result<Vec<UserRecord>, ApiError> {
        info!(
            "Getting users with attributes from Azure AD for attribute {} with value {}",
            query.search_attribute, query.search_value
        );

        let url = self.search_url(query);
        debug!("Searching users at {}", url);

        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(ApiError::RequestFailed)?;

        let status = response.status();
        match status.as_u16() {
            200 => {
                let body: UsersResponse = response
                    .json()
                    .await
                    .map_err(|e| ApiError::ParseFailed(e.to_string()))?;

                debug!("Graph returned {} user records", body.value.len());
                Ok(body.value)
            }
            status => {
                let headers = response.headers().clone();
                let body = response.text().await.unwrap_or_default();
                error!(
                    "HTTP Call to get user attributes was not okay. HTTP Status: {}",
                    status
                );
                error!("Headers are: {:?}", headers);
                error!("Body is: {}", body);
                Err(ApiError::UnexpectedStatus(status))
            }
        }
    }
}
