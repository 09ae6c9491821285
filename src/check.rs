//! The active-user check: guard the inputs, get a token, search, report.

use serde::Serialize;
use tracing::{debug, error, info};

use crate::auth::oauth::OAuth2Client;
use crate::config::{Config, Credentials};
use crate::directory::{is_account_enabled, GraphClient, UserQuery, UserRecord};
use crate::error::{AppError, CredentialsError};
use crate::event::InvocationEvent;

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub username: String,
    /// Records Graph returned for the search, enabled or not.
    pub returned: usize,
    /// Records counted as enabled.
    pub enabled: usize,
    /// The verdict line that gets logged.
    pub verdict: String,
}

impl CheckOutcome {
    /// Tally a search result. Fails if a record has no `accountEnabled`.
    pub fn from_records(username: &str, records: &[UserRecord]) -> Result<Self, AppError> {
        let mut enabled = 0;
        for record in records {
            if is_account_enabled(record)? {
                enabled += 1;
            }
        }

        let verdict = verdict_line(username, records.len(), enabled);

        Ok(Self {
            username: username.to_string(),
            returned: records.len(),
            enabled,
            verdict,
        })
    }

    pub fn has_active_user(&self) -> bool {
        self.enabled > 0
    }

    pub fn message(&self) -> &str {
        &self.verdict
    }
}

/// Verdict line for a search.
///
/// The positive branch reports `returned`, not `enabled`: a search that
/// hits one enabled and one disabled account reads "contains 2".
fn verdict_line(username: &str, returned: usize, enabled: usize) -> String {
    if enabled > 0 {
        format!(
            "The AzureAD contains {} active user with the email {}",
            returned, username
        )
    } else {
        format!(
            "The AzureAD DOES NOT contain an active user with the email {}",
            username
        )
    }
}

/// Run the check for `event`, reading credentials through `lookup`.
///
/// Both guards (username, credentials) are evaluated before any client is
/// built, so a failed guard never touches the network.
pub async fn run_check(
    config: &Config,
    event: &InvocationEvent,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<CheckOutcome, AppError> {
    let username = event
        .username()
        .inspect_err(|e| error!("{}", e))?
        .to_string();

    let credentials = Credentials::from_lookup(lookup).inspect_err(|e| {
        let CredentialsError::Missing { variable } = e;
        error!("{}", e);
        debug!("Environment variable {} is not set", variable);
    })?;

    let oauth_client =
        OAuth2Client::new(config).map_err(|e| AppError::Config(format!("{:#}", e)))?;
    let graph_client =
        GraphClient::new(config).map_err(|e| AppError::Config(format!("{:#}", e)))?;

    let token = oauth_client.client_credentials_token(&credentials).await?;

    let query = UserQuery::new(
        config.graph.search_attribute.as_str(),
        username.as_str(),
        config.graph.select.iter().map(String::as_str),
    );
    let records = graph_client.search_users(&query, token.as_str()).await?;
    drop(token);

    let outcome = CheckOutcome::from_records(&username, &records)?;
    info!("{}", outcome.message());

    Ok(outcome)
}
