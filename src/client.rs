// src/client.rs
// =============================================================================
// Builds the single HTTP client each command uses.
//
// A reqwest::Client holds a connection pool, so we create exactly one per
// run and clone it into tasks (cloning only bumps a reference count). The
// pool is closed when the last clone is dropped at the end of the command.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

// A desktop browser user agent; primitive bot filters reject the default
// reqwest one.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:92.0) Gecko/20100101 Firefox/92.0";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

pub fn build_client(options: &ClientOptions) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(options.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(5));

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().context("Failed to create HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_sends_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header("user-agent", DEFAULT_USER_AGENT)
            .with_status(200)
            .create_async()
            .await;

        let client = build_client(&ClientOptions::default()).unwrap();
        let response = client.get(server.url()).send().await.unwrap();

        assert_eq!(response.status().as_u16(), 200);
        mock.assert_async().await;
    }
}
