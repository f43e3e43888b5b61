// src/api/query.rs
// =============================================================================
// Queries a JSON search API with a POST request.
//
// Some sites expose the same backend their search box uses. Calling it
// directly returns structured results instead of HTML to parse.
// =============================================================================

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub endpoint: String,
    pub search_term: String,
    pub page: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.food.com/external/v1/nlp/search".to_string(),
            search_term: "Toast".to_string(),
            page: 1,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    search_term: &'a str,
    // page number
    pn: u32,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    response: QueryResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub results: Vec<Value>,
    pub total_results_count: u64,
}

pub async fn run_query(client: &Client, config: &QueryConfig) -> Result<QueryResult> {
    let body = QueryBody {
        search_term: &config.search_term,
        pn: config.page,
    };

    let envelope: Envelope = client
        .post(&config.endpoint)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("query to {} failed", config.endpoint))?
        .error_for_status()?
        .json()
        .await
        .context("unexpected query response shape")?;

    let result = envelope.response;
    info!(
        "found {} results from {} total",
        result.results.len(),
        result.total_results_count
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_query_posts_term_and_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/search")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "searchTerm": "Toast", "pn": 2 })))
            .with_status(200)
            .with_body(
                json!({
                    "response": {
                        "results": [{ "title": "French toast" }, { "title": "Avocado toast" }],
                        "totalResultsCount": 2246
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let config = QueryConfig {
            endpoint: format!("{}/search", server.url()),
            page: 2,
            ..QueryConfig::default()
        };
        let result = run_query(&Client::new(), &config).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.total_results_count, 2246);
    }

    #[tokio::test]
    async fn test_query_rejects_unexpected_shape() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/search")
            .with_status(200)
            .with_body(r#"{"error": "rate limited"}"#)
            .create_async()
            .await;

        let config = QueryConfig {
            endpoint: format!("{}/search", server.url()),
            ..QueryConfig::default()
        };
        assert!(run_query(&Client::new(), &config).await.is_err());
    }
}
