use crate::config::Config;
use crate::error::{Error, Result};
use crate::item::{ItemDetail, ItemId, ItemSummary};

mod data;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// The two catalog queries a cycle needs.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// The newest listings, newest first.
    async fn search(&self) -> Result<Vec<ItemSummary>>;

    /// Extended records for the given ids. An empty result is not an error.
    async fn details(&self, ids: &[ItemId]) -> Result<Vec<ItemDetail>>;
}

pub struct Client {
    pub req_client: reqwest::Client,
    api_base: String,
    category: String,
    limit: u32,
    sort_type: u32,
}

impl Client {
    pub fn new(req_client: reqwest::Client, config: &Config) -> Self {
        Self {
            req_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            category: config.category.clone(),
            limit: config.limit,
            sort_type: config.sort_type,
        }
    }

    fn referer(&self) -> String {
        format!("{}/", self.api_base)
    }
}

/// The details endpoint wants numeric ids, anything that does not fit a `u64`
/// is passed through as a string.
fn details_body(ids: &[ItemId]) -> Vec<serde_json::Value> {
    ids.iter()
        .map(|id| match id.as_str().parse::<u64>() {
            Ok(n) => serde_json::Value::from(n),
            Err(_) => serde_json::Value::from(id.as_str()),
        })
        .collect()
}

#[async_trait::async_trait]
impl Catalog for Client {
    #[tracing::instrument(skip(self), fields(category = %self.category))]
    async fn search(&self) -> Result<Vec<ItemSummary>> {
        let url = format!("{}/apisite/catalog/v1/search/items", self.api_base);

        let resp = self
            .req_client
            .get(&url)
            .query(&[
                ("category", self.category.clone()),
                ("limit", self.limit.to_string()),
                ("sortType", self.sort_type.to_string()),
            ])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::REFERER, self.referer())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::debug!("Non Success Response: {:?}", status);
            return Err(Error::Protocol {
                status: status.as_u16(),
            });
        }

        let raw_content = resp.bytes().await?;
        let data: data::SearchResponse = serde_json::from_slice(&raw_content)?;

        Ok(data.into_data())
    }

    #[tracing::instrument(skip(self))]
    async fn details(&self, ids: &[ItemId]) -> Result<Vec<ItemDetail>> {
        let url = format!("{}/apisite/catalog/v1/catalog/items/details", self.api_base);

        let resp = self
            .req_client
            .post(&url)
            .json(&details_body(ids))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::REFERER, self.referer())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::debug!("Non Success Response: {:?}", status);
            return Err(Error::Protocol {
                status: status.as_u16(),
            });
        }

        let raw_content = resp.bytes().await?;
        let data: data::DetailsResponse = serde_json::from_slice(&raw_content)?;

        Ok(data.into_data())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::{get, post};

    use super::*;
    use crate::testing::serve;

    const SEARCH_PATH: &str = "/apisite/catalog/v1/search/items";
    const DETAILS_PATH: &str = "/apisite/catalog/v1/catalog/items/details";

    fn client(base: String, timeout: Duration) -> Client {
        let config = Config {
            api_base: base,
            ..Config::default()
        };
        Client::new(crate::http_client(timeout).unwrap(), &config)
    }

    #[tokio::test]
    async fn search_keeps_max_u64_id_and_sends_query() {
        let app = axum::Router::new().route(
            SEARCH_PATH,
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let expected = [("category", "Collectibles"), ("limit", "5"), ("sortType", "3")];
                if expected
                    .iter()
                    .any(|(k, v)| params.get(*k).map(String::as_str) != Some(*v))
                {
                    return (StatusCode::BAD_REQUEST, "");
                }
                (
                    StatusCode::OK,
                    r#"{"data":[{"id":18446744073709551615,"name":"Max","price":10}]}"#,
                )
            }),
        );
        let base = serve(app).await;

        let items = client(base, Duration::from_secs(5)).search().await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "18446744073709551615");
        assert_eq!(items[0].price, Some(10.0));
    }

    #[tokio::test]
    async fn search_non_success_is_protocol_error() {
        let app = axum::Router::new().route(
            SEARCH_PATH,
            get(|| async { StatusCode::TOO_MANY_REQUESTS }),
        );
        let base = serve(app).await;

        let err = client(base, Duration::from_secs(5)).search().await.unwrap_err();

        assert!(matches!(err, Error::Protocol { status: 429 }));
    }

    #[tokio::test]
    async fn details_non_json_body_is_parse_error() {
        let app = axum::Router::new().route(
            DETAILS_PATH,
            post(|| async { (StatusCode::OK, "<html>maintenance</html>") }),
        );
        let base = serve(app).await;

        let err = client(base, Duration::from_secs(5))
            .details(&[ItemId::parse("1001").unwrap()])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "parse");
    }

    #[tokio::test]
    async fn details_server_error_is_protocol_error() {
        let app = axum::Router::new().route(
            DETAILS_PATH,
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = serve(app).await;

        let err = client(base, Duration::from_secs(5))
            .details(&[ItemId::parse("1001").unwrap()])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Protocol { status: 500 }));
    }

    #[tokio::test]
    async fn details_receives_numeric_ids() {
        let app = axum::Router::new().route(
            DETAILS_PATH,
            post(|axum::Json(ids): axum::Json<Vec<u64>>| async move {
                let data: Vec<_> = ids
                    .iter()
                    .map(|id| serde_json::json!({"id": id, "creatorName": "ROBLOX"}))
                    .collect();
                axum::Json(serde_json::json!({ "data": data }))
            }),
        );
        let base = serve(app).await;

        let details = client(base, Duration::from_secs(5))
            .details(&[ItemId::parse("1001").unwrap()])
            .await
            .unwrap();

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].id.as_str(), "1001");
        assert_eq!(details[0].creator_name.as_deref(), Some("ROBLOX"));
    }

    #[tokio::test]
    async fn slow_search_times_out() {
        let app = axum::Router::new().route(
            SEARCH_PATH,
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                (StatusCode::OK, r#"{"data":[]}"#)
            }),
        );
        let base = serve(app).await;

        let err = client(base, Duration::from_millis(200))
            .search()
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "transport");
        assert!(err.is_timeout());
    }

    #[test]
    fn details_body_prefers_numbers() {
        let ids = [
            ItemId::parse("1001").unwrap(),
            ItemId::parse("123456789012345678901234567890").unwrap(),
        ];

        assert_eq!(
            serde_json::to_string(&details_body(&ids)).unwrap(),
            r#"[1001,"123456789012345678901234567890"]"#
        );
    }
}
