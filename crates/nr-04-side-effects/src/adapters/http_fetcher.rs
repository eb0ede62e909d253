//! HTTP Resource Fetcher
//!
//! Implements `ResourceFetcher` as `GET <base URL>/<item name>`, the name
//! appended as a single percent-encoded path segment.

use crate::algorithms::check_item_name;
use crate::domain::{FetchedResource, SideEffectConfig, SideEffectError};
use crate::ports::ResourceFetcher;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

/// Fetches item resources over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpResourceFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpResourceFetcher {
    /// Fetcher for `config.resource_base_url`.
    pub fn new(config: &SideEffectConfig) -> Result<Self, SideEffectError> {
        let base_url = Url::parse(&config.resource_base_url).map_err(|e| SideEffectError::Fetch {
            url: config.resource_base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SideEffectError::Fetch {
                url: config.resource_base_url.clone(),
                reason: "not a hierarchical URL".into(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| SideEffectError::Fetch {
                url: config.resource_base_url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, base_url })
    }

    /// Address of `item_name`'s resource.
    pub fn resource_url(&self, item_name: &str) -> Result<Url, SideEffectError> {
        check_item_name(item_name)?;
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SideEffectError::Fetch {
                url: self.base_url.to_string(),
                reason: "not a hierarchical URL".into(),
            })?
            .pop_if_empty()
            .push(item_name);
        Ok(url)
    }
}

#[async_trait]
impl ResourceFetcher for HttpResourceFetcher {
    async fn fetch(&self, item_name: &str) -> Result<FetchedResource, SideEffectError> {
        let target = self.resource_url(item_name)?;
        let url = target.to_string();
        let fetch_error = |e: reqwest::Error| SideEffectError::Fetch {
            url: url.clone(),
            reason: e.to_string(),
        };

        debug!(%url, "[nr-04] GET");
        let response = self.client.get(target).send().await.map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SideEffectError::FetchStatus {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let payload = response.bytes().await.map_err(fetch_error)?;

        Ok(FetchedResource {
            url,
            content_type,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::get, Router};

    async fn serve() -> String {
        let app = Router::new()
            .route(
                "/cats/nyancat.gif",
                get(|| async { ([("content-type", "image/gif")], "GIF89a") }),
            )
            .route("/cats/gone.gif", get(|| async { StatusCode::NOT_FOUND }))
            .route("/cats/echo/:name", get(|Path(name): Path<String>| async move { name }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/cats/")
    }

    fn fetcher(base: String) -> HttpResourceFetcher {
        HttpResourceFetcher::new(&SideEffectConfig {
            resource_base_url: base,
            fetch_timeout_secs: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let fetcher = fetcher(serve().await);
        let resource = fetcher.fetch("nyancat.gif").await.unwrap();
        assert_eq!(&resource.payload[..], b"GIF89a");
        assert_eq!(resource.content_type.as_deref(), Some("image/gif"));
        assert!(resource.url.ends_with("/cats/nyancat.gif"));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let fetcher = fetcher(serve().await);
        let err = fetcher.fetch("gone.gif").await.unwrap_err();
        assert!(matches!(err, SideEffectError::FetchStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_origin() {
        let fetcher = fetcher("http://127.0.0.1:1/".to_string());
        let err = fetcher.fetch("nyancat.gif").await.unwrap_err();
        assert!(matches!(err, SideEffectError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_item_name_checked_before_request() {
        let fetcher = fetcher("http://127.0.0.1:1/".to_string());
        let err = fetcher.fetch("..").await.unwrap_err();
        assert!(matches!(err, SideEffectError::InvalidItemName(_)));
    }

    #[tokio::test]
    async fn test_name_sent_as_one_encoded_segment() {
        let base = serve().await;
        let fetcher = fetcher(format!("{base}echo/"));

        let resource = fetcher.fetch("100% a b.gif").await.unwrap();

        assert_eq!(&resource.payload[..], b"100% a b.gif");
        assert!(resource.url.ends_with("/cats/echo/100%25%20a%20b.gif"));
    }

    #[test]
    fn test_separators_stay_inside_the_name() {
        let slashed = fetcher("http://127.0.0.1:1/cats/".to_string());
        let url = slashed.resource_url("../a/b?c#d").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:1/cats/..%2Fa%2Fb%3Fc%23d");

        let bare = fetcher("http://127.0.0.1:1/cats".to_string());
        assert_eq!(
            bare.resource_url("nyancat.gif").unwrap().as_str(),
            "http://127.0.0.1:1/cats/nyancat.gif"
        );
    }

    #[test]
    fn test_unparsable_base_refused() {
        let err = HttpResourceFetcher::new(&SideEffectConfig {
            resource_base_url: "not a url".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, SideEffectError::Fetch { .. }));
    }
}
