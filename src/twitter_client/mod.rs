pub mod api;
pub mod oauth;
pub mod rate_limit;

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::twitter_client::oauth::{percent_encode, OAuthSigner};
use crate::twitter_client::rate_limit::RateLimitInfo;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use hyper::client::HttpConnector;
use hyper::header::AUTHORIZATION;
use hyper::{Body, Client, Method, Request, StatusCode};
use hyper_tls::HttpsConnector;
use nonzero_ext::nonzero;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, instrument, warn};
use url::Url;

const USER_FIELDS: &str = "created_at,profile_image_url,public_metrics";
const TWEET_FIELDS: &str = "created_at,public_metrics,entities";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    /// Upper bound on `max_results` per request; the endpoints clamp it further.
    pub page_size: usize,
    pub requests_per_minute: NonZeroU32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.twitter.com".to_string(),
            page_size: 100,
            requests_per_minute: nonzero!(60u32),
        }
    }
}

/// Twitter API v2 client, signed with OAuth 1.0a user context.
///
/// Rate limits never surface as errors: calls are paced by a process-wide limiter, and a
/// 429 from upstream blocks the caller until the advertised reset before retrying.
#[derive(Clone)]
pub struct TwitterClient {
    https_client: Client<HttpsConnector<HttpConnector>>,
    api_url: Url,
    page_size: usize,
    signer: OAuthSigner,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl TwitterClient {
    pub fn new(credentials: Credentials, config: &ClientConfig) -> Result<Self> {
        let https = HttpsConnector::new();
        let https_client = Client::builder().build::<_, hyper::Body>(https);

        // NB: `Url::join` drops the last path segment unless the base ends with a slash
        let mut api_url = Url::parse(&config.api_url)?;
        if !api_url.path().ends_with('/') {
            api_url.set_path(&format!("{}/", api_url.path()));
        }

        Ok(Self {
            https_client,
            api_url,
            page_size: config.page_size.max(1),
            signer: OAuthSigner::new(credentials),
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(
                config.requests_per_minute,
            ))),
        })
    }

    #[instrument(skip(self))]
    pub async fn user_by_username(&self, username: &str) -> Result<api::User> {
        let path = format!("2/users/by/username/{}", percent_encode(username));
        let params = vec![("user.fields".to_string(), USER_FIELDS.to_string())];

        let resp: api::Response<api::User> = match self.get(&path, params).await {
            Err(Error::Api { status: 404, .. }) => return Err(Error::NotFound(username.to_string())),
            other => other?,
        };

        match (resp.data, resp.errors) {
            (Some(user), _) => Ok(user),
            (None, Some(errors)) if errors.iter().any(|e| e.is_not_found()) => {
                Err(Error::NotFound(username.to_string()))
            }
            (None, errors) => Err(Error::Api {
                status: 200,
                message: errors
                    .and_then(|errors| errors.first().map(api::ApiError::message))
                    .unwrap_or_else(|| "user lookup returned no data".to_string()),
            }),
        }
    }

    /// One page of a user's most recent tweets, newest first.
    #[instrument(skip(self))]
    pub async fn user_tweets(
        &self,
        user_id: &str,
        max_results: usize,
        pagination_token: Option<&str>,
    ) -> Result<(Vec<api::Tweet>, Option<String>)> {
        let max_results = max_results.min(self.page_size).clamp(5, 100);
        let mut params = vec![
            ("max_results".to_string(), max_results.to_string()),
            ("tweet.fields".to_string(), TWEET_FIELDS.to_string()),
        ];
        if let Some(pagination_token) = pagination_token {
            params.push(("pagination_token".to_string(), pagination_token.to_string()));
        }

        let path = format!("2/users/{}/tweets", percent_encode(user_id));
        let resp: api::Response<Vec<api::Tweet>> = self.get(&path, params).await?;
        Ok(page_of(resp))
    }

    /// One page of the accounts a user follows.
    #[instrument(skip(self))]
    pub async fn following(
        &self,
        user_id: &str,
        max_results: usize,
        pagination_token: Option<&str>,
    ) -> Result<(Vec<api::User>, Option<String>)> {
        let max_results = max_results.min(self.page_size).clamp(1, 1000);
        let mut params = vec![
            ("max_results".to_string(), max_results.to_string()),
            ("user.fields".to_string(), USER_FIELDS.to_string()),
        ];
        if let Some(pagination_token) = pagination_token {
            params.push(("pagination_token".to_string(), pagination_token.to_string()));
        }

        let path = format!("2/users/{}/following", percent_encode(user_id));
        let resp: api::Response<Vec<api::User>> = self.get(&path, params).await?;
        Ok(page_of(resp))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<api::Response<T>> {
        let url = self.api_url.join(path)?;
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let uri = if query.is_empty() {
            url.to_string()
        } else {
            format!("{url}?{query}")
        };

        loop {
            self.limiter.until_ready().await;

            // NB: the nonce and timestamp must be fresh on every attempt
            let authorization = self.signer.sign("GET", url.as_str(), &params)?;
            let req = Request::builder()
                .method(Method::GET)
                .uri(&uri)
                .header(AUTHORIZATION, authorization)
                .body(Body::empty())?;

            debug!(%url, "twitter request");
            let resp = self.https_client.request(req).await?;
            let status = resp.status();
            let rate_limit = RateLimitInfo::from_headers(resp.headers());

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = rate_limit.wait_duration(SystemTime::now());
                warn!(%url, wait_secs = wait.as_secs(), "rate limited, waiting for reset");
                tokio::time::sleep(wait).await;
                continue;
            }
            if rate_limit.is_exhausted() {
                debug!(%url, reset = ?rate_limit.reset, "rate limit window exhausted");
            }

            let body = hyper::body::to_bytes(resp.into_body()).await?;
            if !status.is_success() {
                return Err(Error::Api {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
            }
            return Ok(serde_json::from_slice(&body)?);
        }
    }
}

fn page_of<T>(resp: api::Response<Vec<T>>) -> (Vec<T>, Option<String>) {
    let next_token = resp.meta.and_then(|meta| meta.next_token);
    (resp.data.unwrap_or_default(), next_token)
}

fn error_message(body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        title: Option<String>,
        detail: Option<String>,
        errors: Option<Vec<api::ApiError>>,
    }

    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { detail: Some(detail), .. }) => detail,
        Ok(ErrorBody { errors: Some(errors), .. }) if !errors.is_empty() => errors[0].message(),
        Ok(ErrorBody { title: Some(title), .. }) => title,
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(br#"{"title": "Unauthorized", "detail": "Unauthorized", "status": 401}"#),
            "Unauthorized"
        );
        assert_eq!(
            error_message(br#"{"errors": [{"message": "x", "title": "Invalid Request", "detail": "bad id"}]}"#),
            "bad id"
        );
        assert_eq!(error_message(b"Service Unavailable"), "Service Unavailable");
    }

    #[test]
    fn test_api_url_keeps_base_path() {
        let config = ClientConfig {
            api_url: "http://localhost:9000/proxy".to_string(),
            ..Default::default()
        };
        let client = TwitterClient::new(Credentials::parse("k, s, t, ts").unwrap(), &config).unwrap();
        assert_eq!(
            client.api_url.join("2/users/1/tweets").unwrap().as_str(),
            "http://localhost:9000/proxy/2/users/1/tweets"
        );
    }
}
