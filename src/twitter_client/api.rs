use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope of every v2 response. `data` is absent on empty pages and on lookups that
/// failed with a soft error (e.g. unknown username), in which case `errors` is set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Response<Data> {
    pub data: Option<Data>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<ApiError>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Meta {
    pub next_token: Option<String>,
    #[serde(default)]
    pub result_count: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub title: Option<String>,
    pub detail: Option<String>,
    pub r#type: Option<String>,
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        self.r#type
            .as_deref()
            .map_or(false, |t| t.ends_with("resource-not-found"))
            || self.title.as_deref() == Some("Not Found Error")
    }

    pub fn message(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub created_at: Option<DateTime<Utc>>,
    pub profile_image_url: Option<String>,
    pub public_metrics: Option<UserMetrics>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserMetrics {
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub tweet_count: u64,
    #[serde(default)]
    pub listed_count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub public_metrics: Option<PublicMetrics>,
    pub entities: Option<Entities>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<Hashtag>,
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hashtag {
    pub tag: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UrlEntity {
    pub url: String,
    pub expanded_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mention {
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_timeline_page() {
        let body = r#"{
            "data": [{
                "id": "1",
                "text": "hello #rust @ferris https://t.co/x",
                "created_at": "2023-02-01T12:00:00.000Z",
                "public_metrics": {"retweet_count": 3, "reply_count": 0, "like_count": 9, "quote_count": 0},
                "entities": {
                    "hashtags": [{"start": 6, "end": 11, "tag": "rust"}],
                    "mentions": [{"start": 12, "end": 19, "username": "ferris", "id": "7"}],
                    "urls": [{"start": 20, "end": 33, "url": "https://t.co/x", "expanded_url": "https://rust-lang.org"}]
                }
            }],
            "meta": {"result_count": 1, "next_token": "abc"}
        }"#;
        let resp: Response<Vec<Tweet>> = serde_json::from_str(body).unwrap();
        let tweets = resp.data.unwrap();
        let entities = tweets[0].entities.as_ref().unwrap();
        assert_eq!(entities.hashtags[0].tag, "rust");
        assert_eq!(entities.mentions[0].username, "ferris");
        assert_eq!(entities.urls[0].url, "https://t.co/x");
        assert_eq!(resp.meta.unwrap().next_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_decode_empty_page() {
        let resp: Response<Vec<Tweet>> =
            serde_json::from_str(r#"{"meta": {"result_count": 0}}"#).unwrap();
        assert!(resp.data.is_none());
        assert!(resp.meta.unwrap().next_token.is_none());
    }

    #[test]
    fn test_not_found_error() {
        let body = r#"{"errors": [{
            "value": "nobody_here_",
            "detail": "Could not find user with username: [nobody_here_].",
            "title": "Not Found Error",
            "resource_type": "user",
            "parameter": "username",
            "type": "https://api.twitter.com/2/problems/resource-not-found"
        }]}"#;
        let resp: Response<User> = serde_json::from_str(body).unwrap();
        assert!(resp.data.is_none());
        assert!(resp.errors.unwrap()[0].is_not_found());
    }
}
