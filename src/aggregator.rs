use crate::error::Result;
use crate::sentiment::SentimentScorer;
use crate::twitter_client::{api, TwitterClient};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::future::Future;
use tracing::{debug, instrument};

/// Most records fetched for either view, per request.
pub const PAGE_CAP: usize = 100;

/// The slice of the Twitter API the views need. Pages come back as `(items, next_token)`;
/// no token means the listing is exhausted.
#[async_trait]
pub trait TwitterSource: Send + Sync {
    async fn user(&self, handle: &str) -> Result<api::User>;

    async fn tweets_page(
        &self,
        user_id: &str,
        max_results: usize,
        pagination_token: Option<&str>,
    ) -> Result<(Vec<api::Tweet>, Option<String>)>;

    async fn following_page(
        &self,
        user_id: &str,
        max_results: usize,
        pagination_token: Option<&str>,
    ) -> Result<(Vec<api::User>, Option<String>)>;
}

#[async_trait]
impl TwitterSource for TwitterClient {
    async fn user(&self, handle: &str) -> Result<api::User> {
        self.user_by_username(handle).await
    }

    async fn tweets_page(
        &self,
        user_id: &str,
        max_results: usize,
        pagination_token: Option<&str>,
    ) -> Result<(Vec<api::Tweet>, Option<String>)> {
        self.user_tweets(user_id, max_results, pagination_token).await
    }

    async fn following_page(
        &self,
        user_id: &str,
        max_results: usize,
        pagination_token: Option<&str>,
    ) -> Result<(Vec<api::User>, Option<String>)> {
        self.following(user_id, max_results, pagination_token).await
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TweetRecord {
    pub id: String,
    pub created: DateTime<Utc>,
    pub retweeted: u64,
    pub text: String,
    pub hashtags: Vec<String>,
    pub urls: Vec<String>,
    pub mentions: Vec<String>,
    pub score: f64,
}

impl TweetRecord {
    pub fn from_api(tweet: api::Tweet, scorer: &dyn SentimentScorer) -> Self {
        let score = scorer.compound(&tweet.text);
        let entities = tweet.entities.unwrap_or_default();
        Self {
            id: tweet.id,
            created: tweet.created_at,
            retweeted: tweet.public_metrics.map_or(0, |m| m.retweet_count),
            text: tweet.text,
            hashtags: entities.hashtags.into_iter().map(|h| h.tag).collect(),
            urls: entities.urls.into_iter().map(|u| u.url).collect(),
            mentions: entities.mentions.into_iter().map(|m| m.username).collect(),
            score,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserTweets {
    pub user: String,
    /// Total tweets on the account as reported upstream, not the number fetched.
    pub count: u64,
    pub tweets: Vec<TweetRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FollowedAccount {
    pub name: String,
    pub screen_name: String,
    pub followers: u64,
    pub created: Option<NaiveDate>,
    pub image: Option<String>,
}

impl From<api::User> for FollowedAccount {
    fn from(user: api::User) -> Self {
        Self {
            followers: user.public_metrics.map_or(0, |m| m.followers_count),
            created: user.created_at.map(|t| t.date_naive()),
            image: user.profile_image_url,
            name: user.name,
            screen_name: user.username,
        }
    }
}

/// Requests pages until `cap` items are collected or the listing runs out. `fetch` gets
/// the number of items still wanted and the token of the page to fetch.
pub async fn collect_pages<T, F, Fut>(cap: usize, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize, Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>)>>,
{
    let mut items = Vec::new();
    let mut pagination_token = None;

    while items.len() < cap {
        let remaining = cap - items.len();
        let (mut page, next_token) = fetch(remaining, pagination_token.take()).await?;
        // NB: endpoints have a minimum page size, so a page may overshoot what we asked for
        page.truncate(remaining);
        let exhausted = page.is_empty() || next_token.is_none();
        items.append(&mut page);

        if exhausted {
            break;
        }
        pagination_token = next_token;
    }

    Ok(items)
}

#[instrument(skip(source, scorer))]
pub async fn fetch_tweets(
    source: &dyn TwitterSource,
    scorer: &dyn SentimentScorer,
    handle: &str,
) -> Result<UserTweets> {
    let user = source.user(handle).await?;
    let count = user.public_metrics.as_ref().map_or(0, |m| m.tweet_count);

    let tweets = collect_pages(PAGE_CAP, |max_results, token| {
        let user_id = user.id.clone();
        async move {
            source
                .tweets_page(&user_id, max_results, token.as_deref())
                .await
        }
    })
    .await?;
    debug!(fetched = tweets.len(), count, "fetched tweets");

    Ok(UserTweets {
        user: handle.to_string(),
        count,
        tweets: tweets
            .into_iter()
            .map(|tweet| TweetRecord::from_api(tweet, scorer))
            .collect(),
    })
}

/// Unsorted, in the order upstream returned them.
#[instrument(skip(source))]
pub async fn fetch_following(
    source: &dyn TwitterSource,
    handle: &str,
) -> Result<Vec<FollowedAccount>> {
    let user = source.user(handle).await?;

    let accounts = collect_pages(PAGE_CAP, |max_results, token| {
        let user_id = user.id.clone();
        async move {
            source
                .following_page(&user_id, max_results, token.as_deref())
                .await
        }
    })
    .await?;
    debug!(fetched = accounts.len(), "fetched following");

    Ok(accounts.into_iter().map(FollowedAccount::from).collect())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory upstream serving fixed listings in pages of `page_size`.
    pub struct FakeSource {
        pub user: api::User,
        pub tweets: Vec<api::Tweet>,
        pub following: Vec<api::User>,
        pub page_size: usize,
        pub requests: AtomicUsize,
    }

    pub fn user(id: &str, username: &str, followers: u64, tweet_count: u64) -> api::User {
        api::User {
            id: id.to_string(),
            name: format!("{username} name"),
            username: username.to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2010, 3, 4, 5, 6, 7).unwrap()),
            profile_image_url: Some(format!("https://pbs.twimg.com/{username}.jpg")),
            public_metrics: Some(api::UserMetrics {
                followers_count: followers,
                tweet_count,
                ..Default::default()
            }),
        }
    }

    pub fn tweet(id: usize, text: &str) -> api::Tweet {
        api::Tweet {
            id: id.to_string(),
            text: text.to_string(),
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            public_metrics: Some(api::PublicMetrics {
                retweet_count: id as u64,
                ..Default::default()
            }),
            entities: None,
        }
    }

    impl FakeSource {
        pub fn new(tweets: usize, following: Vec<api::User>) -> Self {
            Self {
                user: user("1", "jack", 10, tweets as u64),
                tweets: (0..tweets).map(|i| tweet(i, "just setting up")).collect(),
                following,
                page_size: 20,
                requests: AtomicUsize::new(0),
            }
        }

        fn page<T: Clone>(
            &self,
            items: &[T],
            max_results: usize,
            pagination_token: Option<&str>,
        ) -> (Vec<T>, Option<String>) {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let start: usize = pagination_token.map_or(0, |t| t.parse().unwrap());
            let end = (start + max_results.min(self.page_size)).min(items.len());
            let next_token = (end < items.len()).then(|| end.to_string());
            (items[start..end].to_vec(), next_token)
        }
    }

    #[async_trait]
    impl TwitterSource for FakeSource {
        async fn user(&self, handle: &str) -> Result<api::User> {
            if handle == self.user.username {
                Ok(self.user.clone())
            } else {
                Err(Error::NotFound(handle.to_string()))
            }
        }

        async fn tweets_page(
            &self,
            _user_id: &str,
            max_results: usize,
            pagination_token: Option<&str>,
        ) -> Result<(Vec<api::Tweet>, Option<String>)> {
            Ok(self.page(&self.tweets, max_results, pagination_token))
        }

        async fn following_page(
            &self,
            _user_id: &str,
            max_results: usize,
            pagination_token: Option<&str>,
        ) -> Result<(Vec<api::User>, Option<String>)> {
            Ok(self.page(&self.following, max_results, pagination_token))
        }
    }

    /// Scores every text the same.
    pub struct FixedScore(pub f64);

    impl SentimentScorer for FixedScore {
        fn compound(&self, _text: &str) -> f64 {
            self.0
        }
    }
}
