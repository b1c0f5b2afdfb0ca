use crate::aggregator::{self, TweetRecord};
use crate::color::{Gradient, Rgb};
use crate::error::Result;
use crate::templates;
use crate::views::AppState;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ColoredTweet<'a> {
    #[serde(flatten)]
    pub tweet: &'a TweetRecord,
    pub color: Rgb,
}

#[derive(Debug, Serialize)]
struct TweetsPage<'a> {
    user: &'a str,
    count: u64,
    median_score: Option<f64>,
    tweets: Vec<ColoredTweet<'a>>,
}

pub fn add_color<'a>(tweets: &'a [TweetRecord], gradient: &Gradient) -> Vec<ColoredTweet<'a>> {
    tweets
        .iter()
        .map(|tweet| ColoredTweet {
            tweet,
            color: gradient.color_for(tweet.score),
        })
        .collect()
}

/// Middle value, or the mean of the two middle values for an even count.
pub fn median(scores: &[f64]) -> Option<f64> {
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    match sorted.len() {
        0 => None,
        n if n % 2 == 1 => Some(sorted[mid]),
        _ => Some((sorted[mid - 1] + sorted[mid]) / 2.0),
    }
}

pub async fn render(state: &AppState, handle: &str) -> Result<String> {
    let user_tweets =
        aggregator::fetch_tweets(state.source.as_ref(), state.scorer.as_ref(), handle).await?;
    let scores: Vec<f64> = user_tweets.tweets.iter().map(|t| t.score).collect();

    let page = TweetsPage {
        user: &user_tweets.user,
        count: user_tweets.count,
        median_score: median(&scores),
        tweets: add_color(&user_tweets.tweets, &state.gradient),
    };
    state.templates.render(templates::TWEETS, &page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(score: f64) -> TweetRecord {
        TweetRecord {
            id: "1".to_string(),
            created: Utc::now(),
            retweeted: 0,
            text: "text".to_string(),
            hashtags: vec![],
            urls: vec![],
            mentions: vec![],
            score,
        }
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[-0.5, 0.0, 0.8]), Some(0.0));
        assert_eq!(median(&[0.8, -0.5, 0.0]), Some(0.0));
        assert!((median(&[0.2, 0.4, -1.0, 1.0]).unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(median(&[0.7]), Some(0.7));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_add_color() {
        let gradient = Gradient::red_to_green();
        let tweets = vec![record(-1.0), record(0.0), record(1.0)];
        let colored = add_color(&tweets, &gradient);

        assert_eq!(colored.len(), 3);
        assert_eq!(colored[0].color, Rgb::RED);
        assert_eq!(colored[1].color, gradient.colors()[49]);
        assert_eq!(colored[2].color, Rgb::GREEN);
    }

    #[test]
    fn test_colored_tweet_serializes_flat() {
        let tweets = vec![record(1.0)];
        let colored = add_color(&tweets, &Gradient::red_to_green());
        let value = serde_json::to_value(&colored[0]).unwrap();

        assert_eq!(value["color"], "#008000");
        assert_eq!(value["score"], 1.0);
        assert_eq!(value["text"], "text");
    }
}
