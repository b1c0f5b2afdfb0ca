/// Produces a compound polarity score in [-1, 1] for a piece of text.
pub trait SentimentScorer: Send + Sync {
    fn compound(&self, text: &str) -> f64;
}

/// VADER, tuned for social media text.
#[derive(Clone, Copy, Debug, Default)]
pub struct Vader;

impl SentimentScorer for Vader {
    fn compound(&self, text: &str) -> f64 {
        // CR-someday: the analyzer only borrows static lexicons, but it would still be nice to
        // build it once per batch instead of once per tweet
        let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
        analyzer
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
    }
}
