use crate::error::Result;
use serde::Serialize;
use tera::{Context, Tera};

pub const TWEETS: &str = "tweets.html";
pub const FOLLOWING: &str = "following.html";
pub const ERROR: &str = "error.html";

/// HTML templates, compiled into the binary.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            (TWEETS, include_str!("../templates/tweets.html")),
            (FOLLOWING, include_str!("../templates/following.html")),
            (ERROR, include_str!("../templates/error.html")),
        ])?;
        Ok(Self { tera })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        let context = Context::from_serialize(data)?;
        Ok(self.tera.render(name, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_templates_compile() {
        Templates::new().unwrap();
    }

    #[test]
    fn test_error_page_escapes() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render(
                ERROR,
                &json!({"status": 404, "title": "Not Found", "message": "<script>"}),
            )
            .unwrap();
        assert!(html.contains("<h1>Not Found</h1>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_tweets_page_without_median() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render(
                TWEETS,
                &json!({"user": "jack", "count": 0, "median_score": null, "tweets": []}),
            )
            .unwrap();
        assert!(html.contains("Median sentiment:"));
        assert!(html.contains("n/a"));
    }
}
