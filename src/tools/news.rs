use serde_json::Value;

use crate::tools::ToolOutput;

pub const NOT_FOUND: &str = "No news found";
const MAX_HEADLINES: usize = 3;

pub async fn get_news(
    http_client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    topic: &str,
) -> anyhow::Result<ToolOutput> {
    tracing::info!("Looking up news about {topic:?} at {base_url}");
    let response = http_client
        .get(base_url)
        .query(&[("q", topic), ("apiKey", api_key)])
        .send()
        .await?;
    tracing::debug!("News lookup returned {}", response.status());
    let body: Value = response.json().await?;
    Ok(parse_news(&body))
}

pub fn parse_news(body: &Value) -> ToolOutput {
    let headlines: Vec<String> = body
        .get("articles")
        .and_then(Value::as_array)
        .map(|articles| {
            articles
                .iter()
                .take(MAX_HEADLINES)
                .filter_map(|article| article.get("title").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if headlines.is_empty() {
        return ToolOutput::error(NOT_FOUND);
    }
    ToolOutput::News { headlines }
}
