use serde_json::Value;

use crate::tools::ToolOutput;

pub const NOT_FOUND: &str = "City not found";

pub async fn get_weather(
    http_client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    city: &str,
) -> anyhow::Result<ToolOutput> {
    tracing::info!("Looking up weather for {city:?} at {base_url}");
    let response = http_client
        .get(base_url)
        .query(&[("q", city), ("appid", api_key), ("units", "metric")])
        .send()
        .await?;
    tracing::debug!("Weather lookup returned {}", response.status());
    let body: Value = response.json().await?;
    Ok(parse_weather(&body))
}

/// Needs both `main.temp` and `weather[0].description`; anything less is "not found".
pub fn parse_weather(body: &Value) -> ToolOutput {
    let temp = body.pointer("/main/temp").and_then(Value::as_f64);
    let desc = body.pointer("/weather/0/description").and_then(Value::as_str);
    match (temp, desc) {
        (Some(temp), Some(desc)) => ToolOutput::Weather {
            temp,
            desc: desc.to_string(),
        },
        _ => ToolOutput::error(NOT_FOUND),
    }
}
