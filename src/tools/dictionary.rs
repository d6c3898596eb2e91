use reqwest::Url;
use serde_json::Value;

use crate::tools::ToolOutput;

pub const NOT_FOUND: &str = "Definition not found";

pub async fn get_definition(http_client: &reqwest::Client, base_url: &str, word: &str) -> anyhow::Result<ToolOutput> {
    let url = entry_url(base_url, word)?;
    tracing::info!("Looking up definition of {word:?} at {url}");
    let response = http_client.get(url).send().await?;
    tracing::debug!("Dictionary lookup returned {}", response.status());
    let body: Value = response.json().await?;
    Ok(parse_definition(&body))
}

/// Appends `word` to `base_url` as a single, percent-encoded path segment.
pub fn entry_url(base_url: &str, word: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(base_url)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Dictionary URL cannot take a path: {base_url}"))?
        .pop_if_empty()
        .push(word);
    Ok(url)
}

/// Only an array of entries counts; the API answers unknown words with an object.
pub fn parse_definition(body: &Value) -> ToolOutput {
    if !body.is_array() {
        return ToolOutput::error(NOT_FOUND);
    }
    match body
        .pointer("/0/meanings/0/definitions/0/definition")
        .and_then(Value::as_str)
    {
        Some(definition) => ToolOutput::Definition {
            definition: definition.to_string(),
        },
        None => ToolOutput::error(NOT_FOUND),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn takes_the_first_sense() {
        let body = json!([{
            "word": "serendipity",
            "meanings": [{
                "partOfSpeech": "noun",
                "definitions": [
                    {"definition": "An unsought, unintended, and/or unexpected, but fortunate, discovery."},
                    {"definition": "A second sense."},
                ],
            }],
        }]);
        assert_eq!(
            parse_definition(&body),
            ToolOutput::Definition {
                definition: "An unsought, unintended, and/or unexpected, but fortunate, discovery.".to_string()
            }
        );
    }

    #[test]
    fn unknown_word_is_not_found() {
        let body = json!({
            "title": "No Definitions Found",
            "message": "Sorry pal, we couldn't find definitions for the word you were looking for.",
        });
        assert_eq!(parse_definition(&body), ToolOutput::error(NOT_FOUND));
    }

    #[test]
    fn entries_without_definitions_are_not_found() {
        assert_eq!(parse_definition(&json!([])), ToolOutput::error(NOT_FOUND));
        assert_eq!(
            parse_definition(&json!([{"word": "x", "meanings": []}])),
            ToolOutput::error(NOT_FOUND)
        );
    }

    #[test]
    fn word_becomes_one_path_segment() {
        let url = entry_url("https://api.dictionaryapi.dev/api/v2/entries/en", "ice cream").unwrap();
        assert_eq!(url.as_str(), "https://api.dictionaryapi.dev/api/v2/entries/en/ice%20cream");

        let url = entry_url("http://127.0.0.1:9000/entries/en/", "a/b").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/entries/en/a%2Fb");
    }
}
