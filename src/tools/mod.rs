use serde::Serialize;

pub mod dictionary;
pub mod executor;
pub mod news;
pub mod prompts;
pub mod weather;

/// Normalized result of a tool call, serialized verbatim into the `tool` message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Weather { temp: f64, desc: String },
    News { headlines: Vec<String> },
    Definition { definition: String },
    Error { error: String },
}

impl ToolOutput {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { error: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_flat_mappings() {
        let weather = ToolOutput::Weather {
            temp: 18.5,
            desc: "light rain".to_string(),
        };
        assert_eq!(weather.to_json().unwrap(), r#"{"temp":18.5,"desc":"light rain"}"#);

        let news = ToolOutput::News {
            headlines: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(news.to_json().unwrap(), r#"{"headlines":["a","b"]}"#);

        let error = ToolOutput::error("Unknown function");
        assert!(error.is_error());
        assert_eq!(error.to_json().unwrap(), r#"{"error":"Unknown function"}"#);
    }
}
