#![allow(dead_code)]

use serde_json::{
    Value,
    json,
};
use toolchat::{
    config::{
        LLMSettings,
        ToolSettings,
    },
    llm_provider::LLMProvider,
    orchestrator::Orchestrator,
    tools::executor::ToolExecutor,
};
use wiremock::{
    Match,
    MockServer,
    Request,
};

pub const DEPLOYMENT: &str = "gpt-4o-mini";
pub const API_VERSION: &str = "2024-06-01";
pub const API_KEY: &str = "llm-key";
pub const WEATHER_KEY: &str = "weather-key";
pub const NEWS_KEY: &str = "news-key";

pub fn completions_path() -> String {
    format!("/openai/deployments/{DEPLOYMENT}/chat/completions")
}

pub fn llm_settings(server: &MockServer) -> LLMSettings {
    LLMSettings {
        api_key: API_KEY.to_string(),
        api_version: API_VERSION.to_string(),
        endpoint: server.uri(),
        deployment: DEPLOYMENT.to_string(),
    }
}

pub fn tool_settings(server: &MockServer) -> ToolSettings {
    ToolSettings {
        weather_api_key: WEATHER_KEY.to_string(),
        news_api_key: NEWS_KEY.to_string(),
        weather_url: format!("{}/weather", server.uri()),
        news_url: format!("{}/news", server.uri()),
        dictionary_url: format!("{}/entries/en", server.uri()),
    }
}

pub fn executor(server: &MockServer) -> ToolExecutor {
    ToolExecutor::new(tool_settings(server)).unwrap()
}

pub fn orchestrator(server: &MockServer) -> Orchestrator {
    let llm_provider = LLMProvider::new(llm_settings(server)).unwrap();
    Orchestrator::new(llm_provider, executor(server))
}

pub fn text_completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-text",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": DEPLOYMENT,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop",
        }],
        "usage": {"prompt_tokens": 80, "completion_tokens": 12, "total_tokens": 92},
    })
}

pub fn tool_call_completion(calls: &[(&str, &str, &str)]) -> Value {
    let tool_calls: Vec<Value> = calls
        .iter()
        .map(|(id, name, arguments)| {
            json!({
                "id": id,
                "type": "function",
                "function": {"name": name, "arguments": arguments},
            })
        })
        .collect();
    json!({
        "id": "chatcmpl-tools",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": DEPLOYMENT,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": null, "tool_calls": tool_calls},
            "finish_reason": "tool_calls",
        }],
        "usage": {"prompt_tokens": 120, "completion_tokens": 18, "total_tokens": 138},
    })
}

/// Matches completion requests by whether they offer tools.
pub struct OffersTools(pub bool);

impl Match for OffersTools {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return false;
        };
        body.get("tools").is_some() == self.0
    }
}

pub async fn completion_requests(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == completions_path())
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}
