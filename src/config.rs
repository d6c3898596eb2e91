use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_NEWS_URL: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_DICTIONARY_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

#[derive(Debug, Clone, Parser)]
#[command(name = "toolchat")]
#[command(about = "Ask about the weather, the news or what a word means")]
pub struct Config {
    /// The user prompt/query (optional)
    pub prompt: Option<String>,

    /// Answer the prompt once on stdout instead of starting the chat UI
    #[arg(long, requires = "prompt")]
    pub print: bool,

    /// The completion service API key
    #[arg(long, env = "AZURE_OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// The completion service API version
    #[arg(long, env = "AZURE_OPENAI_VERSION")]
    pub api_version: String,

    /// The completion service base URL
    #[arg(long, env = "AZURE_OPENAI_ENDPOINT")]
    pub endpoint: String,

    /// The deployment (model) to send completions to
    #[arg(long, env = "AZURE_OPENAI_DEPLOYMENT_NAME")]
    pub deployment: String,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHERMAP_API_KEY", hide_env_values = true)]
    pub weather_api_key: String,

    /// NewsAPI API key
    #[arg(long, env = "NEWSAPI_API_KEY", hide_env_values = true)]
    pub news_api_key: String,

    #[arg(long, env = "WEATHER_API_URL", default_value = DEFAULT_WEATHER_URL, hide = true)]
    pub weather_url: String,

    #[arg(long, env = "NEWS_API_URL", default_value = DEFAULT_NEWS_URL, hide = true)]
    pub news_url: String,

    #[arg(long, env = "DICTIONARY_API_URL", default_value = DEFAULT_DICTIONARY_URL, hide = true)]
    pub dictionary_url: String,

    /// Where to write logs (defaults to toolchat.log in the temp directory)
    #[arg(long, env = "TOOLCHAT_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn llm_settings(&self) -> LLMSettings {
        LLMSettings {
            api_key: self.api_key.clone(),
            api_version: self.api_version.clone(),
            endpoint: self.endpoint.clone(),
            deployment: self.deployment.clone(),
        }
    }

    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            weather_api_key: self.weather_api_key.clone(),
            news_api_key: self.news_api_key.clone(),
            weather_url: self.weather_url.clone(),
            news_url: self.news_url.clone(),
            dictionary_url: self.dictionary_url.clone(),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("toolchat.log"))
    }
}

#[derive(Debug, Clone)]
pub struct LLMSettings {
    pub api_key: String,
    pub api_version: String,
    pub endpoint: String,
    pub deployment: String,
}

impl LLMSettings {
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint.trim_end_matches('/'),
            self.deployment
        )
    }
}

#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub weather_api_key: String,
    pub news_api_key: String,
    pub weather_url: String,
    pub news_url: String,
    pub dictionary_url: String,
}

impl ToolSettings {
    pub fn with_keys(weather_api_key: impl Into<String>, news_api_key: impl Into<String>) -> Self {
        Self {
            weather_api_key: weather_api_key.into(),
            news_api_key: news_api_key.into(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            news_url: DEFAULT_NEWS_URL.to_string(),
            dictionary_url: DEFAULT_DICTIONARY_URL.to_string(),
        }
    }
}
