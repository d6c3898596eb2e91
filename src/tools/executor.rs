use serde::de::DeserializeOwned;

use crate::{
    config::ToolSettings,
    tools::{
        ToolOutput,
        dictionary,
        news,
        prompts::{
            DefinitionArgs,
            GET_DEFINITION,
            GET_NEWS,
            GET_WEATHER,
            NewsArgs,
            WeatherArgs,
        },
        weather,
    },
};

pub const UNKNOWN_FUNCTION: &str = "Unknown function";

pub struct ToolExecutor {
    http_client: reqwest::Client,
    settings: ToolSettings,
}

impl ToolExecutor {
    pub fn new(settings: ToolSettings) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http_client, settings })
    }

    /// Runs the tool `name` with the raw JSON `arguments` the model produced.
    ///
    /// Unknown names and unusable arguments never fail; only the lookup itself can.
    pub async fn run_function_tool(&self, name: &str, arguments: &str) -> anyhow::Result<ToolOutput> {
        let start = tokio::time::Instant::now();
        tracing::info!("Executing tool {name}");
        tracing::debug!("  {arguments}");
        let output = match name {
            GET_WEATHER => {
                let args: WeatherArgs = parse_args(arguments);
                weather::get_weather(
                    &self.http_client,
                    &self.settings.weather_url,
                    &self.settings.weather_api_key,
                    &args.city,
                )
                .await?
            }
            GET_NEWS => {
                let args: NewsArgs = parse_args(arguments);
                news::get_news(
                    &self.http_client,
                    &self.settings.news_url,
                    &self.settings.news_api_key,
                    &args.topic,
                )
                .await?
            }
            GET_DEFINITION => {
                let args: DefinitionArgs = parse_args(arguments);
                dictionary::get_definition(&self.http_client, &self.settings.dictionary_url, &args.word).await?
            }
            _ => {
                tracing::warn!("Model asked for unknown tool {name}");
                ToolOutput::error(UNKNOWN_FUNCTION)
            }
        };
        tracing::info!("Finished in {:?}", start.elapsed());
        tracing::debug!("  {output:?}");
        Ok(output)
    }
}

fn parse_args<T: DeserializeOwned + Default>(arguments: &str) -> T {
    serde_json::from_str(arguments).unwrap_or_else(|e| {
        tracing::warn!("Ignoring malformed tool arguments {arguments:?}: {e}");
        T::default()
    })
}
