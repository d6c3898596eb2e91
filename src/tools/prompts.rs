use async_openai::types::{
    ChatCompletionTool,
    ChatCompletionToolType,
    FunctionObject,
};
use serde::Deserialize;
use serde_json::json;

pub const GET_WEATHER: &str = "get_weather";
pub const GET_NEWS: &str = "get_news";
pub const GET_DEFINITION: &str = "get_definition";

pub fn all_tools() -> Vec<ChatCompletionTool> {
    vec![weather_tool(), news_tool(), definition_tool()]
}

fn string_arg_tool(name: &str, description: &str, arg: &str) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: name.to_string(),
            description: Some(description.to_string()),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    arg: { "type": "string" }
                },
                "required": [arg],
            })),
            strict: None,
        },
    }
}

pub fn weather_tool() -> ChatCompletionTool {
    string_arg_tool(GET_WEATHER, "Get weather for a city", "city")
}

#[derive(Debug, Default, Deserialize)]
pub struct WeatherArgs {
    #[serde(default)]
    pub city: String,
}

pub fn news_tool() -> ChatCompletionTool {
    string_arg_tool(GET_NEWS, "Get news headlines about a topic", "topic")
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsArgs {
    #[serde(default)]
    pub topic: String,
}

pub fn definition_tool() -> ChatCompletionTool {
    string_arg_tool(GET_DEFINITION, "Get definition of an English word", "word")
}

#[derive(Debug, Default, Deserialize)]
pub struct DefinitionArgs {
    #[serde(default)]
    pub word: String,
}
