pub mod config;
pub mod control;
pub mod llm_provider;
pub mod markdown_render;
pub mod orchestrator;
pub mod prompts;
pub mod server;
pub mod syntax_highlight;
pub mod tools;
pub mod types;
pub mod ui;
pub mod ui_state;
