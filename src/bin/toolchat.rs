use std::io::Stdout;

use clap::Parser;
use ratatui::prelude::CrosstermBackend;
use tokio::{
    sync::mpsc,
    task::JoinSet,
};
use toolchat::{
    config::Config,
    llm_provider::LLMProvider,
    orchestrator::{
        Orchestrator,
        TurnEvent,
    },
    server,
    tools::executor::ToolExecutor,
    ui,
};

async fn start_session(
    terminal: ratatui::Terminal<CrosstermBackend<Stdout>>,
    prompt: Option<String>,
    orchestrator: Orchestrator,
) -> anyhow::Result<()> {
    let (ui_tx, ui_rx) = mpsc::unbounded_channel();
    let (control_tx, control_rx) = mpsc::unbounded_channel();

    let mut join_set = JoinSet::new();
    join_set.spawn(ui::ui_loop(terminal, ui_rx, control_tx, prompt));
    join_set.spawn(server::server_loop(ui_tx, control_rx, orchestrator));

    let first_result = join_set.join_next().await;
    if let Some(Ok(Err(e))) = first_result {
        tracing::error!("Task failed: {e:?}");
    }
    join_set.abort_all();
    while let Some(result) = join_set.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::error!("Task failed: {e:?}");
        }
    }
    tracing::info!("Session ended");

    anyhow::Ok(())
}

async fn answer_once(prompt: &str, orchestrator: &Orchestrator) -> anyhow::Result<()> {
    let reply = orchestrator
        .llm_chat(prompt, |event| {
            if let TurnEvent::ToolCallCompleted(invocation) = event {
                eprintln!("tool: {}({})", invocation.name, invocation.arguments);
            }
        })
        .await?;
    println!("{}", reply.text);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::path::Path::new(".env").exists() {
        dotenvy::dotenv()?;
    }
    let config = Config::parse();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let llm_provider = LLMProvider::new(config.llm_settings())?;
    let executor = ToolExecutor::new(config.tool_settings())?;
    let orchestrator = Orchestrator::new(llm_provider, executor);

    if config.print {
        let prompt = config.prompt.as_deref().unwrap_or_default();
        return answer_once(prompt, &orchestrator).await;
    }

    let terminal = ratatui::init();
    let result = start_session(terminal, config.prompt, orchestrator).await;
    ratatui::restore();

    result
}
