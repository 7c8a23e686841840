use anyhow::Result;
use portfolio_chat_core::{
    build_backend, Config, KnowledgeContext, KnowledgeLoader, ModelClient, PromptBuilder,
    WidgetController,
};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use logging::Logger;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable config: {}", e);
        Config::new()
    });

    let log_path = Config::config_dir()?.join("portfolio-chat.log");
    Logger::init(config.log_level.as_deref(), &log_path)?;

    // Knowledge loads in the background; sends fail gracefully until it lands
    let knowledge = KnowledgeContext::new();
    KnowledgeLoader::new(config.knowledge_source(), knowledge.clone()).load();

    let provider = config.provider();
    let model = config.model();
    let api_key = config.api_key_for(provider);
    if api_key.is_none() {
        log::warn!(
            "no API key for {}; set {} or add it to the config file",
            provider.display_name(),
            provider.api_key_env()
        );
    }

    let client = ModelClient::new(build_backend(provider, api_key, &model))
        .with_timeout(config.request_timeout());
    let widget = WidgetController::new(
        &config.greeting(),
        knowledge.clone(),
        PromptBuilder::new(config.owner_name()),
        client,
    );

    log::info!("starting with {} model {}", provider.as_str(), model);
    let mut app = App::new(widget, provider, model, knowledge);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}
