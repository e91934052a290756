mod chat;
mod commands;
mod config;
mod error;
mod trivia;

use std::sync::Arc;

use chat::TelegramChat;
use config::Config;
use dotenv::dotenv;
use teloxide::prelude::*;
use trivia::{
    channels::ChannelRegistry, questions::QuestionBank, round::RoundEngine, scores::ScoreLedger,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Everything a handler needs, shared across updates.
pub struct App {
    pub engine: Arc<RoundEngine>,
    pub registry: ChannelRegistry,
    pub chat: TelegramChat,
    pub bot_name: String,
}

#[tokio::main]
async fn main() {
    // Loaded before the logger so RUST_LOG can live in .env too.
    let env_file = dotenv();

    pretty_env_logger::init();
    log::info!("Starting trivia bot...");
    if let Err(err) = env_file {
        log::info!("No .env file loaded ({}), using the environment as is", err);
    }

    if let Err(err) = run().await {
        log::error!("Failed to start: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> HandlerResult {
    let config = Config::from_env()?;

    let bank = QuestionBank::load(&config.questions_path)?;
    let ledger = match &config.scores_path {
        Some(path) => ScoreLedger::load(path)?,
        None => {
            log::info!("Score persistence disabled");
            ScoreLedger::in_memory()
        }
    };

    let bot = Bot::new(config.token);
    let chat = TelegramChat::new(bot.clone());
    let engine = RoundEngine::new(bank, ledger, Arc::new(chat.clone()), config.round_duration)?;

    let me = bot.get_me().await?;
    log::info!("Logged in as @{}", me.username());

    let app = Arc::new(App {
        engine,
        registry: ChannelRegistry::new(),
        chat,
        bot_name: me.username().to_string(),
    });

    Dispatcher::builder(bot, Update::filter_message().endpoint(handle_message))
        .dependencies(dptree::deps![app])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(bot: Bot, app: Arc<App>, msg: Message) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    if user.is_bot {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let channel = chat::channel_of(&msg);
    let gated = app.registry.is_trivia_channel(channel);

    if text.starts_with('/') {
        return commands::dispatch(&bot, &app, &msg, channel, gated, text).await;
    }

    let sender = chat::sender_of(user);
    let outcome = app.engine.check_answer(gated, channel, &sender, text).await;
    log::trace!("{:?} from {} in {:?}", outcome, sender.id, channel);
    Ok(())
}
