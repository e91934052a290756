use teloxide::{
    prelude::*,
    utils::command::{BotCommands, ParseError},
};

use crate::chat::{ChatMembers, ChatSink};
use crate::trivia::{scores, ChannelId};
use crate::{App, HandlerResult};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "prints this list.")]
    Help,
    #[command(description = "sets this channel as the chat's trivia channel.")]
    Here,
    #[command(description = "outputs the current bot version.")]
    Version,
    #[command(description = "displays the current score rankings.")]
    Ranking,
    #[command(description = "displays stats about this bot.")]
    Stats,
    #[command(description = "triggers the bot to ask a question.")]
    Start,
}

impl Command {
    pub fn trivia_channel_only(&self) -> bool {
        !matches!(self, Command::Help | Command::Here)
    }
}

/// `/name@bot args` -> `name`
fn command_name(text: &str) -> &str {
    let word = text.split_whitespace().next().unwrap_or_default();
    let word = word.trim_start_matches('/');
    word.split('@').next().unwrap_or(word)
}

/// What to do with a command message.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    Run { command: Command, delete_after: bool },
    Misunderstood(String),
    Ignore,
}

/// Gating rules: only help and here work outside the trivia channel, and
/// unknown commands are only answered inside it.
fn route(parsed: Result<Command, ParseError>, text: &str, gated: bool) -> Route {
    match parsed {
        Ok(command) if command.trivia_channel_only() && !gated => {
            log::debug!("Ignoring {:?} outside the trivia channel", command);
            Route::Ignore
        }
        Ok(command) => Route::Run {
            delete_after: command.trivia_channel_only(),
            command,
        },
        Err(ParseError::UnknownCommand(_)) if gated => Route::Misunderstood(format!(
            "I don't understand the command `{}`",
            command_name(text)
        )),
        Err(ParseError::UnknownCommand(_)) => Route::Ignore,
        Err(err) => {
            log::debug!("Ignoring command {:?}: {:?}", text, err);
            Route::Ignore
        }
    }
}

pub async fn dispatch(
    bot: &Bot,
    app: &App,
    msg: &Message,
    channel: ChannelId,
    gated: bool,
    text: &str,
) -> HandlerResult {
    match route(Command::parse(text, &app.bot_name), text, gated) {
        Route::Run {
            command,
            delete_after,
        } => {
            execute(bot, app, channel, &command).await?;
            if delete_after {
                if let Err(err) = app.chat.delete_message(channel, msg.id.0).await {
                    log::debug!("Could not delete command message: {}", err);
                }
            }
        }
        Route::Misunderstood(reply) => app.chat.send_message(channel, &reply).await?,
        Route::Ignore => {}
    }
    Ok(())
}

async fn execute(bot: &Bot, app: &App, channel: ChannelId, command: &Command) -> HandlerResult {
    match command {
        Command::Help => {
            let help = format!(
                "{}\n\nTo answer a question just type it like normal chatting.",
                Command::descriptions()
            );
            app.chat.send_message(channel, &help).await?;
        }
        Command::Here => {
            app.registry.set_here(channel);
            log::info!("Trivia channel set to {:?}", channel);
            app.chat.send_message(channel, "I'm here!").await?;
        }
        Command::Version => {
            let version = format!("Version: v{}", env!("CARGO_PKG_VERSION"));
            app.chat.send_message(channel, &version).await?;
        }
        Command::Ranking => {
            let directory = ChatMembers::new(bot.clone(), channel);
            let ranking = scores::rank(app.engine.score_entries(), &directory).await;
            if ranking.is_empty() {
                app.chat.send_message(channel, "Nobody has scored yet.").await?;
            } else {
                let table = format!(
                    "Top {} Players:\n{}",
                    scores::NUM_RANKINGS_TO_SHOW,
                    scores::format_ranking(&ranking)
                );
                app.chat.send_preformatted(channel, &table).await?;
            }
        }
        Command::Stats => {
            app.chat.send_preformatted(channel, &stats(app)).await?;
        }
        Command::Start => app.engine.start_round(channel).await,
    }
    Ok(())
}

fn stats(app: &App) -> String {
    let bank = app.engine.bank();
    let mut stats = format!(
        "Number of Valid Questions: {}\nNumber of Invalid Questions: {}\nSeconds per Question: {}\nPlayers with Points: {}\n",
        bank.valid_count(),
        bank.invalid_count(),
        app.engine.round_duration().as_secs(),
        app.engine.player_count(),
    );
    if let Some(round) = app.engine.snapshot() {
        stats.push_str(&format!("Wrong Answers This Round: {}\n", round.wrong_answers));
    }
    stats
}
