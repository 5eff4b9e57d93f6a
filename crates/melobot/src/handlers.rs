//! Dispatcher schema and command handlers

use std::path::Path;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{InputFile, Message, MessageId, ReplyParameters};

use melocore::{DownloadResult, Orchestrator};

use crate::bot::Command;
use crate::messages;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub orchestrator: Orchestrator,
    pub performer: String,
}

impl HandlerDeps {
    pub fn new(orchestrator: Orchestrator, performer: impl Into<String>) -> Self {
        Self {
            orchestrator,
            performer: performer.into(),
        }
    }
}

/// Creates the dispatcher schema for the bot.
///
/// Only commands are handled; any other update falls through to the
/// dispatcher's default handler.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move { handle_command(&bot, &msg, cmd, &deps).await }
        },
    ))
}

async fn handle_command(bot: &Bot, msg: &Message, cmd: Command, deps: &HandlerDeps) -> Result<(), HandlerError> {
    log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);

    match cmd {
        Command::Start => {
            reply(bot, msg, messages::WELCOME).await?;
        }
        Command::Help => {
            reply(bot, msg, messages::HELP).await?;
        }
        Command::Song(query) => {
            handle_song(bot, msg, deps, &query).await?;
        }
    }

    Ok(())
}

async fn reply(bot: &Bot, msg: &Message, text: &str) -> Result<Message, teloxide::RequestError> {
    bot.send_message(msg.chat.id, text)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await
}

/// Runs one song request and reports progress by editing a single status message.
async fn handle_song(bot: &Bot, msg: &Message, deps: &HandlerDeps, query: &str) -> Result<(), HandlerError> {
    let query = query.trim();
    if query.is_empty() {
        reply(bot, msg, messages::SONG_USAGE).await?;
        return Ok(());
    }

    let status = reply(bot, msg, &messages::searching(query)).await?;

    match deps.orchestrator.handle_query(query).await {
        DownloadResult::Success { file_path, title } => {
            let delivered = deliver(bot, msg, status.id, deps, &file_path, &title).await;
            deps.orchestrator.area().remove(&file_path);

            if let Err(e) = delivered {
                log::error!("Failed to send '{}' to chat {}: {}", title, msg.chat.id, e);
                bot.edit_message_text(msg.chat.id, status.id, messages::send_failed(&e))
                    .await?;
            }
        }
        DownloadResult::Failure { reason } => {
            bot.edit_message_text(msg.chat.id, status.id, messages::failure(&reason))
                .await?;
        }
    }

    Ok(())
}

async fn deliver(
    bot: &Bot,
    msg: &Message,
    status_id: MessageId,
    deps: &HandlerDeps,
    file_path: &Path,
    title: &str,
) -> Result<(), teloxide::RequestError> {
    bot.edit_message_text(msg.chat.id, status_id, messages::UPLOADING)
        .await?;

    bot.send_audio(msg.chat.id, InputFile::file(file_path))
        .title(title)
        .performer(deps.performer.as_str())
        .caption(messages::caption(title))
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    log::info!("⬆️ Sent '{}' to chat {}", title, msg.chat.id);

    if let Err(e) = bot.delete_message(msg.chat.id, status_id).await {
        log::warn!("Failed to delete status message: {}", e);
    }

    Ok(())
}
