//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command menu registration

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use melocore::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Music Bot commands:")]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "show this help message")]
    Help,
    #[command(description = "download and send a song")]
    Song(String),
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token or invalid BOT_API_URL
pub fn create_bot() -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable not set"));
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(config::BOT_TOKEN.as_str(), client);

    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = reqwest::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(vec![
        BotCommand::new("start", "start the bot"),
        BotCommand::new("help", "show this help message"),
        BotCommand::new("song", "download and send a song"),
    ])
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_song_keeps_whole_query() {
        let cmd = Command::parse("/song Imagine Dragons - Believer", "melobot").unwrap();
        assert_eq!(cmd, Command::Song("Imagine Dragons - Believer".to_string()));
    }

    #[test]
    fn test_descriptions_list_all_commands() {
        let text = Command::descriptions().to_string();
        assert!(text.contains("Music Bot commands:"));
        for name in ["/start", "/help", "/song"] {
            assert!(text.contains(name), "missing {}", name);
        }
    }
}
