use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "melobot")]
#[command(author, version, about = "Telegram bot that finds songs by name and sends them as MP3", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Resolve and download one song without Telegram
    Fetch {
        /// Free-text song query, e.g. "Imagine Dragons - Believer"
        query: String,

        /// Directory to copy the MP3 into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["melobot"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_fetch_with_output() {
        let cli = Cli::try_parse_from(["melobot", "fetch", "Shape of You", "-o", "/tmp/music"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Fetch {
                query: "Shape of You".to_string(),
                output: Some(PathBuf::from("/tmp/music")),
            })
        );
    }
}
