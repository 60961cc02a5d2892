use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vidgrab")]
#[command(author, version, about = "Telegram bot for downloading video and audio from the web", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Print metadata and available formats for a URL, then exit
    Info {
        /// The media URL to inspect
        url: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
