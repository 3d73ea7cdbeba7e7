use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "email-radar",
    version,
    about = "Flags important unread Gmail with a language model"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "default",
        help = "Profile name to use"
    )]
    pub profile: String,
    #[arg(long, global = true, help = "Emit JSON output")]
    pub json: bool,
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Verbose logging")]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Auth(AuthArgs),
    /// Refresh and show unread mail with importance verdicts
    Inbox(InboxArgs),
    /// Mark a message read or as spam
    Mark(MarkArgs),
    /// Refresh on an interval until interrupted
    Watch(WatchArgs),
    /// Answer JSON requests on stdin, one per line
    Serve(ServeArgs),
    Settings(SettingsArgs),
    Cache(CacheArgs),
}

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    Login,
    Status,
    Logout,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("filter").args(["all", "important_only"])))]
pub struct InboxArgs {
    #[arg(long, help = "Unread messages to request (defaults to the batch setting)")]
    pub count: Option<u32>,
    #[arg(long, help = "Show every message, overriding defaultImportantOnly")]
    pub all: bool,
    #[arg(long, help = "Show only important messages")]
    pub important_only: bool,
}

#[derive(Debug, Args)]
pub struct MarkArgs {
    #[command(subcommand)]
    pub command: MarkCommand,
}

#[derive(Debug, Subcommand)]
pub enum MarkCommand {
    Read(MessageIdArgs),
    Spam(MessageIdArgs),
}

#[derive(Debug, Args)]
pub struct MessageIdArgs {
    #[arg(help = "Gmail message id")]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[arg(long, default_value_t = 300, help = "Seconds between refreshes")]
    pub interval_secs: u64,
    #[arg(long, help = "Unread messages to request (defaults to the batch setting)")]
    pub count: Option<u32>,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Also refresh automatically every N seconds")]
    pub poll_secs: Option<u64>,
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set(SettingsSetArgs),
}

#[derive(Debug, Args)]
pub struct SettingsSetArgs {
    #[arg(long, help = "OpenAI API key (empty string clears it)")]
    pub openai_key: Option<String>,
    #[arg(long, help = "Classifier model name")]
    pub model: Option<String>,
    #[arg(long, help = "Send message snippets to the classifier")]
    pub use_snippet: Option<bool>,
    #[arg(long, help = "auto, light or dark")]
    pub theme: Option<String>,
    #[arg(long, help = "Default refresh size: 10, 20, 30 or 50")]
    pub batch: Option<u32>,
    #[arg(long, help = "Show only important messages by default")]
    pub default_important_only: Option<bool>,
}

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Forget cached messages and notified flags
    Clear,
}
