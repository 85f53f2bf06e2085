//! CLI argument definitions.

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use newsdesk_lib::DEFAULT_BASE_URL;
use newsdesk_lib::model::DEFAULT_ARTICLES;

/// Newsdesk - summarised stock news with a local cache.
#[derive(Debug, Parser)]
#[command(name = "newsdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the news API
    #[arg(long, global = true, env = "NEWSDESK_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Show debug logging on the terminal
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an account
    Register(RegisterArgs),

    /// Sign in and save the session
    Login(Credentials),

    /// Sign out and forget the session
    Logout,

    /// Search news for a stock, using cached results when fresh
    Search(SearchArgs),

    /// Show cached results for a stock without contacting the server
    Show(ShowArgs),

    /// Manage the local cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Args)]
pub struct Credentials {
    /// Account name
    #[arg(short, long, env = "NEWSDESK_USERNAME")]
    pub username: String,

    /// Account password
    #[arg(short, long, env = "NEWSDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub credentials: Credentials,

    /// Contact email
    #[arg(short, long)]
    pub email: String,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Ticker symbol, e.g. AAPL
    pub stock: String,

    /// Number of articles to request (1-20)
    #[arg(short = 'n', long, default_value_t = DEFAULT_ARTICLES)]
    pub num_articles: u32,

    /// Serve cached results younger than this many minutes
    #[arg(long, default_value_t = 60)]
    pub window_minutes: u64,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Ticker symbol, e.g. AAPL
    pub stock: String,

    /// Show cached results younger than this many hours
    #[arg(long, default_value_t = 24)]
    pub window_hours: u64,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Delete expired entries
    Purge {
        /// Delete entries at least this many hours old
        #[arg(long, default_value_t = 24)]
        max_age_hours: u64,
    },

    /// Delete every entry
    Clear,
}
