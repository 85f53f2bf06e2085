//! Command handlers.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use newsdesk_lib::FetchOrchestrator;
use newsdesk_lib::FetchOrchestratorBuilder;
use newsdesk_lib::Outcome;
use newsdesk_lib::auth::AccountClient;
use newsdesk_lib::auth::SessionGuard;
use newsdesk_lib::cache::FreshnessWindow;
use newsdesk_lib::cache::SqliteStore;
use newsdesk_lib::model::Article;
use newsdesk_lib::model::NewsQuery;
use newsdesk_lib::notify::Level;
use newsdesk_lib::notify::Notification;
use newsdesk_lib::source::HttpNewsSource;

use crate::args::CacheCommand;
use crate::args::Cli;
use crate::args::Commands;
use crate::args::Credentials;
use crate::args::RegisterArgs;
use crate::args::SearchArgs;
use crate::args::ShowArgs;
use crate::paths;
use crate::session::SessionFile;

/// Summarisation runs server side and can take minutes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let session = SessionFile::new(paths::session_file().context("no home directory")?);

    match cli.command {
        Commands::Register(args) => register(&cli.api_url, args).await,
        Commands::Login(credentials) => login(&cli.api_url, &session, credentials).await,
        Commands::Logout => logout(&cli.api_url, &session).await,
        Commands::Search(args) => search(&cli.api_url, &session, args).await,
        Commands::Show(args) => show(&cli.api_url, &session, args).await,
        Commands::Cache(command) => cache(&cli.api_url, &session, command).await,
    }
}

async fn register(api_url: &str, args: RegisterArgs) -> Result<ExitCode> {
    let accounts = AccountClient::new(api_url)?;
    accounts
        .register(
            &args.credentials.username,
            &args.email,
            &args.credentials.password,
        )
        .await?;
    eprintln!(
        "Registered {}. Run `newsdesk login` to sign in.",
        args.credentials.username
    );
    Ok(ExitCode::SUCCESS)
}

async fn login(api_url: &str, session: &SessionFile, credentials: Credentials) -> Result<ExitCode> {
    let accounts = AccountClient::new(api_url)?;
    let token = accounts
        .login(&credentials.username, &credentials.password)
        .await?;
    session.save(&token)?;
    eprintln!("Signed in as {}.", credentials.username);
    Ok(ExitCode::SUCCESS)
}

async fn logout(api_url: &str, session: &SessionFile) -> Result<ExitCode> {
    let token = session.load();
    if let Err(e) = AccountClient::new(api_url)?.logout(token.as_ref()).await {
        log::warn!("server logout failed: {}", e);
    }
    session.delete();
    eprintln!("Signed out.");
    Ok(ExitCode::SUCCESS)
}

async fn search(api_url: &str, session: &SessionFile, args: SearchArgs) -> Result<ExitCode> {
    let query = NewsQuery::new(args.stock.trim(), args.num_articles)?;
    let orchestrator = orchestrator(api_url, session).await?;
    let key = orchestrator.key(query.stock());
    let window = FreshnessWindow::from_minutes(args.window_minutes);

    match orchestrator.fetch(&key, query, window).await {
        Outcome::Hit(articles) | Outcome::Fetched(articles) => {
            print_articles(&articles);
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Unauthenticated | Outcome::Failed(_) => Ok(ExitCode::FAILURE),
    }
}

async fn show(api_url: &str, session: &SessionFile, args: ShowArgs) -> Result<ExitCode> {
    let orchestrator = orchestrator(api_url, session).await?;
    let key = orchestrator.key(args.stock.trim());

    match orchestrator
        .peek(&key, FreshnessWindow::from_hours(args.window_hours))
        .await
    {
        Some(envelope) => {
            print_articles(&envelope.payload);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No recent results cached for {}.", key.subject());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn cache(api_url: &str, session: &SessionFile, command: CacheCommand) -> Result<ExitCode> {
    let orchestrator = orchestrator(api_url, session).await?;
    match command {
        CacheCommand::Purge { max_age_hours } => {
            let max_age = FreshnessWindow::from_hours(max_age_hours).duration();
            let purged = orchestrator.purge_expired(max_age).await;
            eprintln!("Purged {} expired entries.", purged);
        }
        CacheCommand::Clear => {
            let cleared = orchestrator.clear().await;
            eprintln!("Cleared {} entries.", cleared);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Wires the orchestrator to the saved session, the on-disk cache and stderr.
async fn orchestrator(
    api_url: &str,
    session: &SessionFile,
) -> Result<FetchOrchestrator<HttpNewsSource>> {
    let on_reauth = session.clone();
    let guard = SessionGuard::new().on_reauth(move || {
        on_reauth.delete();
        eprintln!("Please sign in again with `newsdesk login`.");
    });
    if let Some(token) = session.load() {
        guard.establish(token);
    }
    let guard = Arc::new(guard);

    let source = HttpNewsSource::new(api_url, guard.clone())?.with_timeout(REQUEST_TIMEOUT);
    let db = paths::cache_db().context("no cache directory")?;
    if let Some(parent) = db.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let store = SqliteStore::open(&db)
        .await
        .with_context(|| format!("opening {}", db.display()))?;

    Ok(FetchOrchestratorBuilder::new()
        .source(source)
        .auth(guard)
        .store(store)
        .notifier(print_notification)
        .build())
}

fn print_notification(notification: Notification) {
    let tag = match notification.level {
        Level::Info => "info",
        Level::Success => "ok",
        Level::Warning => "warn",
        Level::Error => "error",
    };
    eprintln!("[{}] {}", tag, notification.message);
}

fn print_articles(articles: &[Article]) {
    for (i, article) in articles.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}. {}", i + 1, article.title);
        println!("   {}", article.url);
        for line in article.summary.lines().filter(|l| !l.trim().is_empty()) {
            println!("   {}", line.trim());
        }
    }
}
