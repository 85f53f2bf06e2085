//! Cached search example.
//!
//! Signs in, searches twice and shows that the second search is served from
//! the cache.
//!
//! Run with: cargo run --example cached_search
//!
//! Requires .env file with:
//! - NEWSDESK_API_URL
//! - NEWSDESK_USERNAME
//! - NEWSDESK_PASSWORD

use std::env;
use std::sync::Arc;
use std::time::Duration;

use newsdesk_lib::FetchOrchestratorBuilder;
use newsdesk_lib::auth::AccountClient;
use newsdesk_lib::auth::SessionGuard;
use newsdesk_lib::cache::FreshnessWindow;
use newsdesk_lib::model::NewsQuery;
use newsdesk_lib::notify::Notification;
use newsdesk_lib::source::HttpNewsSource;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let url = env::var("NEWSDESK_API_URL").expect("NEWSDESK_API_URL not set");
    let username = env::var("NEWSDESK_USERNAME").expect("NEWSDESK_USERNAME not set");
    let password = env::var("NEWSDESK_PASSWORD").expect("NEWSDESK_PASSWORD not set");

    println!("Signing in...\n");
    let token = AccountClient::new(&url)?.login(&username, &password).await?;
    println!("Session expires at: {:?}", token.expires_at);

    let guard = Arc::new(SessionGuard::with_token(token));
    let orchestrator = FetchOrchestratorBuilder::new()
        .source(HttpNewsSource::new(&url, guard.clone())?.with_timeout(Duration::from_secs(300)))
        .auth(guard)
        .notifier(|n: Notification| println!("[{}] {}", n.level, n.message))
        .build();

    let query = NewsQuery::new("AAPL", 3)?;
    let key = orchestrator.key(query.stock());

    for _ in 0..2 {
        let outcome = orchestrator
            .fetch(&key, query.clone(), FreshnessWindow::ON_SEARCH)
            .await;
        if let Some(articles) = outcome.payload() {
            for article in articles {
                println!("  - {}", article.title);
            }
        }
        println!();
    }

    Ok(())
}
