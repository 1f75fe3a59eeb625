//! Headless mechanic client.
//!
//! Signs in, goes online, logs a dashboard summary and then listens on the
//! realtime channel, logging chat messages until Ctrl+C. On shutdown the
//! mechanic is marked offline again.
//!
//! Configuration comes from the environment (and `.env`); see
//! [`AgentConfig::from_env`]. Set `LOG_FORMAT=json` for JSON logs and
//! `RUST_LOG` to adjust verbosity.

mod config;

use std::env;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chat::ConversationBrowser;
use lifecycle::{AccountSession, AppContext};
use realtime::{RealtimeHub, WsConnector};
use report::{CompletedJobsReport, HtmlFileSink};
use roadmate_api::ApiClient;
use roadmate_core::{CallPolicy, InboundEvent, ProfileStore, RealtimeEmitter};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AgentConfig;

/// Pause before re-joining the realtime channel after it drops.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AgentConfig::from_env()?;
    info!(api = %config.api.base_url, socket = %config.realtime.url, "Starting mechanic agent");

    let policy = CallPolicy::new(config.call_timeout);
    let client = ApiClient::new(config.api.clone())?;
    let (writer, reader) = ProfileStore::channel();
    let mut account = AccountSession::new(writer, Arc::new(client.clone())).with_policy(policy);

    let mechanic = match account
        .login(&config.personal_number, &config.password, None)
        .await
    {
        Ok(mechanic) => mechanic,
        Err(e) => {
            error!(error = %e, "Login failed");
            return Err(e.user_message().into());
        }
    };
    info!(mechanic_id = %mechanic.id, "Signed in as {}", mechanic.display_name());

    // Chat endpoints need the session token.
    let client = Arc::new(client.with_token(mechanic.token.clone()));
    account.set_auth(client.clone());

    let hub = RealtimeHub::new(
        Arc::new(WsConnector::new()),
        config.realtime.clone(),
        mechanic.id.clone(),
    );
    let emitter: Arc<dyn RealtimeEmitter> = Arc::new(hub.clone());
    let mut subscription = hub.subscribe().await?;
    account.set_realtime(Some(emitter.clone()));

    if let Err(e) = account.set_online(true).await {
        warn!(error = %e, "Could not go online");
    }

    let ctx = AppContext::from_backend(client.clone(), reader)
        .with_realtime(emitter.clone())
        .with_policy(policy);
    let repository = ctx.repository();
    match repository.dashboard(&mechanic.id).await {
        Ok(summary) => info!(
            active = summary.active,
            completed = summary.completed,
            pending = summary.pending,
            "Dashboard"
        ),
        Err(e) => warn!(error = %e, "Dashboard unavailable"),
    }

    if let Some(dir) = &config.export_dir {
        let completed = repository.list_completed(&mechanic.id, None).await;
        if completed.is_ok() {
            match CompletedJobsReport::new(&completed.items)
                .export(&HtmlFileSink::new(dir))
                .await
            {
                Ok(path) => info!(path = %path.display(), jobs = completed.len(), "Exported completed jobs"),
                Err(e) => warn!(error = %e, "Export failed"),
            }
        }
    }

    let mut browser = ConversationBrowser::new(mechanic.id.clone(), client.clone())
        .with_realtime(emitter)
        .with_policy(policy);
    match browser.load().await {
        Ok(conversations) => info!("{} conversations", conversations.len()),
        Err(e) => warn!(error = %e, "Conversations unavailable"),
    }

    info!("Listening for realtime events (Ctrl+C to stop)");
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
            event = subscription.recv() => match event {
                Some(InboundEvent::GetMessage(chat)) => {
                    info!(sender_id = %chat.sender_id, text = %chat.text, "Chat message");
                    browser.route_incoming(&InboundEvent::GetMessage(chat));
                }
                Some(InboundEvent::Other { name, .. }) => {
                    debug!(event = %name, "Realtime event");
                }
                None => {
                    warn!("Realtime connection lost, rejoining in {:?}", RECONNECT_DELAY);
                    let rejoin = async {
                        tokio::time::sleep(RECONNECT_DELAY).await;
                        hub.subscribe().await
                    };
                    match unless_shutdown(&mut shutdown, rejoin).await {
                        Some(Ok(fresh)) => subscription = fresh,
                        Some(Err(e)) => warn!(error = %e, "Rejoin failed"),
                        None => {
                            info!("Shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }

    if let Err(e) = account.set_online(false).await {
        warn!(error = %e, "Could not go offline");
    }
    drop(subscription);
    account.sign_out();
    Ok(())
}

/// Run `work` to completion unless `shutdown` resolves first.
async fn unless_shutdown<S, F>(shutdown: &mut S, work: F) -> Option<F::Output>
where
    S: Future + Unpin,
    F: Future,
{
    tokio::select! {
        _ = shutdown => None,
        output = work => Some(output),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mechanic_agent=debug"));
    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
