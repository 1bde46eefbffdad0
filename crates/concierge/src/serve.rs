// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `concierge serve` command implementation.
//!
//! Opens the SQLite store, builds the realtime feed and the desk, and runs
//! the gateway until SIGINT/SIGTERM. Backends are shut down in reverse
//! order of creation.

use std::sync::Arc;

use concierge_bus::MessageFeed;
use concierge_config::ConciergeConfig;
use concierge_core::{Backend, ConciergeError, TransitionPolicy};
use concierge_desk::Desk;
use concierge_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig};
use concierge_storage::SqliteStore;
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs the `concierge serve` command.
pub async fn run_serve(config: ConciergeConfig) -> Result<(), ConciergeError> {
    init_tracing(&config.app.log_level);

    info!(name = %config.app.name, "starting concierge serve");

    let store = Arc::new(SqliteStore::open(config.storage.clone()).await?);
    let feed = Arc::new(MessageFeed::from_config(&config.realtime));
    if !config.realtime.enabled {
        warn!("realtime disabled by configuration; conversations will not update live");
    }

    let policy = TransitionPolicy::from_strict_flag(config.workflow.strict_transitions);
    let desk = Desk::from_store(Arc::clone(&store), feed.clone()).with_policy(policy);
    info!(?policy, "desk ready");

    let backends = vec![store.clone() as Arc<dyn Backend>, feed.clone() as Arc<dyn Backend>];
    let state = GatewayState {
        desk,
        auth: AuthConfig {
            proxy_token: config.gateway.proxy_token.clone(),
        },
        health: HealthState::new(backends),
    };
    if state.auth.proxy_token.is_none() {
        warn!("gateway.proxy_token is not set; x-user-id is trusted from any caller");
    }

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    let cancel = shutdown::install_signal_handler();
    let served = concierge_gateway::start_server(&server_config, state, cancel).await;

    if let Err(e) = feed.shutdown().await {
        error!(error = %e, "feed shutdown failed");
    }
    if let Err(e) = store.shutdown().await {
        error!(error = %e, "storage shutdown failed");
    }

    served?;
    info!("concierge serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides `app.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "concierge={log_level},concierge_desk={log_level},concierge_gateway={log_level},\
             concierge_storage={log_level},concierge_bus={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
