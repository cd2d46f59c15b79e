use async_trait::async_trait;
use domain::consensus;
use domain::gateway::catalog;
use domain::involvement;
use events::channel::ChannelRegistry;
use events::{DomainEvent, EventHandler, EventPublisher};
use log::{error, info};
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;
use tokio::time::{interval, Duration};

/// Event handler standing in for the delivery subsystem: resolves the
/// channels an event would fan out to and logs the routing decision.
struct ChannelRoutingHandler {
    registry: ChannelRegistry,
}

#[async_trait]
impl EventHandler for ChannelRoutingHandler {
    async fn handle(&self, event: &DomainEvent) {
        let channels = self.registry.route(event);
        info!("Domain event {event:?} routed to channels {channels:?}");
    }
}

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!("Starting Data Case Platform worker...");

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config, &db);
    let publisher = EventPublisher::new().with_handler(Arc::new(ChannelRoutingHandler {
        registry: ChannelRegistry::default(),
    }));

    run_background_jobs(app_state, publisher).await;
}

/// Spawns the periodic jobs and parks until shutdown. Every job is
/// idempotent and tolerates overlapping runs, so a missed or doubled tick
/// is harmless.
async fn run_background_jobs(app_state: AppState, publisher: EventPublisher) {
    let sync_state = app_state.clone();
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(
            sync_state.config.catalog_sync_interval_secs,
        ));
        loop {
            ticker.tick().await;
            match catalog::sync_catalog(sync_state.db_conn_ref(), &sync_state.config).await {
                Ok(report) => info!(
                    "Catalog sync: {} synced, {} deactivated, {} failed",
                    report.synced, report.deactivated, report.failed
                ),
                Err(e) => error!("Catalog sync failed: {e}"),
            }
        }
    });

    let reminder_state = app_state.clone();
    let reminder_publisher = publisher.clone();
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(
            reminder_state.config.reminder_sweep_interval_secs,
        ));
        loop {
            ticker.tick().await;
            match involvement::sweep_overdue(reminder_state.db_conn_ref(), &reminder_publisher)
                .await
            {
                Ok(reminded) => info!("Reminder sweep: {reminded} overdue involvement(s)"),
                Err(e) => error!("Reminder sweep failed: {e}"),
            }
        }
    });

    let expiry_state = app_state.clone();
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(
            expiry_state.config.consensus_sweep_interval_secs,
        ));
        loop {
            ticker.tick().await;
            match consensus::expire_overdue(expiry_state.db_conn_ref()).await {
                Ok(expired) => info!("Consensus sweep: {expired} expired decision(s) resolved"),
                Err(e) => error!("Consensus expiry sweep failed: {e}"),
            }
        }
    });

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutting down Data Case Platform worker");
}
