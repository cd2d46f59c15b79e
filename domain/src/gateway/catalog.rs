//! Sync of the data-table catalog from the external table registry.
//!
//! The registry is the source of truth for catalog tables; the local rows
//! are a read model for the matching core. Sync pulls the full feed, upserts
//! every table by its unique name and deactivates tables that disappeared
//! from the feed. Per-row failures are counted into the report instead of
//! aborting the batch, so one broken row never blocks the rest.

use crate::error::Error;
use entity::{data_tables, Id};
use entity_api::{data_table, user};
use log::*;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use service::config::Config;

/// One table as described by the external registry feed.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryTable {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub owner_email: String,
}

/// Aggregate outcome of one sync run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub synced: usize,
    pub deactivated: u64,
    pub failed: usize,
}

pub(crate) async fn client() -> Result<reqwest::Client, Error> {
    Ok(reqwest::Client::builder().use_rustls_tls().build()?)
}

/// Pulls the registry feed and reconciles the local catalog against it.
/// Skipped (empty report) when no registry URL is configured. Safe under
/// overlapping runs: upserts are keyed by table name.
pub async fn sync_catalog(db: &DatabaseConnection, config: &Config) -> Result<SyncReport, Error> {
    let Some(base_url) = config.catalog_url() else {
        debug!("No catalog registry configured; skipping sync");
        return Ok(SyncReport::default());
    };

    let client = client().await?;
    let url = format!("{base_url}/tables");
    let feed: Vec<RegistryTable> = client.get(&url).send().await?.json().await?;

    info!("Catalog sync: {} table(s) in the registry feed", feed.len());

    let mut report = SyncReport::default();
    let mut seen_names = Vec::with_capacity(feed.len());

    for table in feed {
        match resolve_owner(db, &table.owner_email).await {
            Ok(owner_id) => {
                let incoming = data_tables::Model {
                    id: Id::new_v4(),
                    name: table.name.clone(),
                    display_name: table.display_name,
                    description: table.description,
                    domain: table.domain,
                    keywords: (!table.keywords.is_empty()).then(|| table.keywords.join(",")),
                    owner_id,
                    is_active: true,
                    synced_at: None,
                    created_at: chrono::Utc::now().into(),
                    updated_at: chrono::Utc::now().into(),
                };
                match data_table::upsert_by_name(db, incoming).await {
                    Ok(_) => {
                        seen_names.push(table.name);
                        report.synced += 1;
                    }
                    Err(err) => {
                        warn!("Catalog sync failed to upsert {}: {err}", table.name);
                        report.failed += 1;
                    }
                }
            }
            Err(err) => {
                warn!(
                    "Catalog sync skipped {}: unknown owner {} ({err})",
                    table.name, table.owner_email
                );
                report.failed += 1;
            }
        }
    }

    report.deactivated = data_table::deactivate_missing(db, &seen_names).await?;

    info!(
        "Catalog sync finished: {} synced, {} deactivated, {} failed",
        report.synced, report.deactivated, report.failed
    );

    Ok(report)
}

async fn resolve_owner(db: &DatabaseConnection, email: &str) -> Result<Id, Error> {
    let owner = user::find_by_email(db, email).await?;
    owner
        .map(|user| user.id)
        .ok_or_else(|| Error::internal(format!("no user with email {email}")))
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod sync_tests {
    use super::*;
    use chrono::Utc;
    use entity::roles::Role;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn sync_catalog_upserts_feed_rows_and_reports_counts() {
        let mut server = mockito::Server::new_async().await;
        let feed = server
            .mock("GET", "/tables")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"name": "tb_pedidos", "domain": "vendas",
                     "keywords": ["pedido"], "owner_email": "owner@datacase.dev"}]"#,
            )
            .create_async()
            .await;

        let now = Utc::now();
        let owner = entity::users::Model {
            id: entity::Id::new_v4(),
            email: "owner@datacase.dev".to_owned(),
            display_name: None,
            role: Role::Manager,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let table_row = data_tables::Model {
            id: entity::Id::new_v4(),
            name: "tb_pedidos".to_owned(),
            display_name: None,
            description: None,
            domain: Some("vendas".to_owned()),
            keywords: Some("pedido".to_owned()),
            owner_id: owner.id,
            is_active: true,
            synced_at: Some(now.into()),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![owner.clone()]])
            .append_query_results(vec![Vec::<data_tables::Model>::new()])
            .append_query_results(vec![vec![table_row.clone()]])
            .append_query_results(vec![vec![table_row.clone()]])
            .into_connection();

        let config = service::config::Config::from_args([
            "datacase".to_owned(),
            "--catalog-url".to_owned(),
            server.url(),
        ]);

        let report = sync_catalog(&db, &config).await.unwrap();

        feed.assert_async().await;
        assert_eq!(report.synced, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.deactivated, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_feed_deserializes_with_missing_optionals() {
        let raw = r#"[
            {"name": "tb_pedidos", "owner_email": "owner@datacase.dev"},
            {
                "name": "tb_receita",
                "display_name": "Receita",
                "description": "Receita consolidada",
                "domain": "vendas",
                "keywords": ["receita", "faturamento"],
                "owner_email": "owner@datacase.dev"
            }
        ]"#;

        let feed: Vec<RegistryTable> = serde_json::from_str(raw).unwrap();

        assert_eq!(feed.len(), 2);
        assert!(feed[0].keywords.is_empty());
        assert_eq!(feed[1].keywords.len(), 2);
    }
}
