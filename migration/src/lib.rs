pub use sea_orm_migration::prelude::*;

mod m20250310_000001_create_schema_and_base_tables;
mod m20250422_000001_add_decision_tables;
mod m20250801_000000_add_ranking_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250310_000001_create_schema_and_base_tables::Migration),
            Box::new(m20250422_000001_add_decision_tables::Migration),
            Box::new(m20250801_000000_add_ranking_indexes::Migration),
        ]
    }
}
