use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Matches are always listed best-first per variable.
        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_variable_matches_variable_score
             ON datacase_platform.variable_matches (case_variable_id, score DESC)",
        )
        .await?;

        // The scoring engine looks history up by its natural key.
        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_approval_histories_concept
             ON datacase_platform.approval_histories (concept_hash)",
        )
        .await?;

        // Training export pages by insertion order.
        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_decision_histories_created_at
             ON datacase_platform.decision_histories (created_at)",
        )
        .await?;

        // The reminder sweep scans for overdue involvements.
        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_involvements_expected_date
             ON datacase_platform.involvements (expected_completion_date)
             WHERE status <> 'completed'",
        )
        .await?;

        // The expiry sweep scans unresolved consensuses by deadline.
        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_decision_consensuses_deadline
             ON datacase_platform.decision_consensuses (deadline)
             WHERE resolved_at IS NULL",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        for index in [
            "idx_variable_matches_variable_score",
            "idx_approval_histories_concept",
            "idx_decision_histories_created_at",
            "idx_involvements_expected_date",
            "idx_decision_consensuses_deadline",
        ] {
            conn.execute_unprepared(&format!(
                "DROP INDEX IF EXISTS datacase_platform.{index}"
            ))
            .await?;
        }

        Ok(())
    }
}
