use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE TYPE datacase_platform.agent_decision_type AS ENUM (
                'variable_match',
                'table_classification',
                'risk_assessment'
            )",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE TYPE datacase_platform.agent_decision_status AS ENUM (
                'pending',
                'consensus_required',
                'approved',
                'rejected'
            )",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE TYPE datacase_platform.decision_point AS ENUM (
                'match_suggested',
                'owner_response',
                'requester_response',
                'variable_cancelled'
            )",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE TYPE datacase_platform.decision_outcome AS ENUM (
                'positive',
                'neutral',
                'negative'
            )",
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.decision_contexts (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                context_type VARCHAR(100) NOT NULL,
                context_hash VARCHAR(32) NOT NULL UNIQUE,
                context_data TEXT NOT NULL,
                approved_count INTEGER NOT NULL DEFAULT 0,
                rejected_count INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.agent_decisions (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                agent_id VARCHAR(255) NOT NULL,
                decision_type datacase_platform.agent_decision_type NOT NULL,
                context_id UUID
                    REFERENCES datacase_platform.decision_contexts(id) ON DELETE SET NULL,
                value TEXT NOT NULL,
                confidence DOUBLE PRECISION NOT NULL,
                status datacase_platform.agent_decision_status NOT NULL DEFAULT 'pending',
                is_reused BOOLEAN NOT NULL DEFAULT FALSE,
                source_decision_id UUID,
                reuse_count INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.decision_consensuses (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                agent_decision_id UUID NOT NULL UNIQUE
                    REFERENCES datacase_platform.agent_decisions(id) ON DELETE CASCADE,
                required_approvals INTEGER NOT NULL DEFAULT 2,
                deadline TIMESTAMPTZ NOT NULL,
                approval_votes INTEGER NOT NULL DEFAULT 0,
                rejection_votes INTEGER NOT NULL DEFAULT 0,
                resolved_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.consensus_votes (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                consensus_id UUID NOT NULL
                    REFERENCES datacase_platform.decision_consensuses(id) ON DELETE CASCADE,
                voter_id UUID NOT NULL
                    REFERENCES datacase_platform.users(id),
                approve BOOLEAN NOT NULL,
                comment TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT consensus_votes_voter_unique
                    UNIQUE (consensus_id, voter_id)
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.decision_histories (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                case_id UUID,
                case_variable_id UUID,
                variable_match_id UUID,
                decision_point datacase_platform.decision_point NOT NULL,
                outcome datacase_platform.decision_outcome NOT NULL DEFAULT 'neutral',
                actor_id UUID,
                variable_snapshot TEXT,
                table_snapshot TEXT,
                match_snapshot TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        for table in [
            "decision_histories",
            "consensus_votes",
            "decision_consensuses",
            "agent_decisions",
            "decision_contexts",
        ] {
            conn.execute_unprepared(&format!(
                "DROP TABLE IF EXISTS datacase_platform.{table} CASCADE"
            ))
            .await?;
        }

        for enum_name in [
            "decision_outcome",
            "decision_point",
            "agent_decision_status",
            "agent_decision_type",
        ] {
            conn.execute_unprepared(&format!(
                "DROP TYPE IF EXISTS datacase_platform.{enum_name}"
            ))
            .await?;
        }

        Ok(())
    }
}
