use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("CREATE SCHEMA IF NOT EXISTS datacase_platform")
            .await?;

        conn.execute_unprepared(
            "CREATE TYPE datacase_platform.role AS ENUM (
                'user',
                'manager',
                'admin'
            )",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE TYPE datacase_platform.case_status AS ENUM (
                'draft',
                'submitted',
                'review',
                'approved',
                'rejected',
                'closed',
                'cancelled'
            )",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE TYPE datacase_platform.search_status AS ENUM (
                'pending',
                'searching',
                'matched',
                'no_match',
                'requester_review',
                'in_use',
                'cancelled',
                'failed'
            )",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE TYPE datacase_platform.match_status AS ENUM (
                'suggested',
                'owner_confirmed',
                'owner_rejected',
                'owner_redirected',
                'requester_pending',
                'accepted',
                'declined'
            )",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE TYPE datacase_platform.owner_response_type AS ENUM (
                'confirm_match',
                'correct_table',
                'data_not_exist',
                'delegate_owner'
            )",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE TYPE datacase_platform.requester_response_type AS ENUM (
                'approve',
                'reject_match',
                'reject_and_cancel'
            )",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE TYPE datacase_platform.involvement_status AS ENUM (
                'pending',
                'in_progress',
                'completed',
                'overdue'
            )",
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                email VARCHAR(255) NOT NULL UNIQUE,
                display_name VARCHAR(255),
                role datacase_platform.role NOT NULL DEFAULT 'user',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.cases (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                title VARCHAR(255) NOT NULL,
                status datacase_platform.case_status NOT NULL DEFAULT 'draft',
                requester_id UUID NOT NULL
                    REFERENCES datacase_platform.users(id),
                macro_case VARCHAR(255),
                budget DOUBLE PRECISION,
                starts_on DATE,
                ends_on DATE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.case_variables (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                case_id UUID NOT NULL
                    REFERENCES datacase_platform.cases(id) ON DELETE CASCADE,
                name VARCHAR(255) NOT NULL,
                variable_type VARCHAR(100) NOT NULL,
                concept TEXT,
                search_status datacase_platform.search_status NOT NULL DEFAULT 'pending',
                is_cancelled BOOLEAN NOT NULL DEFAULT FALSE,
                cancelled_at TIMESTAMPTZ,
                cancelled_by UUID,
                cancel_reason TEXT,
                search_started_at TIMESTAMPTZ,
                search_completed_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.data_tables (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(255) NOT NULL UNIQUE,
                display_name VARCHAR(255),
                description TEXT,
                domain VARCHAR(255),
                keywords TEXT,
                owner_id UUID NOT NULL
                    REFERENCES datacase_platform.users(id),
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                synced_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.variable_matches (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                case_variable_id UUID NOT NULL
                    REFERENCES datacase_platform.case_variables(id) ON DELETE CASCADE,
                data_table_id UUID NOT NULL
                    REFERENCES datacase_platform.data_tables(id) ON DELETE CASCADE,
                score DOUBLE PRECISION NOT NULL,
                reasons TEXT NOT NULL,
                status datacase_platform.match_status NOT NULL DEFAULT 'suggested',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT variable_matches_pair_unique
                    UNIQUE (case_variable_id, data_table_id)
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.approval_histories (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                concept_hash VARCHAR(32) NOT NULL,
                data_table_id UUID NOT NULL
                    REFERENCES datacase_platform.data_tables(id) ON DELETE CASCADE,
                approved_count INTEGER NOT NULL DEFAULT 0,
                rejected_count INTEGER NOT NULL DEFAULT 0,
                last_used_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT approval_histories_key_unique
                    UNIQUE (concept_hash, data_table_id)
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.owner_responses (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                variable_match_id UUID NOT NULL
                    REFERENCES datacase_platform.variable_matches(id) ON DELETE CASCADE,
                responder_id UUID NOT NULL
                    REFERENCES datacase_platform.users(id),
                response_type datacase_platform.owner_response_type NOT NULL,
                corrected_table_id UUID,
                delegate_user_id UUID,
                comment TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.requester_responses (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                variable_match_id UUID NOT NULL
                    REFERENCES datacase_platform.variable_matches(id) ON DELETE CASCADE,
                responder_id UUID NOT NULL
                    REFERENCES datacase_platform.users(id),
                response_type datacase_platform.requester_response_type NOT NULL,
                comment TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS datacase_platform.involvements (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                case_variable_id UUID NOT NULL
                    REFERENCES datacase_platform.case_variables(id) ON DELETE CASCADE,
                requester_id UUID NOT NULL
                    REFERENCES datacase_platform.users(id),
                owner_id UUID NOT NULL
                    REFERENCES datacase_platform.users(id),
                status datacase_platform.involvement_status NOT NULL DEFAULT 'pending',
                expected_completion_date DATE,
                actual_completion_date DATE,
                created_table_name VARCHAR(255),
                created_concept TEXT,
                reminder_count INTEGER NOT NULL DEFAULT 0,
                last_reminder_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        for table in [
            "involvements",
            "requester_responses",
            "owner_responses",
            "approval_histories",
            "variable_matches",
            "data_tables",
            "case_variables",
            "cases",
            "users",
        ] {
            conn.execute_unprepared(&format!(
                "DROP TABLE IF EXISTS datacase_platform.{table} CASCADE"
            ))
            .await?;
        }

        for enum_name in [
            "involvement_status",
            "requester_response_type",
            "owner_response_type",
            "match_status",
            "search_status",
            "case_status",
            "role",
        ] {
            conn.execute_unprepared(&format!(
                "DROP TYPE IF EXISTS datacase_platform.{enum_name}"
            ))
            .await?;
        }

        Ok(())
    }
}
