use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::models::{Cohort, CohortFields, NewUser, Student, StudentInput, StudentProfile, User};
use super::{CohortStore, Storage, StoreError, StudentStore, UserStore};
use crate::config::DatabaseConfig;

/// Schema bootstrap, safe to run on every start.
/// The unique index on `users.email` is what actually prevents duplicate
/// signups; the service-level lookup only gives a friendlier error first.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL,
        name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email)",
    r#"
    CREATE TABLE IF NOT EXISTS cohorts (
        id UUID PRIMARY KEY,
        in_progress BOOLEAN,
        cohort_slug TEXT,
        cohort_name TEXT,
        program TEXT,
        campus TEXT,
        start_date TEXT,
        end_date TEXT,
        program_manager TEXT,
        lead_teacher TEXT,
        total_hours INTEGER,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id UUID PRIMARY KEY,
        first_name TEXT,
        last_name TEXT,
        email TEXT,
        phone TEXT,
        linkedin_url TEXT,
        languages TEXT[] NOT NULL DEFAULT '{}',
        program TEXT,
        background TEXT,
        image TEXT,
        projects JSONB NOT NULL DEFAULT '[]',
        cohort UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS students_cohort_idx ON students (cohort)",
];

const COHORT_COLUMNS: &str = "id, in_progress, cohort_slug, cohort_name, program, campus, \
     start_date, end_date, program_manager, lead_teacher, total_hours";

const STUDENT_COLUMNS: &str = "id, first_name, last_name, email, phone, linkedin_url, \
     languages, program, background, image, projects, cohort";

#[derive(FromRow)]
struct StudentRow {
    id: Uuid,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    linkedin_url: Option<String>,
    languages: Vec<String>,
    program: Option<String>,
    background: Option<String>,
    image: Option<String>,
    projects: Json<Vec<Value>>,
    cohort: Option<Uuid>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id,
            profile: StudentProfile {
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
                phone: row.phone,
                linkedin_url: row.linkedin_url,
                languages: Some(row.languages),
                program: row.program,
                background: row.background,
                image: row.image,
                projects: Some(row.projects.0),
            },
            cohort: row.cohort,
        }
    }
}

/// PostgreSQL-backed storage over a shared connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected to database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Create tables and indexes that do not exist yet
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(user.email))
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[async_trait]
impl CohortStore for PgStore {
    async fn list_cohorts(&self) -> Result<Vec<Cohort>, StoreError> {
        let sql = format!("SELECT {} FROM cohorts ORDER BY created_at, id", COHORT_COLUMNS);
        let cohorts = sqlx::query_as::<_, Cohort>(&sql).fetch_all(&self.pool).await?;
        Ok(cohorts)
    }

    async fn find_cohort(&self, id: Uuid) -> Result<Option<Cohort>, StoreError> {
        let sql = format!("SELECT {} FROM cohorts WHERE id = $1", COHORT_COLUMNS);
        let cohort = sqlx::query_as::<_, Cohort>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(cohort)
    }

    async fn find_cohorts(&self, ids: &[Uuid]) -> Result<Vec<Cohort>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!("SELECT {} FROM cohorts WHERE id = ANY($1)", COHORT_COLUMNS);
        let cohorts = sqlx::query_as::<_, Cohort>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(cohorts)
    }

    async fn create_cohort(&self, fields: CohortFields) -> Result<Cohort, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO cohorts (id, in_progress, cohort_slug, cohort_name, program, campus,
                                 start_date, end_date, program_manager, lead_teacher, total_hours)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            COHORT_COLUMNS
        );

        let cohort = sqlx::query_as::<_, Cohort>(&sql)
            .bind(Uuid::new_v4())
            .bind(fields.in_progress)
            .bind(fields.cohort_slug)
            .bind(fields.cohort_name)
            .bind(fields.program)
            .bind(fields.campus)
            .bind(fields.start_date)
            .bind(fields.end_date)
            .bind(fields.program_manager)
            .bind(fields.lead_teacher)
            .bind(fields.total_hours)
            .fetch_one(&self.pool)
            .await?;
        Ok(cohort)
    }

    async fn update_cohort(
        &self,
        id: Uuid,
        patch: CohortFields,
    ) -> Result<Option<Cohort>, StoreError> {
        let sql = format!(
            r#"
            UPDATE cohorts SET
                in_progress = COALESCE($2, in_progress),
                cohort_slug = COALESCE($3, cohort_slug),
                cohort_name = COALESCE($4, cohort_name),
                program = COALESCE($5, program),
                campus = COALESCE($6, campus),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                program_manager = COALESCE($9, program_manager),
                lead_teacher = COALESCE($10, lead_teacher),
                total_hours = COALESCE($11, total_hours)
            WHERE id = $1
            RETURNING {}
            "#,
            COHORT_COLUMNS
        );

        let cohort = sqlx::query_as::<_, Cohort>(&sql)
            .bind(id)
            .bind(patch.in_progress)
            .bind(patch.cohort_slug)
            .bind(patch.cohort_name)
            .bind(patch.program)
            .bind(patch.campus)
            .bind(patch.start_date)
            .bind(patch.end_date)
            .bind(patch.program_manager)
            .bind(patch.lead_teacher)
            .bind(patch.total_hours)
            .fetch_optional(&self.pool)
            .await?;
        Ok(cohort)
    }

    async fn delete_cohort(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM cohorts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StudentStore for PgStore {
    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        let sql = format!("SELECT {} FROM students ORDER BY created_at, id", STUDENT_COLUMNS);
        let rows = sqlx::query_as::<_, StudentRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Student::from).collect())
    }

    async fn list_students_by_cohort(&self, cohort_id: Uuid) -> Result<Vec<Student>, StoreError> {
        let sql = format!(
            "SELECT {} FROM students WHERE cohort = $1 ORDER BY created_at, id",
            STUDENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(cohort_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Student::from).collect())
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>, StoreError> {
        let sql = format!("SELECT {} FROM students WHERE id = $1", STUDENT_COLUMNS);
        let row = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Student::from))
    }

    async fn create_student(&self, input: StudentInput) -> Result<Student, StoreError> {
        let profile = input.profile.with_list_defaults();
        let sql = format!(
            r#"
            INSERT INTO students (id, first_name, last_name, email, phone, linkedin_url,
                                  languages, program, background, image, projects, cohort)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        );

        let row = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(profile.first_name)
            .bind(profile.last_name)
            .bind(profile.email)
            .bind(profile.phone)
            .bind(profile.linkedin_url)
            .bind(profile.languages.unwrap_or_default())
            .bind(profile.program)
            .bind(profile.background)
            .bind(profile.image)
            .bind(Json(profile.projects.unwrap_or_default()))
            .bind(input.cohort)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_student(
        &self,
        id: Uuid,
        patch: StudentInput,
    ) -> Result<Option<Student>, StoreError> {
        let profile = patch.profile;
        let sql = format!(
            r#"
            UPDATE students SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                linkedin_url = COALESCE($6, linkedin_url),
                languages = COALESCE($7, languages),
                program = COALESCE($8, program),
                background = COALESCE($9, background),
                image = COALESCE($10, image),
                projects = COALESCE($11, projects),
                cohort = COALESCE($12, cohort)
            WHERE id = $1
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        );

        let row = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(id)
            .bind(profile.first_name)
            .bind(profile.last_name)
            .bind(profile.email)
            .bind(profile.phone)
            .bind(profile.linkedin_url)
            .bind(profile.languages)
            .bind(profile.program)
            .bind(profile.background)
            .bind(profile.image)
            .bind(profile.projects.map(Json))
            .bind(patch.cohort)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Student::from))
    }

    async fn delete_student(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Storage for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
