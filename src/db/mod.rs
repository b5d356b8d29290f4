pub mod models;

use bcrypt::{hash, DEFAULT_COST};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

use models::{NewUser, User};

static DB_POOL: OnceCell<Arc<PgPool>> = OnceCell::const_new();

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/careercompass".to_string()),
            max_connections: std::env::var("DB_POOL_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: std::env::var("DB_POOL_MIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        }
    }
}

/// A write that could not be completed, split by cause so the HTTP layer can
/// answer with the right status instead of a generic failure.
#[derive(Debug, Error)]
pub enum InsertError {
    /// Uniqueness constraint hit; the payload names the offending column(s).
    #[error("duplicate value for {0}")]
    Unique(String),
    /// Foreign-key constraint hit; the payload names the dangling reference.
    #[error("unknown reference in {0}")]
    ForeignKey(String),
    #[error(transparent)]
    Other(sqlx::Error),
}

/// Sort a failed statement into [`InsertError`] using the driver's
/// constraint metadata.
pub fn classify_insert_error(err: sqlx::Error) -> InsertError {
    if let sqlx::Error::Database(db_err) = &err {
        let field = constraint_field(db_err.constraint());
        if db_err.is_unique_violation() {
            return InsertError::Unique(field);
        }
        if db_err.is_foreign_key_violation() {
            return InsertError::ForeignKey(field);
        }
    }
    InsertError::Other(err)
}

/// Derive a column name from a Postgres constraint name, e.g.
/// `users_username_key` -> `username`, `bookings_package_id_fkey` -> `package_id`.
fn constraint_field(constraint: Option<&str>) -> String {
    let Some(name) = constraint else {
        return "unknown".to_string();
    };
    let parts: Vec<&str> = name.split('_').collect();
    if parts.len() >= 3 && matches!(parts[parts.len() - 1], "key" | "fkey" | "pkey") {
        parts[1..parts.len() - 1].join("_")
    } else {
        name.to_string()
    }
}

pub async fn init_pool(config: Option<DbConfig>) -> Result<Arc<PgPool>, sqlx::Error> {
    let config = config.unwrap_or_default();

    tracing::info!("Initializing database connection pool...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(std::time::Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    tracing::info!("Database connection pool initialized successfully");

    let pool = Arc::new(pool);
    let _ = DB_POOL.set(pool.clone());

    Ok(pool)
}

pub fn get_pool() -> Option<Arc<PgPool>> {
    DB_POOL.get().cloned()
}

pub async fn health_check() -> Result<std::time::Duration, sqlx::Error> {
    let pool = get_pool()
        .ok_or_else(|| sqlx::Error::Configuration("Database pool not initialized".into()))?;

    let start = std::time::Instant::now();
    sqlx::query("SELECT 1").fetch_one(pool.as_ref()).await?;

    Ok(start.elapsed())
}

/// Insert an account row, hashing the password before it is stored.
/// Uniqueness violations on username/email come back as
/// [`InsertError::Unique`] naming the column.
pub async fn insert_user(pool: &PgPool, new_user: &NewUser) -> Result<User, InsertError> {
    let password_hash = hash(&new_user.password, DEFAULT_COST)
        .map_err(|e| InsertError::Other(sqlx::Error::Protocol(e.to_string())))?;

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, password, created_at
        "#,
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&password_hash)
    .fetch_one(pool)
    .await
    .map_err(classify_insert_error)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::TEXT,
            username TEXT UNIQUE NOT NULL,
            email TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS packages (
            id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::TEXT,
            name TEXT NOT NULL,
            price INTEGER NOT NULL,
            target_audience TEXT NOT NULL,
            description TEXT NOT NULL,
            features TEXT[] NOT NULL DEFAULT '{}',
            is_popular BOOLEAN NOT NULL DEFAULT false
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS blog_posts (
            id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::TEXT,
            title TEXT NOT NULL,
            excerpt TEXT NOT NULL,
            content TEXT NOT NULL,
            category TEXT NOT NULL,
            image_url TEXT NOT NULL,
            published_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS resources (
            id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::TEXT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            resource_type TEXT NOT NULL,
            download_url TEXT,
            icon_name TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS contact_submissions (
            id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::TEXT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            service_interest TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::TEXT,
            package_id TEXT NOT NULL REFERENCES packages(id),
            customer_email TEXT NOT NULL,
            customer_name TEXT NOT NULL,
            amount INTEGER NOT NULL,
            payment_intent_id TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS resource_downloads (
            id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::TEXT,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL,
            mobile TEXT NOT NULL,
            current_stage TEXT NOT NULL,
            resource_id TEXT NOT NULL REFERENCES resources(id),
            resource_title TEXT NOT NULL,
            downloaded_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::TEXT,
            full_name TEXT NOT NULL,
            mobile TEXT NOT NULL,
            current_stage TEXT NOT NULL,
            package_id TEXT NOT NULL REFERENCES packages(id),
            package_name TEXT NOT NULL,
            booking_type TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            amount INTEGER NOT NULL DEFAULT 0,
            payment_status TEXT NOT NULL DEFAULT 'pending',
            order_id TEXT,
            payment_id TEXT,
            notes TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::TEXT,
            notification_type TEXT NOT NULL,
            recipient TEXT NOT NULL,
            subject TEXT NOT NULL,
            text_content TEXT NOT NULL,
            html_content TEXT NOT NULL,
            metadata JSONB NOT NULL DEFAULT '{}'::JSONB,
            is_read BOOLEAN NOT NULL DEFAULT false,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_blog_posts_published_at ON blog_posts(published_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_blog_posts_category ON blog_posts(category)",
        "CREATE INDEX IF NOT EXISTS idx_payments_payment_intent_id ON payments(payment_intent_id)",
        "CREATE INDEX IF NOT EXISTS idx_payments_status ON payments(status)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_created_at ON bookings(created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status)",
        "CREATE INDEX IF NOT EXISTS idx_resource_downloads_resource_id ON resource_downloads(resource_id)",
        "CREATE INDEX IF NOT EXISTS idx_notifications_created_at ON notifications(created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_notifications_is_read ON notifications(is_read)",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database migrations completed successfully");

    Ok(())
}

/// Seed the read-only reference data (packages, resources) on first start.
/// Safe to call on every boot; existing rows are left untouched.
pub async fn seed_defaults(pool: &PgPool) -> Result<(), sqlx::Error> {
    seed_packages(pool).await?;
    seed_resources(pool).await?;
    Ok(())
}

async fn seed_packages(pool: &PgPool) -> Result<(), sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM packages")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let packages: Vec<(&str, i32, &str, &str, Vec<&str>, bool)> = vec![
        (
            "Career Clarity Session",
            2999,
            "Students and early-career professionals",
            "A focused one-on-one session to map your strengths, interests, and realistic next steps.",
            vec![
                "90-minute one-on-one video session",
                "Psychometric strengths assessment",
                "Personalised action plan within 48 hours",
            ],
            false,
        ),
        (
            "Career Switch Accelerator",
            9999,
            "Mid-career professionals planning a pivot",
            "A four-week program covering positioning, resume, LinkedIn, and interview preparation for a confident switch.",
            vec![
                "4 weekly one-on-one coaching sessions",
                "Resume and LinkedIn profile rewrite",
                "Two mock interviews with written feedback",
                "Email support between sessions",
            ],
            true,
        ),
        (
            "Leadership Track Mentorship",
            19999,
            "Senior professionals targeting leadership roles",
            "A three-month mentorship pairing you with an industry leader to plan and execute your move into management.",
            vec![
                "12 mentorship sessions over 3 months",
                "Stakeholder-communication coaching",
                "Compensation negotiation playbook",
                "Quarterly follow-up after completion",
            ],
            false,
        ),
    ];

    for (name, price, audience, description, features, is_popular) in packages {
        let features: Vec<String> = features.into_iter().map(String::from).collect();
        sqlx::query(
            r#"
            INSERT INTO packages (name, price, target_audience, description, features, is_popular)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(audience)
        .bind(description)
        .bind(&features)
        .bind(is_popular)
        .execute(pool)
        .await?;
    }

    tracing::info!("Seeded default packages");
    Ok(())
}

async fn seed_resources(pool: &PgPool) -> Result<(), sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM resources")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let resources = vec![
        (
            "The Career Pivot Workbook",
            "A step-by-step workbook for planning an industry or role switch without a pay cut.",
            "pdf",
            Some("/downloads/career-pivot-workbook.pdf"),
            "book-open",
        ),
        (
            "Salary Benchmark Explorer",
            "An interactive tool comparing compensation bands across roles, cities, and experience levels.",
            "tool",
            None,
            "bar-chart",
        ),
        (
            "Interview Readiness Checklist",
            "A 30-point checklist covering research, stories, and logistics before any interview.",
            "checklist",
            Some("/downloads/interview-readiness-checklist.pdf"),
            "clipboard",
        ),
        (
            "2025 Hiring Trends Report",
            "Our annual report on hiring demand, remote-work shifts, and the skills employers pay for.",
            "report",
            Some("/downloads/hiring-trends-2025.pdf"),
            "trending-up",
        ),
    ];

    for (title, description, resource_type, download_url, icon_name) in resources {
        sqlx::query(
            r#"
            INSERT INTO resources (title, description, resource_type, download_url, icon_name)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(resource_type)
        .bind(download_url)
        .bind(icon_name)
        .execute(pool)
        .await?;
    }

    tracing::info!("Seeded default resources");
    Ok(())
}
