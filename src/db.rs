use std::str::FromStr;

use chrono::{Local, NaiveDateTime, SubsecRound};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    config::Config,
    errors::AppError,
    structs::{Credential, Enquiry, NewEnquiry},
    utils::hash_password,
};

/// Identifies the current contents of the append-only enquiry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EnquirySetKey {
    pub count: i64,
    pub max_id: i64,
}

impl EnquirySetKey {
    pub fn of(enquiries: &[Enquiry]) -> Self {
        EnquirySetKey {
            count: enquiries.len() as i64,
            max_id: enquiries.iter().map(|e| e.id).max().unwrap_or(0),
        }
    }
}

/// Open the pool and bring the schema up to date. Safe on every start.
pub async fn connect(config: &Config) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| AppError::Config(format!("DATABASE_URL: {e}")))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .read_only(false)
        .busy_timeout(config.connect_timeout);

    let pool = SqlitePoolOptions::new()
        .acquire_timeout(config.connect_timeout)
        .connect_with(opts)
        .await
        .map_err(|e| {
            log::error!("Failed to connect to {}: {}", config.database_url, e);
            AppError::StoreUnavailable(e)
        })?;

    sqlx::migrate!().run(&pool).await?;
    log::info!("Database migrated successfully");
    Ok(pool)
}

pub async fn insert_enquiry(pool: &SqlitePool, new: &NewEnquiry) -> Result<Enquiry, AppError> {
    let timestamp: NaiveDateTime = Local::now().naive_local().trunc_subsecs(0);
    let enquiry = sqlx::query_as::<_, Enquiry>(
        "INSERT INTO enquiries (name, email, phone, furniture_type, message, timestamp)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, name, email, phone, furniture_type, message, timestamp",
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(new.furniture_type())
    .bind(&new.message)
    .bind(timestamp)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        log::error!("Failed to insert enquiry: {}", e);
        AppError::from(e)
    })?;
    log::info!("Enquiry {} stored", enquiry.id);
    Ok(enquiry)
}

/// All enquiries, oldest first.
pub async fn get_all_enquiries(pool: &SqlitePool) -> Result<Vec<Enquiry>, AppError> {
    let enquiries = sqlx::query_as::<_, Enquiry>(
        "SELECT id, name, email, phone, furniture_type, message, timestamp
         FROM enquiries ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        log::error!("Failed to load enquiries: {}", e);
        AppError::from(e)
    })?;
    Ok(enquiries)
}

pub async fn enquiry_set_key(pool: &SqlitePool) -> Result<EnquirySetKey, AppError> {
    let (count, max_id): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(MAX(id), 0) FROM enquiries")
            .fetch_one(pool)
            .await?;
    Ok(EnquirySetKey { count, max_id })
}

pub async fn get_credential(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<Credential>, AppError> {
    let credential = sqlx::query_as::<_, Credential>(
        "SELECT username, pwd_hash FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(credential)
}

pub async fn get_password_hash(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<String>, AppError> {
    Ok(get_credential(pool, username)
        .await?
        .map(|credential| credential.pwd_hash))
}

/// Create the credential row for `username` unless one exists. Concurrent
/// callers race on the primary key; the loser's insert is a no-op. Returns
/// whether this call created the row.
pub async fn ensure_default_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<bool, AppError> {
    if get_password_hash(pool, username).await?.is_some() {
        return Ok(false);
    }
    let pwd_hash = hash_password(password)?;
    let result = sqlx::query(
        "INSERT INTO users (username, pwd_hash) VALUES ($1, $2)
         ON CONFLICT(username) DO NOTHING",
    )
    .bind(username)
    .bind(pwd_hash)
    .execute(pool)
    .await?;

    let created = result.rows_affected() == 1;
    if created {
        log::info!("Created default credential for {}", username);
    }
    Ok(created)
}

pub async fn count_users(pool: &SqlitePool, username: &str) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
