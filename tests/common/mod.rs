#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use sqlx::SqlitePool;
use sylva_enquiries::{config::Config, db};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A migrated SQLite file under the system temp dir, removed on drop.
pub struct TempDb {
    pub pool: SqlitePool,
    pub path: PathBuf,
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}

pub async fn temp_db() -> TempDb {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "sylva-enquiries-{}-{}-{}.sqlite",
        std::process::id(),
        nanos,
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ));

    let config = Config {
        database_url: format!("sqlite://{}", path.display()),
        ..Config::default()
    };
    let pool = db::connect(&config).await.expect("failed to open test database");
    TempDb { pool, path }
}

pub fn categories(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

/// Builds the app the way `main` does, minus compression and request logging.
#[macro_export]
macro_rules! test_app {
    ($pool:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_identity::IdentityMiddleware::default())
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::generate(),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .app_data(actix_web::web::Data::new(sylva_enquiries::AppState::new(
                    $pool.clone(),
                )))
                .configure(sylva_enquiries::routes::configure),
        )
        .await
    };
}
