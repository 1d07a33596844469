#[macro_use]
extern crate lazy_static;

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod routes;
pub mod structs;
pub mod utils;

use sqlx::SqlitePool;
use std::sync::Arc;
use tera::Tera;

use export::ExportCache;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub exports: Arc<ExportCache>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            db_pool,
            exports: Arc::new(ExportCache::new()),
        }
    }
}

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = Tera::default();
        if let Err(e) = tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("enquiry.html", include_str!("../templates/enquiry.html")),
            ("login.html", include_str!("../templates/login.html")),
            ("dashboard.html", include_str!("../templates/dashboard.html")),
        ]) {
            log::error!("Parsing error(s): {}", e);
            ::std::process::exit(1);
        }
        tera.autoescape_on(vec![".html"]);
        tera
    };
}
