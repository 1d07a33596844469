use actix_identity::IdentityMiddleware;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, middleware, web::Data, App, HttpServer};
use log::info;

use sylva_enquiries::{auth, config::Config, db, routes, AppState};

fn session_key(config: &Config) -> Key {
    match config.session_key.as_deref() {
        Some(raw) if raw.len() >= 64 => Key::from(raw.as_bytes()),
        Some(_) => {
            log::warn!("SESSION_KEY is shorter than 64 bytes; using an ephemeral key");
            Key::generate()
        }
        None => {
            log::warn!("SESSION_KEY not set; sessions will not survive a restart");
            Key::generate()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;
    let db_pool = db::connect(&config).await?;

    if auth::ensure_default_owner(&db_pool, &config.owner_default_password).await? {
        log::warn!("Default owner credential created; change the password after first login");
    }

    let key = session_key(&config);
    let cookie_secure = config.cookie_secure;
    let state = Data::new(AppState::new(db_pool));

    info!("Starting HTTP server on http://{}:{}/", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            // enable automatic response compression - usually register this first
            .wrap(middleware::Compress::default())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(cookie_secure)
                    .build(),
            )
            // enable logger - always register Actix Web Logger middleware last
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
