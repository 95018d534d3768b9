use axum::Router;
use crmserver::config::AppConfig;
use crmserver::contacts::{contacts_routes, create_contacts_tables_migration};
use crmserver::shared::state::AppState;
use crmserver::shared::utils::create_conn;
use diesel::connection::SimpleConnection;
use dotenvy::dotenv;
use log::info;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = AppConfig::from_env();
    let pool = create_conn(&config.database_url())?;

    {
        let mut conn = pool.get()?;
        conn.batch_execute(create_contacts_tables_migration())?;
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        conn: pool,
    });

    let app = Router::new()
        .nest("/contacts", contacts_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting HTTP server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
