//! Resets the database to the fixture data used by the integration tests.

use std::error::Error;

use tokio::{fs, task};
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
};

use ticketing_backend::{db, Config};

const SEED: &str = include_str!("../../sql/seed.sql");

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = fs::read_to_string("config.toml").await?;
    let config = toml::from_str::<Config>(&config)?;

    let (db_client, db_connections) = db::connect(config.db).await?;

    for db_connection in db_connections {
        task::spawn(async move {
            if let Err(e) = db_connection.await {
                tracing::error!(error = %e, "database connection failed");
            }
        });
    }

    db_client.apply_schema().await?;
    db_client.execute_script(SEED).await?;
    tracing::info!("database seeded");

    Ok(())
}
