use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::config::DocumentStoreConfig;

/// Connects to the document store; the access key is applied as the password.
pub async fn connect(cfg: &DocumentStoreConfig) -> anyhow::Result<PgPool> {
    let options = PgConnectOptions::from_str(&cfg.url)
        .context("parse DOCUMENT_STORE_URL")?
        .password(&cfg.key);

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("connect to document store")?;
    Ok(db)
}

/// Creates the nutrition container if it does not exist yet.
pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run document store migrations")?;
    Ok(())
}
