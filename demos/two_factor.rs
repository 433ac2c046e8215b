//! Two-factor login demo
//!
//! Writes a fresh random code for one login row, reads the row back and
//! counts it. Connection settings come from `DB_*` variables (or `.env`).
//!
//! ```bash
//! DB_DRIVER=mysql DB_NAME=mizban DB_USER=root cargo run --example two_factor
//! ```

use anyhow::Context;
use datahaus::prelude::*;
use rand::Rng;
use serde_json::json;

const TABLE: &str = "tbl_2fa_login";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DatabaseConfig::from_env().context("reading DB_* settings")?;
    let mut db = DataAccess::connect(&config)
        .await
        .with_context(|| format!("connecting to {} database '{}'", config.driver, config.database))?;

    println!("Connected ({} dialect)", db.dialect());

    let users = db.read_all("users", &json!({"id": [2, 3]}), 0).await?;
    println!("Users 2 and 3: {}", serde_json::to_string_pretty(&users)?);

    let code: u32 = rand::rng().random_range(1000..=9999);
    let updated = db
        .write(TABLE, &json!({"2fa_id": 1}), &json!({"2fa_code": code}))
        .await?;
    println!("Wrote code {} to {} row(s)", code, updated);

    let row = db.get_row(TABLE, &json!({"2fa_id": 1})).await?;
    match row {
        Some(row) => println!("Login row: {}", serde_json::Value::Object(row)),
        None => println!("No login row with 2fa_id = 1"),
    }

    let count = db.count(TABLE, &json!({"2fa_id": 1})).await?;
    println!("Matching rows: {}", count);

    db.close().await?;
    Ok(())
}
