//! End-to-end tests against a MySQL server
//!
//! Ignored by default. Point the `DB_*` variables (or `.env`) at a scratch
//! database and run `cargo test --test mysql_test -- --ignored`.

use datahaus::prelude::*;
use serde_json::{Value, json};

async fn setup() -> DataAccess {
    let config = DatabaseConfig::from_env().expect("DB_* settings for a MySQL server");
    let mut db = DataAccess::connect(&config)
        .await
        .expect("failed to connect to MySQL");

    // Temporary tables live and die with this session
    db.execute(
        "CREATE TEMPORARY TABLE `tbl_2fa_login` (
            `2fa_id` INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            `user` VARCHAR(64) NOT NULL,
            `2fa_code` SMALLINT NULL,
            `verified` TINYINT(1) NOT NULL DEFAULT 0,
            `attempts` TINYINT NOT NULL DEFAULT 0,
            `channel` ENUM('sms', 'email') NOT NULL DEFAULT 'sms',
            `balance` DECIMAL(10, 2) NOT NULL DEFAULT 0,
            `created_at` DATETIME NOT NULL,
            `expires_on` DATE NULL,
            `meta` JSON NULL
        )",
        &Value::Null,
    )
    .await
    .expect("failed to create table");

    db
}

#[tokio::test]
#[ignore = "needs a MySQL server configured through DB_* variables"]
async fn test_mysql_column_types_decode() {
    let mut db = setup().await;

    let id = db
        .add_row(
            "tbl_2fa_login",
            &json!({
                "user": "ada",
                "verified": true,
                "attempts": 3,
                "channel": "email",
                "balance": "12.50",
                "created_at": "2024-05-01 10:30:00",
                "expires_on": "2024-06-01",
                "meta": "{\"device\": \"phone\"}",
            }),
        )
        .await
        .unwrap();
    assert_eq!(id, Some(1));

    let affected = db
        .write("tbl_2fa_login", &json!({"2fa_id": 1}), &json!({"2fa_code": 4821}))
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let row = db
        .get_row("tbl_2fa_login", &json!({"2fa_id": 1}))
        .await
        .unwrap()
        .expect("row 1 exists");

    assert_eq!(row.get("2fa_id"), Some(&json!(1)));
    assert_eq!(row.get("2fa_code"), Some(&json!(4821)));
    assert_eq!(row.get("verified"), Some(&json!(true)));
    assert_eq!(row.get("attempts"), Some(&json!(3)));
    assert_eq!(row.get("channel"), Some(&json!("email")));
    assert_eq!(row.get("balance"), Some(&json!("12.50")));
    assert_eq!(row.get("created_at"), Some(&json!("2024-05-01 10:30:00")));
    assert_eq!(row.get("expires_on"), Some(&json!("2024-06-01")));
    assert_eq!(row.get("meta"), Some(&json!({"device": "phone"})));

    assert_eq!(db.count("tbl_2fa_login", &json!({"2fa_id": 1})).await.unwrap(), 1);
    assert!(!db.exists("tbl_2fa_login", &json!({"2fa_id": 2})).await.unwrap());

    db.close().await.unwrap();
}

#[tokio::test]
#[ignore = "needs a MySQL server configured through DB_* variables"]
async fn test_mysql_insert_without_generated_id() {
    let mut db = setup().await;

    db.execute(
        "CREATE TEMPORARY TABLE `settings` (`name` VARCHAR(32) PRIMARY KEY, `value` TEXT)",
        &Value::Null,
    )
    .await
    .unwrap();

    let id = db
        .add_row("settings", &json!({"name": "theme", "value": "dark"}))
        .await
        .unwrap();
    assert_eq!(id, None);

    db.close().await.unwrap();
}
