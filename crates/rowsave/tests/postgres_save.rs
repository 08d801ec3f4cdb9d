//! Round trips against a real Postgres server.
//!
//! Every test returns early when `DATABASE_URL` is not set.

use chrono::{NaiveDate, NaiveDateTime};
use rowsave::prelude::*;
use rowsave::BlockingClient;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::{Client, NoTls};

#[derive(Debug, Clone, Record)]
#[record(rename_all = "snake_case")]
struct TestEntry {
    id: Option<i32>,
    name: String,
    value: Option<String>,
    now: Option<NaiveDateTime>,
}

fn database_url(test: &str) -> Option<String> {
    dotenvy::dotenv().ok();
    match std::env::var("DATABASE_URL") {
        Ok(v) => Some(v),
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            None
        }
    }
}

fn table_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("rowsave_{prefix}_{}_{nanos}", std::process::id())
}

fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE {table} (
            id serial PRIMARY KEY,
            name text NOT NULL,
            value text,
            now timestamp
        )"
    )
}

async fn connect(url: &str) -> RecordResult<Client> {
    let (client, connection) = tokio_postgres::connect(url, NoTls)
        .await
        .map_err(|e| RecordError::Connection(e.to_string()))?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(client)
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_milli_opt(12, 30, 0, 250)
        .unwrap()
}

async fn read_name(client: &Client, table: &str, id: i32) -> RecordResult<String> {
    let row = client
        .query_one(&format!("SELECT name FROM {table} WHERE id = $1"), &[&id])
        .await?;
    Ok(row.get(0))
}

#[tokio::test]
async fn save_inserts_then_updates() -> RecordResult<()> {
    let Some(url) = database_url("save_inserts_then_updates") else {
        return Ok(());
    };
    let client = connect(&url).await?;
    let table = table_name("save");
    client.batch_execute(&create_table_sql(&table)).await?;

    let conn = WithIdentity::new(&client, "id");
    let opts = SaveOptions::new().table(&table);
    let mut entry = TestEntry {
        id: None,
        name: "Name".into(),
        value: Some("Value".into()),
        now: Some(now()),
    };

    assert!(!conn.check_exists(&entry, &["id"], Some(&table)).await?);

    let saved = conn.save(&entry, &["id"], &opts).await?;
    let id = saved.value().expect("identity returned");
    assert!(saved.is_insert());
    entry.id = Some(i32::try_from(id).expect("serial fits i32"));
    assert!(conn.check_exists(&entry, &["id"], Some(&table)).await?);

    entry.name = "Renamed".into();
    let saved = conn.save(&entry, &["id"], &opts).await?;
    assert_eq!(saved, Saved::Updated(1));
    assert_eq!(read_name(&client, &table, entry.id.unwrap_or_default()).await?, "Renamed");

    let count: i64 = client
        .query_one(&format!("SELECT count(*) FROM {table}"), &[])
        .await?
        .get(0);
    assert_eq!(count, 1);

    client.batch_execute(&format!("DROP TABLE {table}")).await?;
    Ok(())
}

#[tokio::test]
async fn insert_and_update_with_explicit_params() -> RecordResult<()> {
    let Some(url) = database_url("insert_and_update_with_explicit_params") else {
        return Ok(());
    };
    let client = connect(&url).await?;
    let table = table_name("explicit");
    client.batch_execute(&create_table_sql(&table)).await?;

    let mut params = ParamSet::new();
    params.add("name", "first").add("value", None::<String>);

    // Without an identity step nothing is read back.
    assert_eq!(client.insert(&params, &table).await?, None);

    let id = WithIdentity::new(&client, "id").insert(&params, &table).await?;
    let id = id.expect("identity returned");

    let mut update = ParamSet::new();
    update.add("id", id).add("name", "second");
    assert_eq!(client.update(&update, &["id"], &table).await?, 1);

    update.add("id", id + 1000);
    assert_eq!(client.update(&update, &["id"], &table).await?, 0);

    let err = client.update(&update, &[], &table).await.unwrap_err();
    assert!(matches!(err, RecordError::MissingKeys(_)));

    client.batch_execute(&format!("DROP TABLE {table}")).await?;
    Ok(())
}

#[tokio::test]
async fn save_inside_transaction_rolls_back() -> RecordResult<()> {
    let Some(url) = database_url("save_inside_transaction_rolls_back") else {
        return Ok(());
    };
    let mut client = connect(&url).await?;
    let table = table_name("tx");
    client.batch_execute(&create_table_sql(&table)).await?;

    let entry = TestEntry {
        id: None,
        name: "Name".into(),
        value: None,
        now: None,
    };
    {
        let tx = client.transaction().await?;
        let saved = WithIdentity::new(&tx, "id")
            .save(&entry, &["id"], &SaveOptions::new().table(&table))
            .await?;
        assert!(saved.is_insert());
        tx.rollback().await?;
    }

    let count: i64 = client
        .query_one(&format!("SELECT count(*) FROM {table}"), &[])
        .await?
        .get(0);
    assert_eq!(count, 0);

    client.batch_execute(&format!("DROP TABLE {table}")).await?;
    Ok(())
}

#[tokio::test]
async fn unique_violation_is_mapped() -> RecordResult<()> {
    let Some(url) = database_url("unique_violation_is_mapped") else {
        return Ok(());
    };
    let client = connect(&url).await?;
    let table = table_name("unique");
    client.batch_execute(&create_table_sql(&table)).await?;

    let mut params = ParamSet::new();
    params.add("id", 1_i32).add("name", "a");
    client.insert(&params, &table).await?;
    let err = client.insert(&params, &table).await.unwrap_err();
    assert!(err.is_unique_violation());

    client.batch_execute(&format!("DROP TABLE {table}")).await?;
    Ok(())
}

#[test]
fn blocking_client_saves_in_transaction() -> RecordResult<()> {
    let Some(url) = database_url("blocking_client_saves_in_transaction") else {
        return Ok(());
    };
    let mut client = BlockingClient::connect(&url)?.identity_column("id");
    let table = table_name("blocking");
    client.batch_execute(&create_table_sql(&table))?;

    let mut entry = TestEntry {
        id: None,
        name: "Name".into(),
        value: Some("Value".into()),
        now: Some(now()),
    };
    let opts = SaveOptions::new().table(&table);

    let tx = client.transaction()?;
    let saved = tx.save(&entry, &["id"], &opts)?;
    let id = saved.value().expect("identity returned");
    entry.id = Some(i32::try_from(id).expect("serial fits i32"));
    entry.value = None;
    assert_eq!(tx.save(&entry, &["id"], &opts)?, Saved::Updated(1));
    tx.commit()?;

    assert!(client.check_exists(&entry, &["id"], Some(&table))?);

    client.batch_execute(&format!("DROP TABLE {table}"))?;
    Ok(())
}
