#[cfg(target_os = "linux")]
use pgshape_core::{Client, Error, Format, FormatOptions, Formatted, PoolSettings, Transform, Value};
#[cfg(target_os = "linux")]
use std::sync::Arc;
#[cfg(target_os = "linux")]
use testcontainers::runners::AsyncRunner;

#[cfg(target_os = "linux")]
fn settings(port: u16) -> PoolSettings {
    PoolSettings {
        host: "127.0.0.1".to_string(),
        port,
        database: Some("postgres".to_string()),
        user: "postgres".to_string(),
        password: "postgres".to_string(),
        connect_timeout_ms: 10_000,
        ..PoolSettings::default()
    }
}

#[cfg(target_os = "linux")]
#[test_log::test(tokio::test)]
async fn test_client_lifecycle_and_formats() -> anyhow::Result<()> {
    let image = testcontainers::ContainerRequest::from(
        testcontainers_modules::postgres::Postgres::default(),
    );
    let container = image.start().await?;
    let port = container.get_host_port_ipv4(5432).await?;

    let pool = Arc::new(pgshape_driver_postgresql::Pool::new(settings(port)));
    let mut client = Client::new(pool.clone());
    assert!(client.open().await.is_connected());

    let created = client
        .execute("CREATE TABLE person (id SERIAL PRIMARY KEY, name VARCHAR(20), age INT)")
        .await;
    assert!(created.is_ok());
    assert_eq!(created.count(), Some(0));

    let empty = client.execute("SELECT id, name FROM person WHERE false").await;
    assert!(empty.is_ok());
    assert!(empty.rows().is_empty());
    assert_eq!(empty.columns().len(), 2);
    assert_eq!(empty.columns()[1].name(), "name");

    let batch = client
        .execute("CREATE TEMP TABLE tally (id INT); INSERT INTO tally VALUES (1), (2)")
        .await;
    assert!(batch.is_ok());
    assert_eq!(batch.count(), Some(2));

    let id = client
        .query(
            "INSERT INTO person (name, age) VALUES ('chacho', 30) RETURNING id",
            Format::Value,
            &FormatOptions::default(),
        )
        .await?;
    assert_eq!(id, Formatted::Value(Value::I32(1)));
    assert_eq!(client.affected_rows(), 1);

    let inserted = client
        .query(
            "INSERT INTO person (name, age) VALUES ('loco', NULL), ('tres', 3)",
            Format::Count,
            &FormatOptions::default(),
        )
        .await?;
    assert_eq!(inserted, Formatted::Count(2));

    let names = client
        .query_named(
            "SELECT id, name FROM person ORDER BY id",
            "valuesById",
            &FormatOptions::new().with_value_key("name"),
        )
        .await?;
    let Formatted::ValuesById(names) = names else {
        panic!("expected values by id");
    };
    assert_eq!(names.get("2"), Some(&Value::from("loco")));

    let rows = client
        .query(
            "SELECT id, name FROM person ORDER BY id",
            Format::ArrayById,
            &FormatOptions::new().with_transform(Transform::named("upper")),
        )
        .await?;
    let Formatted::ArrayById(rows) = rows else {
        panic!("expected array by id");
    };
    assert_eq!(
        rows.get("3").and_then(|row| row.get("name")),
        Some(&Value::from("TRES"))
    );

    let row = client
        .query(
            "SELECT id, name, age FROM person WHERE name = 'loco'",
            Format::RowStrict,
            &FormatOptions::default(),
        )
        .await?;
    let Formatted::Row(row) = row else {
        panic!("expected row");
    };
    assert_eq!(row.keys().collect::<Vec<_>>(), vec!["id", "name"]);

    let found = client
        .query(
            "SELECT id FROM person WHERE name = 'nobody'",
            Format::Bool,
            &FormatOptions::default(),
        )
        .await?;
    assert_eq!(found, Formatted::Bool(false));

    let error = client
        .query("SELECT * FROMM person", Format::Array, &FormatOptions::default())
        .await
        .expect_err("syntax error");
    assert!(matches!(error, Error::Query { .. }));
    assert_eq!(error.to_string(), r#"error: syntax error at or near "FROMM""#);
    let failed = client.last_result(0).expect("recorded failure");
    assert!(!failed.is_ok());
    assert_eq!(failed.count(), None);
    assert_eq!(client.affected_rows(), 0);

    assert_eq!(
        client.first_result(0).map(|result| result.statement().to_string()),
        Some(created.statement().to_string())
    );
    assert_eq!(client.all_results().len(), 10);

    assert_eq!(
        client.close().await.message.as_deref(),
        Some("Disconnected successfully.")
    );
    assert_eq!(
        client.close().await.message.as_deref(),
        Some("Is already disconnected.")
    );
    let result = client.execute("SELECT 1").await;
    assert!(matches!(result.error(), Some(Error::NotConnected { .. })));

    let response = client
        .execute_once(
            "SELECT name FROM person WHERE id = 1",
            "value",
            &FormatOptions::default(),
        )
        .await;
    assert!(response.is_ok());
    assert_eq!(response.result, Some(Formatted::Value(Value::from("chacho"))));
    assert!(!client.is_connected());

    pool.close().await;
    container.stop().await?;
    container.rm().await?;
    Ok(())
}

#[cfg(target_os = "linux")]
#[test_log::test(tokio::test)]
async fn test_client_unknown_database() -> anyhow::Result<()> {
    let image = testcontainers::ContainerRequest::from(
        testcontainers_modules::postgres::Postgres::default(),
    );
    let container = image.start().await?;
    let port = container.get_host_port_ipv4(5432).await?;

    let settings = PoolSettings {
        database: Some("chacho".to_string()),
        ..settings(port)
    };
    let mut client = Client::new(Arc::new(pgshape_driver_postgresql::Pool::new(settings)));

    let status = client.open().await;
    assert!(!status.is_connected());
    assert_eq!(status.message(), r#"error: database "chacho" does not exist"#);

    let response = client
        .execute_once("SELECT 1", "value", &FormatOptions::default())
        .await;
    assert!(!response.is_ok());
    assert!(matches!(response.error, Some(Error::Connection { .. })));

    container.stop().await?;
    container.rm().await?;
    Ok(())
}
