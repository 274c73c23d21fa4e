//! Run data sources against a seeded SQLite database.

use serde_json::json;
use similar_asserts::assert_eq;

use query_engine_execution::connection::Connection;
use query_engine_execution::data_source::DataSource;
use query_engine_execution::error::Error;
use query_engine_execution::sqlite::SqliteConnection;
use query_engine_models::models;
use query_engine_sql::sql::string::{BindValues, Statement};
use query_engine_sql::sql::template::QueryTemplate;
use tests_common::fixtures;

async fn people() -> SqliteConnection {
    tests_common::logging::init();
    SqliteConnection::from_pool(fixtures::people_database().await.unwrap())
}

async fn data_source() -> DataSource {
    DataSource::builder()
        .connection(people().await)
        .main_query("SELECT id, name, city FROM people [where] [order_by] [limit] [offset]".parse().unwrap())
        .count_query("SELECT COUNT(*) AS total FROM people [where]".parse().unwrap())
        .build()
        .unwrap()
}

fn names(results: &models::Results) -> Vec<&str> {
    results
        .data()
        .iter()
        .map(|row| row["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn pages_through_sorted_rows() {
    let mut query = models::Query::new();
    query
        .set_echo(3)
        .add_order_by("city", "asc")
        .unwrap()
        .add_order_by("name", "desc")
        .unwrap()
        .set_limit(Some(2))
        .unwrap()
        .set_offset(Some(1));

    let results = data_source().await.get_results(&query).await.unwrap();

    assert_eq!(results.echo(), 3);
    assert_eq!(results.total_records(), fixtures::PEOPLE_COUNT);
    assert_eq!(results.total_display_records(), fixtures::PEOPLE_COUNT);
    assert_eq!(names(&results), vec!["Bob Jones", "Mark Annan"]);
    assert_eq!(
        results.data()[0],
        models::Row::from([
            ("id".to_string(), json!(2)),
            ("name".to_string(), json!("Bob Jones")),
            ("city".to_string(), json!("London")),
        ])
    );
}

#[tokio::test]
async fn search_across_columns() {
    let mut query = models::Query::new();
    query
        .add_filter(
            models::Filter::standard(["name", "city"], models::Operator::Contains, "ann").unwrap(),
        )
        .add_order_by("id", "asc")
        .unwrap();

    let results = data_source().await.get_results(&query).await.unwrap();

    assert_eq!(names(&results), vec!["Ann Smith", "Joanna Kowalska", "Mark Annan"]);
    assert_eq!(results.total_records(), fixtures::PEOPLE_COUNT);
    assert_eq!(results.total_display_records(), 3);
}

#[tokio::test]
async fn filters_combine_with_and() {
    let mut query = models::Query::new();
    query
        .add_filter(
            models::Filter::standard(["city"], models::Operator::InArray, json!(["Paris", "Berlin"]))
                .unwrap(),
        )
        .add_filter(models::Filter::standard(["age"], models::Operator::GreaterOrEqual, 30).unwrap())
        .add_order_by("age", "desc")
        .unwrap()
        .set_limit(Some(1))
        .unwrap();

    let results = data_source().await.get_results(&query).await.unwrap();

    assert_eq!(names(&results), vec!["Zoe Miller"]);
    assert_eq!(results.total_display_records(), 2);
}

#[tokio::test]
async fn templates_bring_their_own_values() {
    let data_source = DataSource::builder()
        .connection(people().await)
        .main_query(
            QueryTemplate::new(
                "SELECT name FROM people WHERE city = :city [:where] ORDER BY id",
                BindValues::try_from_iter([("city", json!("Paris"))]).unwrap(),
            )
            .unwrap(),
        )
        .count_query(
            QueryTemplate::new(
                "SELECT COUNT(*) FROM people WHERE city = :city [:where]",
                BindValues::try_from_iter([("city", json!("Paris"))]).unwrap(),
            )
            .unwrap(),
        )
        .build()
        .unwrap();

    let mut query = models::Query::new();
    query.add_filter(models::Filter::standard(["name"], models::Operator::StartsWith, "Mark").unwrap());
    let results = data_source.get_results(&query).await.unwrap();

    assert_eq!(names(&results), vec!["Mark Annan"]);
    assert_eq!(results.total_records(), 2);
    assert_eq!(results.total_display_records(), 1);
}

#[tokio::test]
async fn values_are_decoded_by_storage_class() {
    let connection = people().await;
    let row = connection
        .fetch_optional(&Statement {
            sql: "SELECT id, score, avatar, name, NULL AS nothing FROM people WHERE id = :id".to_string(),
            params: BindValues::try_from_iter([("id", json!(1))]).unwrap(),
        })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        serde_json::to_value(&row).unwrap(),
        json!({
            "id": 1,
            "score": 4.5,
            "avatar": [1, 255],
            "name": "Ann Smith",
            "nothing": null,
        })
    );
}

#[tokio::test]
async fn database_errors_are_reported() {
    let data_source = DataSource::builder()
        .connection(people().await)
        .main_query("SELECT * FROM nowhere".parse().unwrap())
        .count_query("SELECT COUNT(*) FROM nowhere".parse().unwrap())
        .build()
        .unwrap();

    let err = data_source
        .get_results(&models::Query::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Database(_)), "{err:?}");
}

#[tokio::test]
async fn connects_by_uri() {
    let connection = SqliteConnection::connect(fixtures::IN_MEMORY_URI).await.unwrap();
    let row = connection
        .fetch_optional(&Statement {
            sql: "SELECT 1 + 1 AS two".to_string(),
            params: BindValues::new(),
        })
        .await
        .unwrap();
    assert_eq!(row, Some(models::Row::from([("two".to_string(), json!(2))])));
}
