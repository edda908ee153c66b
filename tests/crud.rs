mod common;

use crudrs::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder, QueryKind};
use crudrs::{CommandOptions, CrudRsError, Dialect, Filter, Parameters, SqlValue, TransactionId};
use uuid::Uuid;

use common::{setup, Car, City, DayOfWeek, GuidTest, KeyMaster, User};

fn car_rows() -> InMemoryTestResponseBuilder {
    InMemoryTestResponseBuilder::new().columns(&["CarId", "Make", "Model"])
}

#[tokio::test]
async fn test_insert_returns_identity() {
    let (driver, querier) = setup(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row([SqlValue::Int64(1)])
                .build(),
        ),
        Dialect::SqlServer,
    );

    let mut car = Car {
        make: "Honda".into(),
        model: "Accord".into(),
        ..Default::default()
    };
    let id: i32 = querier.insert(&mut car).await.unwrap();

    assert_eq!(id, 1);
    assert_eq!(car.car_id, 1);
    driver.assert_last_query(
        "INSERT INTO [Car] (Make, Model) VALUES (@Make, @Model);SELECT CAST(SCOPE_IDENTITY() AS BIGINT) AS [id]",
        &[("Make", "Honda".into()), ("Model", "Accord".into())],
    );
    driver.assert_query_count(1);
    assert_eq!(driver.last_query().unwrap().kind, QueryKind::Query);
}

#[tokio::test]
async fn test_insert_identity_per_dialect() {
    for (dialect, suffix) in [
        (Dialect::PostgreSql, ";SELECT LASTVAL() AS id"),
        (Dialect::Sqlite, ";SELECT LAST_INSERT_ROWID() AS id"),
        (Dialect::MySql, ";SELECT LAST_INSERT_ID() AS id"),
    ] {
        let (driver, querier) = setup(
            InMemoryTestDriver::new().with_response(
                InMemoryTestResponseBuilder::new()
                    .columns(&["id"])
                    .row([SqlValue::Int64(42)])
                    .build(),
            ),
            dialect,
        );
        let mut car = Car::default();
        let id: i64 = querier.insert(&mut car).await.unwrap();
        assert_eq!(id, 42);
        assert!(driver.last_query().unwrap().sql.ends_with(suffix));
    }
}

#[tokio::test]
async fn test_insert_without_identity_support() {
    let (driver, querier) = setup(InMemoryTestDriver::new().with_affected(1), Dialect::Oracle);

    let mut car = Car {
        make: "Ford".into(),
        ..Default::default()
    };
    let id: i32 = querier.insert(&mut car).await.unwrap();

    assert_eq!(id, 0);
    let last = driver.last_query().unwrap();
    assert_eq!(last.sql, "INSERT INTO \"Car\" (Make, Model) VALUES (@Make, @Model)");
    assert_eq!(last.kind, QueryKind::Execute);
}

#[tokio::test]
async fn test_insert_generates_guid() {
    let (driver, querier) = setup(InMemoryTestDriver::new().with_affected(1), Dialect::SqlServer);

    let mut row = GuidTest {
        name: "thing".into(),
        ..Default::default()
    };
    let id: Uuid = querier.insert(&mut row).await.unwrap();

    assert_ne!(id, Uuid::nil());
    assert_eq!(row.guid, id);
    driver.assert_last_query(
        "INSERT INTO [GuidTest] (guid, name) VALUES (@guid, @name)",
        &[("guid", SqlValue::Uuid(id)), ("name", "thing".into())],
    );
}

#[tokio::test]
async fn test_insert_text_key_returns_supplied_value() {
    let (driver, querier) = setup(InMemoryTestDriver::new(), Dialect::PostgreSql);

    let mut city = City {
        name: "Fairmont".into(),
        population: 18000,
    };
    let id: String = querier.insert(&mut city).await.unwrap();

    assert_eq!(id, "Fairmont");
    driver.assert_last_query(
        "INSERT INTO \"City\" (name, population) VALUES (@name, @population)",
        &[("name", "Fairmont".into()), ("population", SqlValue::Int64(18000))],
    );
}

#[tokio::test]
async fn test_insert_rejects_unsupported_key_types() {
    let (driver, querier) = setup(InMemoryTestDriver::new(), Dialect::SqlServer);

    let mut car = Car::default();
    let result = querier.insert::<_, f64>(&mut car).await;
    assert!(matches!(result, Err(CrudRsError::UnsupportedKeyType { .. })));

    let mut master = KeyMaster::default();
    let result = querier.insert::<_, i32>(&mut master).await;
    assert!(matches!(result, Err(CrudRsError::MultipleKeys { count: 2, .. })));

    driver.assert_query_count(0);
}

#[tokio::test]
async fn test_insert_rejects_key_type_mismatch_before_sending() {
    let (driver, querier) = setup(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row([SqlValue::Int64(1)])
                .build(),
        ),
        Dialect::SqlServer,
    );

    let mut car = Car {
        make: "Honda".into(),
        ..Default::default()
    };
    let result = querier.insert::<_, Uuid>(&mut car).await;
    assert!(matches!(
        result,
        Err(CrudRsError::KeyTypeMismatch { key, requested, .. })
            if key == "Int32" && requested == "Uuid"
    ));

    let mut row = GuidTest::default();
    let result = querier.insert::<_, String>(&mut row).await;
    assert!(matches!(result, Err(CrudRsError::KeyTypeMismatch { .. })));

    driver.assert_query_count(0);
    assert_eq!(car.car_id, 0);
    assert_eq!(row.guid, Uuid::nil());

    // Integer widths still convert.
    let id: i64 = querier.insert(&mut car).await.unwrap();
    assert_eq!(id, 1);
    assert_eq!(car.car_id, 1);
}

#[tokio::test]
async fn test_get_list_with_filter() {
    let (driver, querier) = setup(
        InMemoryTestDriver::new().with_response(
            car_rows()
                .row([SqlValue::Int32(1), "Honda".into(), "Accord".into()])
                .row([SqlValue::Int32(2), "Honda".into(), "Civic".into()])
                .build(),
        ),
        Dialect::SqlServer,
    );

    let cars = querier
        .get_list::<Car>(&Filter::new().eq("Make", "Honda"))
        .await
        .unwrap();

    driver.assert_last_query(
        "SELECT CarId,Make,Model FROM [Car] WHERE Make = @Make",
        &[("Make", "Honda".into())],
    );
    assert_eq!(cars.len(), 2);
    assert_eq!(cars[1].model, "Civic");
}

#[tokio::test]
async fn test_null_filter_matches_is_null() {
    let (driver, querier) = setup(InMemoryTestDriver::new(), Dialect::SqlServer);

    let users = querier
        .get_list::<User>(&Filter::new().is_null("ScheduledDayOff"))
        .await
        .unwrap();
    assert!(users.is_empty());
    driver.assert_last_query(
        "SELECT Id,Name,Age,ScheduledDayOff FROM [Users] WHERE ScheduledDayOff is null",
        &[],
    );

    querier
        .get_list::<User>(&Filter::new().eq("ScheduledDayOff", SqlValue::Int32(5)))
        .await
        .unwrap();
    driver.assert_last_query(
        "SELECT Id,Name,Age,ScheduledDayOff FROM [Users] WHERE ScheduledDayOff = @ScheduledDayOff",
        &[("ScheduledDayOff", SqlValue::Int32(5))],
    );
}

#[tokio::test]
async fn test_get_maps_row_or_returns_none() {
    let (driver, querier) = setup(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["Id", "Name", "Age", "ScheduledDayOff"])
                .row([
                    SqlValue::Int32(3),
                    "Ann".into(),
                    SqlValue::Int32(40),
                    SqlValue::Int32(5),
                ])
                .build(),
        ),
        Dialect::SqlServer,
    );

    let user = querier.get::<User>(3).await.unwrap().unwrap();
    driver.assert_last_query(
        "SELECT Id,Name,Age,ScheduledDayOff FROM [Users] WHERE Id = @Id",
        &[("Id", SqlValue::Int32(3))],
    );
    assert_eq!(user.Name, "Ann");
    assert_eq!(user.ScheduledDayOff, Some(DayOfWeek::Friday));
    // Not selected, so left at its default.
    assert_eq!(user.CreatedDate, None);

    // Queue is empty now, the driver answers with no rows.
    assert!(querier.get::<User>(4).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_all_and_raw_conditions() {
    let (driver, querier) = setup(InMemoryTestDriver::new(), Dialect::Sqlite);

    querier.get_all::<Car>().await.unwrap();
    driver.assert_last_query("SELECT CarId,Make,Model FROM \"Car\"", &[]);

    querier
        .get_list_where::<Car>(
            "where Make = @Make order by Model",
            Parameters::new().bind("Make", "Kia"),
        )
        .await
        .unwrap();
    driver.assert_last_query(
        "SELECT CarId,Make,Model FROM \"Car\" where Make = @Make order by Model",
        &[("Make", "Kia".into())],
    );
}

#[tokio::test]
async fn test_get_list_paged() {
    let (driver, querier) = setup(InMemoryTestDriver::new(), Dialect::Sqlite);
    querier
        .get_list_paged::<Car>(1, 10, "", None, Parameters::new())
        .await
        .unwrap();
    driver.assert_last_query(
        "SELECT CarId,Make,Model FROM \"Car\"  ORDER BY CarId LIMIT 10 OFFSET 0",
        &[],
    );

    let (driver, querier) = setup(InMemoryTestDriver::new(), Dialect::SqlServer);
    querier
        .get_list_paged::<Car>(1, 10, "where Make = @Make", Some("Model"), Parameters::new().bind("Make", "Kia"))
        .await
        .unwrap();
    driver.assert_last_query(
        "SELECT * FROM (SELECT ROW_NUMBER() OVER(ORDER BY Model) AS PagedNumber, CarId,Make,Model FROM [Car] where Make = @Make) AS u WHERE PagedNumber BETWEEN ((1-1) * 10 + 1) AND (1 * 10)",
        &[("Make", "Kia".into())],
    );

    let result = querier
        .get_list_paged::<Car>(0, 10, "", None, Parameters::new())
        .await;
    assert!(matches!(result, Err(CrudRsError::InvalidPageNumber(0))));
    driver.assert_query_count(1);
}

#[tokio::test]
async fn test_update_and_upsert() {
    let (driver, querier) = setup(
        InMemoryTestDriver::new().with_affected(1).with_affected(1),
        Dialect::SqlServer,
    );
    let car = Car {
        car_id: 7,
        make: "Toyota".into(),
        model: "Camry".into(),
    };

    assert_eq!(querier.update(&car).await.unwrap(), 1);
    driver.assert_last_query(
        "UPDATE [Car] SET Make = @Make, Model = @Model WHERE CarId = @CarId",
        &[
            ("Make", "Toyota".into()),
            ("Model", "Camry".into()),
            ("CarId", SqlValue::Int32(7)),
        ],
    );

    assert_eq!(querier.upsert(&car).await.unwrap(), 1);
    assert_eq!(
        driver.last_query().unwrap().sql,
        "UPDATE [Car] SET Make = @Make, Model = @Model WHERE CarId = @CarId; IF @@ROWCOUNT = 0 BEGIN INSERT INTO [Car] (Make, Model) VALUES (@Make, @Model) END"
    );

    let (driver, querier) = setup(InMemoryTestDriver::new(), Dialect::Oracle);
    assert!(matches!(
        querier.upsert(&car).await,
        Err(CrudRsError::UpsertNotSupported { dialect }) if dialect == "Oracle"
    ));
    driver.assert_query_count(0);
}

#[tokio::test]
async fn test_deletes() {
    let (driver, querier) = setup(
        InMemoryTestDriver::new().with_default_affected(1),
        Dialect::SqlServer,
    );

    let car = Car {
        car_id: 7,
        ..Default::default()
    };
    assert_eq!(querier.delete(&car).await.unwrap(), 1);
    driver.assert_last_query(
        "DELETE FROM [Car] WHERE CarId = @CarId",
        &[("CarId", SqlValue::Int32(7))],
    );

    querier.delete_by_id::<Car>(8).await.unwrap();
    driver.assert_last_query(
        "DELETE FROM [Car] WHERE CarId = @CarId",
        &[("CarId", SqlValue::Int32(8))],
    );

    let id = Filter::new().eq("key1", 1).eq("key2", 2);
    querier.delete_by_id::<KeyMaster>(id).await.unwrap();
    driver.assert_last_query(
        "DELETE FROM [KeyMaster] WHERE key1 = @key1 AND key2 = @key2",
        &[("key1", SqlValue::Int32(1)), ("key2", SqlValue::Int32(2))],
    );

    querier
        .delete_list::<Car>("where Make = @Make", Parameters::new().bind("Make", "Kia"))
        .await
        .unwrap();
    driver.assert_last_query(
        "DELETE FROM [Car] where Make = @Make",
        &[("Make", "Kia".into())],
    );
    driver.assert_query_count(4);

    for conditions in ["", "Make = 'Kia'"] {
        let result = querier.delete_list::<Car>(conditions, Parameters::new()).await;
        assert!(matches!(result, Err(CrudRsError::MissingWhereClause(_))));
    }
    driver.assert_query_count(4);
}

#[tokio::test]
async fn test_record_count() {
    let count = |n: i64| {
        InMemoryTestResponseBuilder::new()
            .columns(&[""])
            .row([SqlValue::Int64(n)])
            .build()
    };
    let (driver, querier) = setup(
        InMemoryTestDriver::new()
            .with_response(count(12))
            .with_response(count(3)),
        Dialect::SqlServer,
    );

    assert_eq!(querier.record_count::<Car>("", Parameters::new()).await.unwrap(), 12);
    driver.assert_last_query("SELECT count(1) FROM [Car]", &[]);

    let filter = Filter::new().eq("Make", "Honda");
    assert_eq!(querier.record_count_filter::<Car>(&filter).await.unwrap(), 3);
    driver.assert_last_query(
        "SELECT count(1) FROM [Car] WHERE Make = @Make",
        &[("Make", "Honda".into())],
    );

    // No rows at all counts as zero.
    assert_eq!(querier.record_count::<Car>("where 1 = 0", Parameters::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_command_options_are_forwarded() {
    let (driver, querier) = setup(InMemoryTestDriver::new(), Dialect::SqlServer);

    querier
        .clone()
        .in_transaction(TransactionId(9))
        .timeout(30)
        .get_all::<Car>()
        .await
        .unwrap();
    assert_eq!(
        driver.last_query().unwrap().options,
        CommandOptions {
            transaction: Some(TransactionId(9)),
            timeout: Some(30),
        }
    );

    querier.get_all::<Car>().await.unwrap();
    assert_eq!(driver.last_query().unwrap().options, CommandOptions::default());
}
