mod common;

use std::sync::Arc;

use crudrs::drivers::InMemoryTestDriver;
use crudrs::{get_dialect, set_dialect, CrudRsClient, DatabaseDriver, Dialect, StatementBuilder};
use pretty_assertions::assert_eq;

use common::{init_logging, Car};

// Only test in this binary: it owns the process-wide dialect.
#[tokio::test]
async fn test_global_dialect_switch() {
    init_logging();
    assert_eq!(get_dialect(), Dialect::SqlServer);

    let driver = Arc::new(InMemoryTestDriver::new());
    let client = CrudRsClient::with_driver(Arc::clone(&driver) as Arc<dyn DatabaseDriver>);
    let querier = client.querier();
    let captured = StatementBuilder::current();

    set_dialect(Dialect::MySql);
    assert_eq!(get_dialect(), Dialect::MySql);
    assert_eq!(
        StatementBuilder::current().get_list::<Car>(None).unwrap().sql,
        "SELECT CarId,Make,Model FROM `Car`"
    );

    // Captured before the switch.
    assert_eq!(
        captured.get_list::<Car>(None).unwrap().sql,
        "SELECT CarId,Make,Model FROM [Car]"
    );

    // Queriers without a pinned dialect read it per call.
    querier.delete_by_id::<Car>(7).await.unwrap();
    assert_eq!(
        driver.last_query().unwrap().sql,
        "DELETE FROM `Car` WHERE CarId = @CarId"
    );

    set_dialect(Dialect::PostgreSql);
    querier.delete_by_id::<Car>(7).await.unwrap();
    assert_eq!(
        driver.last_query().unwrap().sql,
        "DELETE FROM \"Car\" WHERE CarId = @CarId"
    );

    set_dialect(Dialect::SqlServer);
}
