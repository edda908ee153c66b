mod tokio_postgres;

pub use self::in_memory_test::{
    InMemoryTestDriver, InMemoryTestResponseBuilder, QueryKind, RecordedQuery,
};
pub use self::tokio_postgres::TokioPostgresDriver;
