use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no route for table \"{0}\": its sharding conditions match no data node")]
    NoTargets(String),

    #[error("table \"{table}\" can't be aligned with binding table \"{primary}\": {reason}")]
    BindingMismatch {
        table: String,
        primary: String,
        reason: String,
    },

    #[error("tables {tables:?} don't share a data source")]
    NoCommonDataSource { tables: Vec<String> },

    #[error("no sharding rule for tables {0:?} and no default data source")]
    NoDataSource(Vec<String>),

    #[error("route for {tables:?} needs {units} units {candidates:?}, max_route_units is {max}")]
    RouteExplosion {
        tables: Vec<String>,
        candidates: Vec<usize>,
        units: usize,
        max: usize,
    },

    #[error("row {row} of insert into \"{table}\" routes to {nodes} data nodes, expected one")]
    InsertMultipleNodes {
        table: String,
        row: usize,
        nodes: usize,
    },

    #[error("sharding column \"{column}\" of \"{table}\" can't be updated")]
    ShardingKeyUpdate { table: String, column: String },

    #[error("parameter {0} is referenced but not bound")]
    MissingParameter(usize),

    #[error("hint error: {0}")]
    Hint(String),

    #[error("data source \"{0}\" doesn't exist")]
    UnknownDataSource(String),

    #[error("{0}")]
    Sharding(#[from] crate::sharding::Error),
}
