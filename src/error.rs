use thiserror::Error;

/// Input outside the domain a health threshold is defined on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HealthError {
    #[error("ratio {0} is outside [0, 1]")]
    RatioOutOfRange(f64),

    #[error("unknown health status value: {0}")]
    UnknownStatus(i64),

    #[error("health status cell is not an integer: {0}")]
    NonNumericStatus(String),
}

/// Failures while turning a batch response into per-cluster rows.
///
/// Per-cluster query failures are carried as data on the rows; these
/// variants only cover integrity violations that make the whole batch
/// unusable.
#[derive(Error, Debug)]
pub enum InterpreterError {
    #[error("response references unknown request id: {0}")]
    UnknownRequestId(String),

    #[error("response for request {request_id} is missing column {column}")]
    MissingColumn { request_id: String, column: String },

    #[error("malformed {column} value for cluster {cluster_id}: {source}")]
    MalformedStatus {
        cluster_id: String,
        column: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("returned cluster id matches no managed cluster: {0}")]
    UnknownCluster(String),
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid query parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("query engine returned status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Error, Debug)]
pub enum GridError {
    #[error(transparent)]
    Health(#[from] HealthError),

    #[error(transparent)]
    Interpreter(#[from] InterpreterError),

    #[error(transparent)]
    Query(#[from] QueryError),
}
