use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid day key {0:?}, expected YYYY-MM-DD")]
    InvalidDay(String),

    #[error("no store file for day {0}")]
    DayNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
