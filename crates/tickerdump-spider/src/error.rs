use thiserror::Error;

/// Errors raised inside the spider.
///
/// Only [`Error::SourceUnreachable`] (and the transport errors that produce it) are meant to
/// stop a run; everything else is logged against the offending record and skipped.
#[derive(Debug, Error)]
pub enum Error {
    #[error("source unreachable: {0}")]
    SourceUnreachable(String),

    #[error("http error({0})")]
    Http(#[from] reqwest::Error),

    #[error("ftp error({0})")]
    Ftp(#[from] suppaftp::FtpError),

    #[error("csv error({0})")]
    Csv(#[from] csv::Error),

    #[error("json error({0})")]
    Json(#[from] serde_json::Error),

    #[error("postgres error({0})")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("postgres pool error({0})")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("postgres pool creation error({0})")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    #[error("store rejected write: {0}")]
    Store(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("task failed to complete({0})")]
    Join(#[from] tokio::task::JoinError),
}
