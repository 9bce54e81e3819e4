use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Transport error: {0}")]
    Transport(String),
}
