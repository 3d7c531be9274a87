pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("step {step_id}: body is neither JSON nor UTF-8 text")]
    BodyNotUtf8 { step_id: u16 },
}
