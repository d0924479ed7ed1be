use thiserror::Error;

#[derive(Error, Debug)]
pub enum TileError {
    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("PE {pe} starved waiting for sub-batch in batch {batch}: {reason}")]
    QueueStarvation {
        pe: usize,
        batch: usize,
        reason: String,
    },

    #[error("queue error: {0}")]
    Queue(String),

    #[error("PE {pe} has no output tile for offset {offset}")]
    OutOfRange { pe: usize, offset: usize },
}

pub type TileResult<T> = Result<T, TileError>;
