use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutreachError {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Enrichment error: {0}")]
    Enrichment(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Campaign interrupted by operator")]
    Interrupted,

    #[error("Fatal session fault: {0}")]
    Fatal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
