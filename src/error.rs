/// Errors raised while loading configuration or building the helper registry.
///
/// None of these are per-request conditions: an unsupported link is `Ok(None)`
/// and a link with nothing to show is `Ok(Some(""))`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("helper `{0}` declares no link pattern")]
    MissingPattern(&'static str),

    #[error("invalid link pattern for helper `{helper}`: {source}")]
    InvalidPattern {
        helper: &'static str,
        source: regex::Error,
    },

    #[error("helper `{0}` is registered more than once")]
    DuplicateHelper(&'static str),

    #[error("unknown helper `{0}`")]
    UnknownHelper(String),

    #[error("template `{0}` not found")]
    MissingTemplate(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
