#[derive(Debug)]
pub enum Error {
    IOError(std::io::Error),
    TOMLParseError(toml::de::Error),
    JSONError(serde_json::Error),
    BadLogLevel(String),
    LogInitError(String),
    BadCommand(String),
    SessionError(attempt_session::Error),
    Disabled(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IOError(e) => {
                write!(f, "input/output error: {}", e)
            }
            Self::TOMLParseError(e) => {
                write!(f, "error parsing TOML: {}", e)
            }
            Self::JSONError(e) => {
                write!(f, "error encoding JSON: {}", e)
            }
            Self::BadLogLevel(e) => {
                write!(f, "invalid log level {}", e)
            }
            Self::LogInitError(e) => {
                write!(f, "cannot initialize logging: {}", e)
            }
            Self::BadCommand(c) => {
                write!(f, "bad command {}", c)
            }
            Self::SessionError(e) => {
                write!(f, "{}", e)
            }
            Self::Disabled(what) => {
                write!(f, "{} disabled at build time", what)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<attempt_session::Error> for Error {
    fn from(e: attempt_session::Error) -> Self {
        Self::SessionError(e)
    }
}
