#![forbid(unsafe_code)]

use poem_openapi::Object;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("kraken_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    #[error("Invalid value for feature flag {}: {:?}", .0, .1)]
    InvalidFeatureFlag(String, String),

    #[error("Invalid value for query parameter {}: {:?}", .0, .1)]
    InvalidQueryParm(String, String),

    #[error("Incomplete TLS configuration: {}", .0)]
    TlsConfig(String),

    /// The referenced message id is not in the store.
    #[error("Message {} not found", .0)]
    MessageNotFound(i64),

    /// A patch tried to assign a different id to an existing message.
    #[error("Message {} cannot change its id to {}", .0, .1)]
    IdentityChange(i64, String),

    /// The id counter cannot advance any further.
    #[error("Message ids are exhausted")]
    IdsExhausted,

    /// A merged or submitted record is not a valid message.
    #[error("Invalid message: {}", .0)]
    InvalidMessage(String),
}

// ***************************************************************************
//                             HTTP Error Body
// ***************************************************************************
/// Body returned with every non-success status code.
#[derive(Object, Debug)]
pub struct HttpResult {
    pub result_code: String,
    pub result_msg: String,
}

impl HttpResult {
    pub fn new(result_code: String, result_msg: String) -> Self {
        Self { result_code, result_msg }
    }
}
