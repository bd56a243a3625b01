//! Errors raised while parsing raw input from the command line or session

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("unknown resource type '{0}' (expected ore, ice or gas)")]
    UnknownResourceType(String),

    #[error("invalid setup '{0}' (expected 1 or 2)")]
    InvalidSetupId(String),

    #[error("unknown mode '{0}' (expected single or compare)")]
    UnknownMode(String),

    #[error("malformed edit '{0}' (expected field=value)")]
    MalformedEdit(String),
}
