use thiserror::Error;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;
use std::io::Error as IoError;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("{0} not set")]
    MissingConfig(&'static str),

    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Rendering error: {0}")]
    Rendering(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] JsonError),

    #[error("IO error: {0}")]
    Io(#[from] IoError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<opendal::Error> for ToolError {
    fn from(err: opendal::Error) -> Self {
        ToolError::Storage(err.to_string())
    }
}

impl From<zip::result::ZipError> for ToolError {
    fn from(err: zip::result::ZipError) -> Self {
        ToolError::Rendering(err.to_string())
    }
}

impl From<toml::de::Error> for ToolError {
    fn from(err: toml::de::Error) -> Self {
        ToolError::InvalidConfig(err.to_string())
    }
}

impl From<crate::security::ValidationError> for ToolError {
    fn from(err: crate::security::ValidationError) -> Self {
        ToolError::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
