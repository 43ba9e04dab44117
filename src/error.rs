use std::path::PathBuf;
use thiserror::Error;

/// repogen errors
#[derive(Error, Debug)]
pub enum RepogenError {
    #[error("read config file '{path}' failed: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unmarshal config file '{path}' failed: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("list tables failed: {0}")]
    Introspection(String),

    #[error("create output directory '{path}' failed: {source}")]
    DirCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("render template for '{name}' failed: {message}")]
    TemplateRender { name: String, message: String },

    #[error("write file '{path}' ({name}) failed: {source}")]
    FileWrite {
        path: PathBuf,
        name: String,
        source: std::io::Error,
    },

    #[error("model generation failed: {0}")]
    Execute(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
