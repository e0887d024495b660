//! Error types for the varsmith crate.
//!
//! Parsing and resolution never fail as a whole: a declaration that cannot be
//! classified, or an alias that cannot be resolved, is reported per entry in a
//! [`ParseReport`](crate::ParseReport). The errors here cover the ambient
//! concerns around the engine: loading configuration and talking to a store.

use std::path::PathBuf;

use thiserror::Error;

use crate::value::VariableKind;

/// Errors raised while loading an [`ImportConfig`](crate::ImportConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid YAML for the expected schema.
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration is not valid JSON for the expected schema.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a [`VariableStore`](crate::VariableStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("store I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file does not contain a valid store document.
    #[error("invalid store document: {0}")]
    Json(#[from] serde_json::Error),

    /// An existing variable has a different type than the incoming entry.
    #[error("variable '{name}' is stored as {stored}, cannot update it with a {incoming} value")]
    TypeMismatch {
        name: String,
        stored: VariableKind,
        incoming: VariableKind,
    },
}

/// Top-level error for operations that combine configuration and storage.
#[derive(Debug, Error)]
pub enum VarsmithError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for varsmith operations.
pub type Result<T> = std::result::Result<T, VarsmithError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_io_error_display() {
        let err = ConfigError::Io {
            path: PathBuf::from("tokens.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("tokens.yaml"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = StoreError::TypeMismatch {
            name: "space/sm".into(),
            stored: VariableKind::Color,
            incoming: VariableKind::Number,
        };
        assert_eq!(
            err.to_string(),
            "variable 'space/sm' is stored as COLOR, cannot update it with a FLOAT value"
        );
    }

    #[test]
    fn test_store_error_converts_into_top_level() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: VarsmithError = StoreError::from(json_err).into();
        assert!(matches!(err, VarsmithError::Store(StoreError::Json(_))));
        assert!(err.to_string().contains("invalid store document"));
    }
}
