use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    IoContext {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse JSON at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize JSON: {source}")]
    JsonSerialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("GitLab {operation} failed: {status} - {body}")]
    Remote {
        operation: String,
        status: u16,
        body: String,
    },
    #[error("{invalid_rows} row(s) failed validation")]
    Validation { invalid_rows: usize },
    #[error("A save is already in progress")]
    SaveInProgress,
    #[error("{0}")]
    Message(String),
}

impl AppError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_includes_operation_and_status() {
        let err = AppError::Remote {
            operation: "delete variable".to_string(),
            status: 404,
            body: "{\"message\":\"404 Variable Not Found\"}".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("delete variable"), "{text}");
        assert!(text.contains("404"), "{text}");
    }

    #[test]
    fn io_error_reports_path() {
        let err = AppError::io(
            "/tmp/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/missing.json"));
    }
}
