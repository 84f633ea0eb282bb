use crate::transport::TransportError;
use crate::types::ApiErrorDetail;
use thiserror::Error;

/// Structured error context for configuration and validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field or setting that caused the error (e.g., "assignment.name", "connection.token")
    pub field_path: Option<String>,
    /// Additional context about the error
    pub details: Option<String>,
    /// Source of the error (e.g., "assignments_client", "connection_builder")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The step of the file upload protocol that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// Requesting an upload token from Canvas.
    Initiate,
    /// Sending the file bytes to the storage endpoint.
    Transfer,
    /// Fetching the final entity once the transfer completed.
    Finalize,
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UploadStage::Initiate => "initiate",
            UploadStage::Transfer => "transfer",
            UploadStage::Finalize => "finalize",
        };
        f.write_str(name)
    }
}

/// Unified error type for the Canvas client.
///
/// Server failures are split by what could be recovered from the response:
/// [`Error::Canvas`] when the body held one of the two Canvas error shapes,
/// [`Error::Http`] when it did not, and [`Error::NoResponse`] when no response
/// arrived at all.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{message}")]
    NoResponse {
        url: String,
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{message}")]
    Canvas {
        url: String,
        status: u16,
        message: String,
        errors: Vec<ApiErrorDetail>,
    },

    #[error("{message}")]
    Http {
        url: String,
        status: u16,
        message: String,
        content: String,
    },

    #[error("Upload failed during {stage}: {message}")]
    Upload { stage: UploadStage, message: String },

    #[error("{message}")]
    MissingEntity { message: String },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn upload(stage: UploadStage, msg: impl Into<String>) -> Self {
        Error::Upload {
            stage,
            message: msg.into(),
        }
    }

    pub fn missing_entity(msg: impl Into<String>) -> Self {
        Error::MissingEntity {
            message: msg.into(),
        }
    }

    /// The URL of the failed call, for errors raised by the connection.
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::NoResponse { url, .. } | Error::Canvas { url, .. } | Error::Http { url, .. } => {
                Some(url)
            }
            _ => None,
        }
    }

    /// HTTP status code, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Canvas { status, .. } | Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of an unclassifiable failure.
    pub fn content(&self) -> Option<&str> {
        match self {
            Error::Http { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Structured Canvas errors; empty for every other kind of failure.
    pub fn errors(&self) -> &[ApiErrorDetail] {
        match self {
            Error::Canvas { errors, .. } => errors,
            _ => &[],
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }
}
