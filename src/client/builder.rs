use crate::client::core::CanvasClient;
use crate::transport::{Connection, LoggingResponseInterceptor};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;

/// Builder wiring a [`Connection`] into a [`CanvasClient`].
///
/// ```rust,no_run
/// use canvas_lms_client::CanvasClientBuilder;
///
/// # fn main() -> canvas_lms_client::Result<()> {
/// let client = CanvasClientBuilder::new()
///     .via_http("https://canvas.example.edu", "access-token")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CanvasClientBuilder {
    connection: Option<Arc<Connection>>,
}

impl CanvasClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing connection.
    pub fn connection(mut self, connection: Arc<Connection>) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Connect over HTTP with a bearer token.
    pub fn via_http(self, url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let connection = Connection::new(url, token)?;
        Ok(self.connection(Arc::new(connection)))
    }

    /// Like [`via_http`](Self::via_http), logging every JSON response body at debug level.
    pub fn via_http_with_response_logging(
        self,
        url: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let connection = Connection::builder(url, token)
            .response_interceptor(Arc::new(LoggingResponseInterceptor))
            .build()?;
        Ok(self.connection(Arc::new(connection)))
    }

    /// Connect using `CANVAS_URL` and `CANVAS_TOKEN`.
    pub fn from_env(self) -> Result<Self> {
        let url = required_env("CANVAS_URL")?;
        let token = required_env("CANVAS_TOKEN")?;
        self.via_http(url, token)
    }

    pub fn build(self) -> Result<CanvasClient> {
        let connection = self.connection.ok_or_else(|| {
            Error::configuration_with_context(
                "Connection must be initialised",
                ErrorContext::new()
                    .with_field_path("connection")
                    .with_source("client_builder"),
            )
        })?;
        Ok(CanvasClient::new(connection))
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| {
        Error::configuration_with_context(
            format!("{} is not set", name),
            ErrorContext::new().with_field_path(name).with_source("environment"),
        )
    })
}
