//! Mock Canvas server setup for integration tests

use canvas_lms_client::{CanvasClient, CanvasClientBuilder, Connection};
use mockito::{Mock, Server, ServerGuard};

pub const TOKEN: &str = "test-token";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// A connection whose base URL carries the `api/v1` suffix, as users usually pass it.
    pub fn connection(&self) -> Connection {
        Connection::new(format!("{}/api/v1/", self.base_url), TOKEN).expect("connection")
    }

    pub fn client(&self) -> CanvasClient {
        CanvasClientBuilder::new()
            .via_http(&self.base_url, TOKEN)
            .expect("connection")
            .build()
            .expect("client")
    }

    /// An absolute URL on the mock server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a mock for a successful JSON response
    pub async fn mock_json(&mut self, method: &str, path: &str, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Create a mock for an error response
    pub async fn mock_error(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Create a mock for one page of a list, linking to `next` when given.
    pub async fn mock_page(&mut self, path: &str, body: &str, next: Option<&str>) -> Mock {
        let mut mock = self
            .server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body);
        if let Some(next) = next {
            let link = format!(
                r#"<{}>; rel="current", <{}>; rel="next", <{}>; rel="first""#,
                self.url(path),
                self.url(next),
                self.url(path)
            );
            mock = mock.with_header("link", &link);
        }
        mock.expect(1).create_async().await
    }
}
