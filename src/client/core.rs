use crate::client::{Accounts, CanvasClientBuilder, Courses, CurrentUser};
use crate::transport::Connection;
use std::sync::Arc;

/// Entry point to a Canvas site.
///
/// Cloning is cheap; clones share the same [`Connection`].
#[derive(Debug, Clone)]
pub struct CanvasClient {
    connection: Arc<Connection>,
}

impl CanvasClient {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    pub fn builder() -> CanvasClientBuilder {
        CanvasClientBuilder::new()
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn accounts(&self) -> Accounts<'_> {
        Accounts::new(&self.connection)
    }

    pub fn courses(&self) -> Courses<'_> {
        Courses::new(&self.connection)
    }

    pub fn current_user(&self) -> CurrentUser<'_> {
        CurrentUser::new(&self.connection)
    }
}
