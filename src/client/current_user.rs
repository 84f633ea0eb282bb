use crate::params::Parameters;
use crate::transport::Connection;
use crate::types::User;
use crate::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The user the access token belongs to.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser<'a> {
    connection: &'a Connection,
}

impl<'a> CurrentUser<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    pub async fn get(&self, cancel: &CancellationToken) -> Result<Option<User>> {
        debug!("Retrieving current user details");
        self.connection
            .retrieve("api/v1/users/self", &Parameters::new(), cancel)
            .await
    }
}
