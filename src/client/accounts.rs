use crate::client::Terms;
use crate::params::Parameters;
use crate::settings::ListSettings;
use crate::transport::Connection;
use crate::types::Account;
use crate::{BoxStream, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct Accounts<'a> {
    connection: &'a Connection,
}

impl<'a> Accounts<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    pub fn terms(&self) -> Terms<'a> {
        Terms::new(self.connection)
    }

    /// Accounts the current user can administer.
    pub fn list_for_current_user(
        &self,
        settings: &ListSettings,
        cancel: &CancellationToken,
    ) -> BoxStream<'a, Account> {
        debug!("Listing accounts for current user");
        self.connection.list("api/v1/accounts", settings, cancel)
    }

    pub async fn retrieve(&self, id: u64, cancel: &CancellationToken) -> Result<Option<Account>> {
        debug!(account_id = id, "Retrieving account");
        self.connection
            .retrieve(&format!("api/v1/accounts/{}", id), &Parameters::new(), cancel)
            .await
    }
}
