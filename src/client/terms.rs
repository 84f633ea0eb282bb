use crate::params::Parameters;
use crate::settings::ListSettings;
use crate::transport::Connection;
use crate::types::Term;
use crate::{BoxStream, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Enrolment terms of an account.
#[derive(Debug, Clone, Copy)]
pub struct Terms<'a> {
    connection: &'a Connection,
}

impl<'a> Terms<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    /// Terms are returned wrapped in an `enrollment_terms` object on every page.
    pub fn list_for_account(
        &self,
        account_id: u64,
        settings: &ListSettings,
        cancel: &CancellationToken,
    ) -> BoxStream<'a, Term> {
        debug!(account_id, "Listing terms for account");
        self.connection.list_enveloped(
            &format!("api/v1/accounts/{}/terms", account_id),
            settings,
            "enrollment_terms",
            cancel,
        )
    }

    pub async fn retrieve(
        &self,
        account_id: u64,
        term_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Option<Term>> {
        debug!(account_id, term_id, "Retrieving term");
        self.connection
            .retrieve(
                &format!("api/v1/accounts/{}/terms/{}", account_id, term_id),
                &Parameters::new(),
                cancel,
            )
            .await
    }
}
