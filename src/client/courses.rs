use crate::client::Assignments;
use crate::settings::{CourseInclude, CourseItem, CourseList, ToParameters};
use crate::transport::Connection;
use crate::types::Course;
use crate::{BoxStream, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Course listing and lookup. Every call includes the course term.
#[derive(Debug, Clone, Copy)]
pub struct Courses<'a> {
    connection: &'a Connection,
}

impl<'a> Courses<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    pub fn assignments(&self) -> Assignments<'a> {
        Assignments::new(self.connection)
    }

    pub fn list_for_current_user(
        &self,
        settings: &CourseList,
        cancel: &CancellationToken,
    ) -> BoxStream<'a, Course> {
        let settings = with_term(settings);
        debug!("Listing courses for current user");
        self.connection.list("api/v1/courses", &settings, cancel)
    }

    pub fn list_for_account(
        &self,
        account_id: u64,
        settings: &CourseList,
        cancel: &CancellationToken,
    ) -> BoxStream<'a, Course> {
        let settings = with_term(settings);
        debug!(account_id, "Listing courses for account");
        self.connection.list(
            &format!("api/v1/accounts/{}/courses", account_id),
            &settings,
            cancel,
        )
    }

    pub async fn retrieve(
        &self,
        id: u64,
        settings: &CourseItem,
        cancel: &CancellationToken,
    ) -> Result<Option<Course>> {
        let settings = settings.clone().with_options(settings.options | CourseInclude::Term);
        debug!(course_id = id, "Retrieving course");
        self.connection
            .retrieve(&format!("api/v1/courses/{}", id), &settings.to_parameters(), cancel)
            .await
    }
}

fn with_term(settings: &CourseList) -> CourseList {
    settings.clone().with_options(settings.options | CourseInclude::Term)
}
