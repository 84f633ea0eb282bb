//! Request settings that render into query parameters.
//!
//! Every list variant embeds a base [`ListSettings`] and appends its own
//! filters after the paging parameters, so `per_page`/`page` always lead the
//! query string.

mod assignment;
mod course;
mod list;
mod submission;

pub use assignment::{AssignmentInclude, AssignmentItem, AssignmentList};
pub use course::{CourseInclude, CourseItem, CourseList};
pub use list::{ListSettings, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use submission::{SubmissionInclude, SubmissionList};

use crate::params::Parameters;

/// Anything that can be rendered as query parameters.
pub trait ToParameters {
    fn to_parameters(&self) -> Parameters;
}

/// Settings for a paginated list call.
pub trait Paged: ToParameters {
    fn list_settings(&self) -> &ListSettings;

    /// Client-side ceiling on the number of pages fetched.
    fn max_pages(&self) -> usize {
        self.list_settings().max_pages
    }
}
