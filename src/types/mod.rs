//! Entity records returned by the Canvas API.

pub mod account;
pub mod assignment;
pub mod course;
pub mod file_upload;
pub mod submission;
pub mod user;

pub use account::{Account, Term};
pub use assignment::{Assignment, AssignmentDate, PeerReview, RubricItem, RubricRating};
pub use course::Course;
pub use file_upload::FileUpload;
pub use submission::{
    AssessmentRubric, Submission, SubmissionComment, SubmissionCommentAttachment,
    SubmissionFile, SubmissionRubric, SubmissionSummary,
};
pub use user::User;

use crate::params::EnumParameter;
use serde::{Deserialize, Serialize};

/// A record identified by a numeric Canvas id.
pub trait Entity {
    fn id(&self) -> u64;

    /// Two entities are the same record when their ids match.
    fn same_entity(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.id() == other.id()
    }
}

/// One entry of a Canvas error payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Role of a user within a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrolmentType {
    Student,
    Teacher,
    Ta,
    Observer,
    Designer,
}

impl EnumParameter for EnrolmentType {
    fn variant_name(&self) -> &'static str {
        match self {
            EnrolmentType::Student => "Student",
            EnrolmentType::Teacher => "Teacher",
            EnrolmentType::Ta => "TA",
            EnrolmentType::Observer => "Observer",
            EnrolmentType::Designer => "Designer",
        }
    }
}

/// Late-policy state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatePolicyStatus {
    None,
    Missing,
    Extended,
    Late,
}

impl EnumParameter for LatePolicyStatus {
    fn variant_name(&self) -> &'static str {
        match self {
            LatePolicyStatus::None => "None",
            LatePolicyStatus::Missing => "Missing",
            LatePolicyStatus::Extended => "Extended",
            LatePolicyStatus::Late => "Late",
        }
    }
}
