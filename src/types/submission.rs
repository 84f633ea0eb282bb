use super::{Entity, LatePolicyStatus, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rubric assessment keyed by criterion id.
pub type SubmissionRubric = HashMap<String, AssessmentRubric>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    #[serde(default)]
    pub attachments: Option<Vec<SubmissionFile>>,
    #[serde(default, rename = "submission_comments")]
    pub comments: Option<Vec<SubmissionComment>>,
    #[serde(default, rename = "seconds_late")]
    pub lateness_in_seconds: Option<i64>,
    #[serde(default)]
    pub late_policy_status: Option<LatePolicyStatus>,
    #[serde(default, rename = "rubric_assessment")]
    pub rubric: Option<SubmissionRubric>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, rename = "points_deducted")]
    pub score_penalty: Option<f64>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default, rename = "late")]
    pub was_submitted_late: bool,
    #[serde(default, rename = "submitted_at")]
    pub when_submitted: Option<DateTime<Utc>>,
    #[serde(default)]
    pub workflow_state: Option<String>,
    #[serde(skip)]
    pub course_id: u64,
    #[serde(skip)]
    pub assignment_id: u64,
}

impl Entity for Submission {
    fn id(&self) -> u64 {
        self.id
    }
}

/// One criterion score within a rubric assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRubric {
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default, rename = "rating_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub points: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionComment {
    pub id: u64,
    #[serde(default)]
    pub attachments: Option<Vec<SubmissionCommentAttachment>>,
    #[serde(default, rename = "author_name")]
    pub author: Option<String>,
    #[serde(default)]
    pub author_id: u64,
    #[serde(default, rename = "comment")]
    pub text: Option<String>,
    #[serde(default, rename = "created_at")]
    pub when_added: Option<DateTime<Utc>>,
}

impl Entity for SubmissionComment {
    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionCommentAttachment {
    pub id: u64,
    #[serde(default, rename = "content-type")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "created_at")]
    pub when_added: Option<DateTime<Utc>>,
}

impl Entity for SubmissionCommentAttachment {
    fn id(&self) -> u64 {
        self.id
    }
}

/// A file attached to a submission; `url` is the download location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionFile {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "updated_at")]
    pub when_uploaded: Option<DateTime<Utc>>,
}

/// Grading progress of an assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    #[serde(default)]
    pub graded: u32,
    #[serde(default)]
    pub ungraded: u32,
    #[serde(default)]
    pub not_submitted: u32,
    #[serde(skip)]
    pub course_id: u64,
    #[serde(skip)]
    pub assignment_id: u64,
}

impl SubmissionSummary {
    pub fn total(&self) -> u32 {
        self.graded + self.ungraded + self.not_submitted
    }
}
