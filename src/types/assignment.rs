use super::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An assignment within a course.
///
/// `course_id` is not part of the wire format; the assignments client fills it
/// in from the URL it called.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default, skip_serializing)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_extensions: Option<Vec<String>>,
    #[serde(default, rename = "all_dates", skip_serializing_if = "Option::is_none")]
    pub dates: Option<Vec<AssignmentDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_category_id: Option<u64>,
    #[serde(default, rename = "assignment_group_id", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
    #[serde(default, rename = "published")]
    pub is_published: bool,
    #[serde(default, rename = "all_dates_count", skip_serializing)]
    pub number_of_dates: u32,
    #[serde(default)]
    pub omit_from_final_grade: bool,
    #[serde(default, rename = "points_possible", skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<Vec<RubricItem>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submission_types: Vec<String>,
    #[serde(default, rename = "html_url", skip_serializing)]
    pub url: Option<String>,
    #[serde(default, rename = "unlock_at", skip_serializing_if = "Option::is_none")]
    pub when_available_from: Option<DateTime<Utc>>,
    #[serde(default, rename = "lock_at", skip_serializing_if = "Option::is_none")]
    pub when_available_to: Option<DateTime<Utc>>,
    #[serde(default, rename = "due_at", skip_serializing_if = "Option::is_none")]
    pub when_due: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub course_id: u64,
}

impl Assignment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Entity for Assignment {
    fn id(&self) -> u64 {
        self.id
    }
}

/// A due-date override (or the base dates) of an assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDate {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub group_id: Option<u64>,
    #[serde(default, rename = "base")]
    pub is_base: bool,
    #[serde(default, rename = "title")]
    pub name: Option<String>,
    #[serde(default, rename = "course_section_id")]
    pub section_id: Option<u64>,
    #[serde(default)]
    pub set_id: Option<u64>,
    #[serde(default)]
    pub set_type: Option<String>,
    #[serde(default)]
    pub student_ids: Option<Vec<u64>>,
    #[serde(default, rename = "due_at")]
    pub when_due: Option<DateTime<Utc>>,
    #[serde(default, rename = "lock_at")]
    pub when_locked: Option<DateTime<Utc>>,
    #[serde(default, rename = "unlock_at")]
    pub when_unlocked: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub assignment_id: u64,
    #[serde(skip)]
    pub course_id: u64,
}

impl Entity for AssignmentDate {
    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerReview {
    pub id: u64,
    #[serde(default)]
    pub assessor_id: u64,
    #[serde(default)]
    pub user_id: u64,
    #[serde(skip)]
    pub assignment_id: u64,
    #[serde(skip)]
    pub course_id: u64,
}

impl Entity for PeerReview {
    fn id(&self) -> u64 {
        self.id
    }
}

/// One criterion of an assignment rubric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RubricItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "criterion_use_range")]
    pub is_range: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Vec<RubricRating>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RubricRating {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "description")]
    pub name: String,
    #[serde(default, rename = "long_description")]
    pub description: String,
    #[serde(default, rename = "points")]
    pub max_points: f64,
    #[serde(skip)]
    pub min_points: f64,
}
