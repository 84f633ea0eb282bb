use super::{Entity, Term, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "course_code")]
    pub code: String,
    #[serde(default)]
    pub default_view: Option<String>,
    #[serde(default, rename = "total_students")]
    pub number_of_students: u32,
    #[serde(default = "unknown_state", rename = "workflow_state")]
    pub state: String,
    #[serde(default)]
    pub teachers: Option<Vec<User>>,
    #[serde(default)]
    pub term: Option<Term>,
}

fn unknown_state() -> String {
    "Unknown".to_string()
}

impl Course {
    pub fn is_available(&self) -> bool {
        self.state.eq_ignore_ascii_case("available")
    }
}

impl Entity for Course {
    fn id(&self) -> u64 {
        self.id
    }
}
