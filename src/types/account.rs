use super::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_account_id: Option<u64>,
    #[serde(default)]
    pub root_account_id: Option<u64>,
}

impl Entity for Account {
    fn id(&self) -> u64 {
        self.id
    }
}

/// An enrolment term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "created_at")]
    pub when_created: Option<DateTime<Utc>>,
    #[serde(default, rename = "start_at")]
    pub when_starts: Option<DateTime<Utc>>,
    #[serde(default, rename = "end_at")]
    pub when_ends: Option<DateTime<Utc>>,
}

impl Entity for Term {
    fn id(&self) -> u64 {
        self.id
    }
}
