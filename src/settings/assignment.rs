use super::{ListSettings, Paged, ToParameters};
use crate::params::Parameters;

crate::flag_set! {
    /// Extra data to embed in assignment responses.
    pub struct AssignmentInclude {
        const None = 0;
        const AllDates = 1;
    }
}

/// Settings for listing the assignments of a course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentList {
    pub list: ListSettings,
    pub options: AssignmentInclude,
}

impl AssignmentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, list: ListSettings) -> Self {
        self.list = list;
        self
    }

    pub fn with_options(mut self, options: AssignmentInclude) -> Self {
        self.options = options;
        self
    }
}

impl From<AssignmentInclude> for AssignmentList {
    fn from(options: AssignmentInclude) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}

impl ToParameters for AssignmentList {
    fn to_parameters(&self) -> Parameters {
        let mut parameters = self.list.to_parameters();
        if !self.options.is_empty() {
            parameters.push_flags("include[]", self.options);
        }
        parameters
    }
}

impl Paged for AssignmentList {
    fn list_settings(&self) -> &ListSettings {
        &self.list
    }
}

/// Settings for retrieving a single assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentItem {
    pub options: AssignmentInclude,
}

impl From<AssignmentInclude> for AssignmentItem {
    fn from(options: AssignmentInclude) -> Self {
        Self { options }
    }
}

impl ToParameters for AssignmentItem {
    fn to_parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        if !self.options.is_empty() {
            parameters.push_flags("include[]", self.options);
        }
        parameters
    }
}
