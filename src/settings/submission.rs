use super::{ListSettings, Paged, ToParameters};
use crate::params::Parameters;

crate::flag_set! {
    /// Extra data to embed in submission responses.
    pub struct SubmissionInclude {
        const None = 0;
        const User = 1;
        const SubmissionComments = 2;
        const RubricAssessment = 4;
        const All = 255;
    }
}

/// Settings for listing or retrieving submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionList {
    pub list: ListSettings,
    pub options: SubmissionInclude,
}

impl SubmissionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, list: ListSettings) -> Self {
        self.list = list;
        self
    }

    pub fn with_options(mut self, options: SubmissionInclude) -> Self {
        self.options = options;
        self
    }
}

impl From<SubmissionInclude> for SubmissionList {
    fn from(options: SubmissionInclude) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}

impl ToParameters for SubmissionList {
    fn to_parameters(&self) -> Parameters {
        let mut parameters = self.list.to_parameters();
        if !self.options.is_empty() {
            parameters.push_flags("include[]", self.options);
        }
        parameters
    }
}

impl Paged for SubmissionList {
    fn list_settings(&self) -> &ListSettings {
        &self.list
    }
}
