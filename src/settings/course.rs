use super::{ListSettings, Paged, ToParameters};
use crate::params::Parameters;
use crate::types::EnrolmentType;

crate::flag_set! {
    /// Extra data to embed in course responses.
    pub struct CourseInclude {
        const None = 0;
        const Term = 1;
        const Teachers = 2;
        const TotalStudents = 4;
    }
}

/// Settings for listing courses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseList {
    pub list: ListSettings,
    /// Only return courses where the user has this enrolment.
    pub enrolment_type: Option<EnrolmentType>,
    pub options: CourseInclude,
    /// Only return courses in this enrolment term.
    pub term_id: Option<u64>,
}

impl CourseList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, list: ListSettings) -> Self {
        self.list = list;
        self
    }

    pub fn with_enrolment_type(mut self, enrolment_type: EnrolmentType) -> Self {
        self.enrolment_type = Some(enrolment_type);
        self
    }

    pub fn with_options(mut self, options: CourseInclude) -> Self {
        self.options = options;
        self
    }

    pub fn with_term_id(mut self, term_id: u64) -> Self {
        self.term_id = Some(term_id);
        self
    }
}

impl From<CourseInclude> for CourseList {
    fn from(options: CourseInclude) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}

impl ToParameters for CourseList {
    fn to_parameters(&self) -> Parameters {
        let mut parameters = self.list.to_parameters();
        if let Some(enrolment_type) = self.enrolment_type {
            parameters.push_enum("enrollment_type", enrolment_type);
        }
        if !self.options.is_empty() {
            parameters.push_flags("include[]", self.options);
        }
        if let Some(term_id) = self.term_id {
            parameters.push("enrollment_term_id", term_id);
        }
        parameters
    }
}

impl Paged for CourseList {
    fn list_settings(&self) -> &ListSettings {
        &self.list
    }
}

/// Settings for retrieving a single course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseItem {
    pub enrolment_types: Vec<EnrolmentType>,
    pub options: CourseInclude,
}

impl CourseItem {
    pub fn new(enrolment_types: impl IntoIterator<Item = EnrolmentType>) -> Self {
        Self {
            enrolment_types: enrolment_types.into_iter().collect(),
            options: CourseInclude::None,
        }
    }

    pub fn with_options(mut self, options: CourseInclude) -> Self {
        self.options = options;
        self
    }
}

impl From<CourseInclude> for CourseItem {
    fn from(options: CourseInclude) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}

impl ToParameters for CourseItem {
    fn to_parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        if !self.options.is_empty() {
            parameters.push_flags("include[]", self.options);
        }
        for enrolment_type in &self.enrolment_types {
            parameters.push_enum("enrollment_type", *enrolment_type);
        }
        parameters
    }
}
