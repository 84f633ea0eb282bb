use super::{Paged, ToParameters};
use crate::params::Parameters;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Paging settings shared by every list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSettings {
    /// Items per page; `None` means the default of 50. Values above 100 are clamped.
    pub page_size: Option<u32>,
    /// First page to request.
    pub page_start: Option<u32>,
    /// Maximum number of pages to fetch. Never sent to the server.
    pub max_pages: usize,
}

impl ListSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_page_start(mut self, page: u32) -> Self {
        self.page_start = Some(page);
        self
    }

    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    /// The page size actually sent, after applying the default and the cap.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }

    pub(crate) fn append_to(&self, parameters: &mut Parameters) {
        parameters.push("per_page", self.effective_page_size());
        if let Some(page) = self.page_start {
            parameters.push("page", page);
        }
    }
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE),
            page_start: None,
            max_pages: usize::MAX,
        }
    }
}

impl ToParameters for ListSettings {
    fn to_parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        self.append_to(&mut parameters);
        parameters
    }
}

impl Paged for ListSettings {
    fn list_settings(&self) -> &ListSettings {
        self
    }
}
