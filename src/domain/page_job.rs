use std::fmt;

/// A single listing page to visit. Consumed once by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageJob {
    /// 0-based position in the enumeration
    pub page_index: u32,
    pub url: String,
}

impl PageJob {
    pub fn new(page_index: u32, url: String) -> Self {
        Self { page_index, url }
    }

    /// Builds the jobs `0..page_count` from a base URL and a path template
    /// containing `{page}`.
    pub fn enumerate(base_url: &str, path_template: &str, page_count: u32) -> Vec<Self> {
        (0..page_count)
            .map(|page| Self::new(page, listing_url(base_url, path_template, page)))
            .collect()
    }
}

/// Joins the base URL with the templated listing path.
pub fn listing_url(base_url: &str, path_template: &str, page: u32) -> String {
    let path = path_template.replace("{page}", &page.to_string());
    if path.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), path)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), path)
    }
}

impl fmt::Display for PageJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {} ({})", self.page_index, self.url)
    }
}
