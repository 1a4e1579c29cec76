//! Plain GET links equivalent to a list's live query, for exporting its contents.

use url::Url;

use crate::{error::ClientError, list::ListQuery, paths};

/// A REST route plus the relation parameters that scope it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub params: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<(&'static str, String)>) -> Self {
        self.params.extend(params);
        self
    }
}

/// `<service><path>?<relation params>&filter=..&sort=..&contentType=..`, encoded the
/// same way as the live request so both hit the server with identical values.
pub fn download_url(
    service_url: &str,
    endpoint: &Endpoint,
    query: &ListQuery,
    content_type: &str,
) -> Result<String, ClientError> {
    let mut url = Url::parse(&format!(
        "{}{}",
        service_url.trim().trim_end_matches('/'),
        endpoint.path
    ))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &endpoint.params {
            pairs.append_pair(name, value);
        }
        for (name, value) in query.page_request().filter_pairs() {
            pairs.append_pair(name, &value);
        }
        pairs.append_pair(paths::CONTENT_TYPE, content_type);
    }
    Ok(url.into())
}

#[cfg(test)]
#[path = "tests/download_tests.rs"]
mod tests;
