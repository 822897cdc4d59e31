//! Ordered query-string parameters
//!
//! Keeps every parameter of a request URL in its original order (duplicates
//! included) so a page URL can be rebuilt with only `fetchXml` replaced.

use crate::error::{Error, Result};
use url::Url;

/// Query parameter carrying the FetchXML document
pub const FETCH_XML_PARAM: &str = "fetchXml";

/// Decoded query parameters in original order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Decode the query string of a URL
    pub fn from_url(url: &Url) -> Self {
        Self {
            pairs: url.query_pairs().into_owned().collect(),
        }
    }

    /// First value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace the first value for `name`, or append it
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((name.to_string(), value)),
        }
    }

    /// The `fetchXml` document, which must already be present
    pub fn fetch_xml(&self) -> Result<&str> {
        self.get(FETCH_XML_PARAM).ok_or_else(|| {
            Error::protocol(format!(
                "request URL has no '{FETCH_XML_PARAM}' parameter to paginate"
            ))
        })
    }

    /// Iterate over parameters in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no parameters
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode every name and value exactly once, joined with `&`
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Copy of `base` with its query replaced by these parameters
    pub fn apply_to(&self, base: &Url) -> Url {
        let mut url = base.clone();
        if self.pairs.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.to_query_string()));
        }
        url
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
