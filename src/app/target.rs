//! URL handling for fetch targets
//!
//! Pure functions over an owned, parsed URL: host, request path, destination
//! file name and folder detection.

use url::Url;

use crate::constants::{http, INDEX_FILE_NAME};
use crate::errors::{FetchError, FetchResult};

/// A validated `http://` URL to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
    host: String,
}

impl Target {
    /// Parse and validate a URL given on the command line.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the input is not an absolute URL with
    /// a host, and `FetchError::UnsupportedScheme` for anything but `http`.
    pub fn parse(input: &str) -> FetchResult<Self> {
        let url = Url::parse(input.trim()).map_err(|e| FetchError::InvalidUrl {
            url: input.to_string(),
            error: e.to_string(),
        })?;
        Self::from_url(url, input)
    }

    fn from_url(url: Url, input: &str) -> FetchResult<Self> {
        if url.scheme() != http::SCHEME {
            return Err(FetchError::UnsupportedScheme {
                url: input.to_string(),
                scheme: url.scheme().to_string(),
            });
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| FetchError::InvalidUrl {
                url: input.to_string(),
                error: "URL has no host".to_string(),
            })?
            .to_string();

        Ok(Self { url, host })
    }

    /// Host name as written in the URL; also sent in the `Host` header
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path plus query, as sent in the request line
    pub fn request_path(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }

    /// A folder URL ends with `/` and points at a directory listing.
    pub fn is_folder(&self) -> bool {
        let path = self.url.path();
        path.ends_with('/') && !path.ends_with(INDEX_FILE_NAME)
    }

    /// Name of the local directory for a folder URL: the last path segment,
    /// or the host for the root path.
    pub fn folder_name(&self) -> String {
        self.segments()
            .last()
            .map(str::to_string)
            .unwrap_or_else(|| self.host.clone())
    }

    /// Destination file name: the last path segment, `index.html` if none.
    pub fn file_name(&self) -> String {
        match self.url.path_segments().and_then(|mut s| s.next_back()) {
            Some(last) if !last.is_empty() => last.to_string(),
            _ => INDEX_FILE_NAME.to_string(),
        }
    }

    /// Resolve a link found on this page. Links to other hosts or schemes
    /// yield `None`.
    pub fn join(&self, link: &str) -> Option<Target> {
        let url = self.url.join(link).ok()?;
        if url.host_str() != Some(self.host.as_str()) {
            return None;
        }
        Self::from_url(url, link).ok()
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.url
            .path_segments()
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str())
    }
}
