use std::time::Duration;

use url::Url;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    /// Root of the scraping backend, e.g. `http://localhost:8000`.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request limit for the REST calls; never applied to the stream.
    pub request_timeout: Duration,
    /// Longest silence tolerated on an open stream. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            idle_timeout: None,
        }
    }
}

impl StreamSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Appends `segments` to the base url, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
