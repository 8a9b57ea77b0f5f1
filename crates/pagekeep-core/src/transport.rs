//! Blocking HTTP GET.
//!
//! `Transport` is the seam the fetcher and archiver talk to; `CurlTransport`
//! is the libcurl-backed implementation used by the CLI. Every request carries
//! a fixed desktop-browser `User-Agent` to get past naive bot filters.

use std::time::Duration;

use crate::config::PagekeepConfig;

/// Failure of a single GET.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Curl reported an error (DNS, connect, timeout, TLS, bad URL...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// The server answered with a non-2xx status.
    #[error("GET {url} returned HTTP {code}")]
    Http { url: String, code: u32 },
}

/// Anything that can fetch the body of a URL.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// libcurl easy-handle transport. One handle per request; runs in the current thread.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    user_agent: String,
    connect_timeout: Duration,
    timeout: Option<Duration>,
    max_redirections: u32,
}

impl CurlTransport {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            connect_timeout: Duration::from_secs(30),
            timeout: None,
            max_redirections: 10,
        }
    }

    pub fn from_config(cfg: &PagekeepConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: cfg.timeout_secs.map(Duration::from_secs),
            max_redirections: cfg.max_redirections,
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Transport for CurlTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.useragent(&self.user_agent)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirections)?;
        // Empty string = every encoding libcurl was built with.
        easy.accept_encoding("")?;
        easy.connect_timeout(self.connect_timeout)?;
        if let Some(t) = self.timeout {
            easy.timeout(t)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransportError::Http {
                url: url.to_string(),
                code,
            });
        }

        tracing::debug!(url, bytes = body.len(), "GET ok");
        Ok(body)
    }
}
