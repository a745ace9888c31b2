use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{COOKIE, SET_COOKIE};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {reason}")]
    Failed { url: String, reason: String },
}

/// A completed GET: status, body and any `name=value` pairs from `Set-Cookie`.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    pub cookies: Vec<String>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Blocking GET, the only verb this tool needs.
pub trait Transport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Result<HttpResponse, TransportError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Failed {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        let mut req = self.client.get(url).query(query);
        if let Some(c) = cookie {
            req = req.header(COOKIE, c);
        }
        let to_err = |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::Timeout { url: url.to_string() }
            } else {
                TransportError::Failed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        let resp = req.send().map_err(to_err)?;
        let status = resp.status().as_u16();
        let cookies = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(cookie_pair)
            .collect();
        let body = resp.text().map_err(to_err)?;

        Ok(HttpResponse {
            status,
            body,
            cookies,
        })
    }
}

/// `user_cookie=abc; Path=/; HttpOnly` -> `user_cookie=abc`
fn cookie_pair(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    if pair.contains('=') && !pair.starts_with('=') {
        Some(pair.to_string())
    } else {
        None
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_pair_strips_attributes() {
        assert_eq!(
            cookie_pair("user_cookie=abc123; Path=/; HttpOnly").as_deref(),
            Some("user_cookie=abc123")
        );
        assert_eq!(cookie_pair("=oops; Path=/"), None);
        assert_eq!(cookie_pair("garbage"), None);
    }

    #[test]
    fn unauthorized_covers_401_and_403() {
        let r = |status| HttpResponse {
            status,
            ..Default::default()
        };
        assert!(r(401).is_unauthorized());
        assert!(r(403).is_unauthorized());
        assert!(!r(404).is_unauthorized());
        assert!(r(204).is_success());
        assert!(!r(301).is_success());
    }
}
