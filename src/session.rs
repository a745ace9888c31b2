use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::http::Transport;

pub const COOKIE_PATH: &str = "/cookie";

/// Short-lived API credential: the cookie header issued by the auth endpoint.
#[derive(Debug, Clone)]
pub struct Credential {
    cookie: String,
    issued_at: Instant,
    ttl: Duration,
}

impl Credential {
    pub fn new(cookie: impl Into<String>, ttl: Duration) -> Self {
        Credential {
            cookie: cookie.into(),
            issued_at: Instant::now(),
            ttl,
        }
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn is_expired(&self) -> bool {
        self.issued_at.elapsed() >= self.ttl
    }
}

/// Fetches fresh credentials. Holds no token itself; callers own the `Credential`.
pub struct Authenticator<'a, T: Transport> {
    transport: &'a T,
    url: String,
    ttl: Duration,
}

impl<'a, T: Transport> Authenticator<'a, T> {
    pub fn new(transport: &'a T, url: String, ttl: Duration) -> Self {
        Authenticator { transport, url, ttl }
    }

    pub fn get_token(&self) -> Result<Credential> {
        debug!("Requesting API cookie from {}", self.url);
        let resp = self
            .transport
            .get(&self.url, &[], None)
            .map_err(|e| Error::Auth(e.to_string()))?;

        if !resp.is_success() {
            return Err(Error::Auth(format!(
                "{} returned HTTP {}",
                self.url, resp.status
            )));
        }
        if resp.cookies.is_empty() {
            return Err(Error::Auth(format!("{} issued no cookie", self.url)));
        }

        info!("Obtained API session cookie");
        Ok(Credential::new(resp.cookies.join("; "), self.ttl))
    }
}
