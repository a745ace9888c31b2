use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::http::{HttpResponse, Transport};
use crate::model::Leader;
use crate::session::Credential;

pub const COUNTRIES_PATH: &str = "/countries";
pub const LEADERS_PATH: &str = "/leaders";

/// Client for the countries/leaders endpoints.
pub struct LeadersApi<'a, T: Transport> {
    transport: &'a T,
    countries_url: String,
    leaders_url: String,
}

impl<'a, T: Transport> LeadersApi<'a, T> {
    pub fn new(transport: &'a T, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        LeadersApi {
            transport,
            countries_url: format!("{base}{COUNTRIES_PATH}"),
            leaders_url: format!("{base}{LEADERS_PATH}"),
        }
    }

    /// Country codes in API order, duplicates dropped. No retry.
    pub fn get_countries(&self, cred: &Credential) -> Result<Vec<String>> {
        let resp = self
            .transport
            .get(&self.countries_url, &[], Some(cred.cookie()))
            .map_err(Error::network)?;
        if !resp.is_success() {
            return Err(Error::Network(format!(
                "{} returned HTTP {}",
                self.countries_url, resp.status
            )));
        }

        let raw: Vec<String> = decode(&self.countries_url, &resp)?;
        let mut countries: Vec<String> = Vec::with_capacity(raw.len());
        for code in raw {
            if !countries.contains(&code) {
                countries.push(code);
            }
        }
        info!("API lists {} countries", countries.len());
        Ok(countries)
    }

    /// Leaders of one country, in API order.
    ///
    /// An expired credential is refreshed through `reauth` before the call. On a
    /// 401/403 the credential is refreshed once and the call retried once; a second
    /// authorization failure is returned as a `Network` error.
    pub fn get_leaders<F>(
        &self,
        country: &str,
        cred: &mut Credential,
        mut reauth: F,
    ) -> Result<Vec<Leader>>
    where
        F: FnMut() -> Result<Credential>,
    {
        if cred.is_expired() {
            debug!("Credential expired, refreshing before {country}");
            *cred = reauth()?;
        }

        let mut resp = self.request_leaders(country, cred)?;
        if resp.is_unauthorized() {
            warn!(
                "Leaders request for {} rejected (HTTP {}), re-authenticating",
                country, resp.status
            );
            *cred = reauth()?;
            resp = self.request_leaders(country, cred)?;
        }

        if !resp.is_success() {
            return Err(Error::Network(format!(
                "{}?country={} returned HTTP {}",
                self.leaders_url, country, resp.status
            )));
        }

        let leaders: Vec<Leader> = decode(&self.leaders_url, &resp)?;
        debug!("{}: {} leaders", country, leaders.len());
        Ok(leaders)
    }

    fn request_leaders(&self, country: &str, cred: &Credential) -> Result<HttpResponse> {
        self.transport
            .get(
                &self.leaders_url,
                &[("country", country)],
                Some(cred.cookie()),
            )
            .map_err(Error::network)
    }
}

fn decode<D: DeserializeOwned>(url: &str, resp: &HttpResponse) -> Result<D> {
    serde_json::from_str(&resp.body).map_err(|source| Error::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::http::fake::FakeTransport;

    const BASE: &str = "http://api.test";
    const COUNTRIES: &str = "http://api.test/countries";
    const LEADERS: &str = "http://api.test/leaders";
    const LEADERS_BE: &str = "http://api.test/leaders?country=be";

    fn cred(cookie: &str) -> Credential {
        Credential::new(cookie, Duration::from_secs(600))
    }

    #[test]
    fn countries_keep_order_and_drop_duplicates() {
        let t = FakeTransport::new();
        t.ok(COUNTRIES, r#"["us","be","ma","us","fr"]"#);
        let api = LeadersApi::new(&t, BASE);

        let got = api.get_countries(&cred("c=1")).unwrap();
        assert_eq!(got, vec!["us", "be", "ma", "fr"]);
        assert_eq!(t.calls()[0].cookie.as_deref(), Some("c=1"));
    }

    #[test]
    fn countries_non_2xx_is_network_error_without_retry() {
        let t = FakeTransport::new();
        t.status(COUNTRIES, 403);
        let api = LeadersApi::new(&t, BASE);

        assert!(matches!(api.get_countries(&cred("c=1")), Err(Error::Network(_))));
        assert_eq!(t.calls_to(COUNTRIES), 1);
    }

    #[test]
    fn countries_garbage_is_decode_error() {
        let t = FakeTransport::new();
        t.ok(COUNTRIES, "<html>");
        let api = LeadersApi::new(&t, BASE);

        assert!(matches!(api.get_countries(&cred("c=1")), Err(Error::Decode { .. })));
    }

    #[test]
    fn leaders_passes_country_and_cookie() {
        let t = FakeTransport::new();
        t.ok(
            LEADERS_BE,
            r#"[{"id":"Q1","first_name":"Guy","last_name":"Verhofstadt","wikipedia_url":"https://en.wikipedia.org/wiki/Guy_Verhofstadt","start_mandate":"1999-07-12","end_mandate":"2008-03-20"}]"#,
        );
        let api = LeadersApi::new(&t, BASE);
        let mut c = cred("c=1");

        let leaders = api
            .get_leaders("be", &mut c, || panic!("no re-auth expected"))
            .unwrap();
        assert_eq!(leaders.len(), 1);
        assert_eq!(leaders[0].name(), "Guy Verhofstadt");

        let call = &t.calls()[0];
        assert_eq!(call.url, LEADERS);
        assert_eq!(call.query, vec![("country".to_string(), "be".to_string())]);
        assert_eq!(call.cookie.as_deref(), Some("c=1"));
    }

    #[test]
    fn leaders_reauthenticates_once_on_403() {
        let t = FakeTransport::new();
        t.status(LEADERS_BE, 403).ok(LEADERS_BE, "[]");
        let api = LeadersApi::new(&t, BASE);
        let mut c = cred("old=1");
        let mut reauths = 0;

        let leaders = api
            .get_leaders("be", &mut c, || {
                reauths += 1;
                Ok(cred("new=2"))
            })
            .unwrap();

        assert!(leaders.is_empty());
        assert_eq!(reauths, 1);
        assert_eq!(c.cookie(), "new=2");
        let calls = t.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].cookie.as_deref(), Some("new=2"));
    }

    #[test]
    fn leaders_second_auth_failure_surfaces() {
        let t = FakeTransport::new();
        t.status(LEADERS_BE, 401);
        let api = LeadersApi::new(&t, BASE);
        let mut c = cred("old=1");
        let mut reauths = 0;

        let res = api.get_leaders("be", &mut c, || {
            reauths += 1;
            Ok(cred("new=2"))
        });

        assert!(matches!(res, Err(Error::Network(_))));
        assert_eq!(reauths, 1);
        assert_eq!(t.calls_to(LEADERS), 2);
    }

    #[test]
    fn leaders_reauth_error_propagates() {
        let t = FakeTransport::new();
        t.status(LEADERS_BE, 403);
        let api = LeadersApi::new(&t, BASE);
        let mut c = cred("old=1");

        let res = api.get_leaders("be", &mut c, || Err(Error::Auth("down".into())));
        assert!(matches!(res, Err(Error::Auth(_))));
        assert_eq!(t.calls_to(LEADERS), 1);
    }

    #[test]
    fn expired_credential_refreshed_before_call() {
        let t = FakeTransport::new();
        t.ok(LEADERS_BE, "[]");
        let api = LeadersApi::new(&t, BASE);
        let mut c = Credential::new("stale=1", Duration::ZERO);

        api.get_leaders("be", &mut c, || Ok(cred("fresh=2"))).unwrap();
        assert_eq!(t.calls()[0].cookie.as_deref(), Some("fresh=2"));
    }
}
