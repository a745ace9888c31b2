use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::bio::{self, BioScraper};
use crate::error::Result;
use crate::http::Transport;
use crate::leaders::LeadersApi;
use crate::model::{Country, Dataset, Leader};
use crate::sanitize::sanitize;
use crate::session::{Authenticator, Credential};

/// Which countries and how many leaders per country to collect.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    /// Country codes to keep; empty keeps all.
    pub countries: Vec<String>,
    pub limit: Option<usize>,
}

impl Selector {
    fn filter(&self, available: Vec<String>) -> Vec<String> {
        if self.countries.is_empty() {
            return available;
        }
        for wanted in &self.countries {
            if !available.iter().any(|c| c.eq_ignore_ascii_case(wanted)) {
                warn!("Country {} not offered by the API, skipping", wanted);
            }
        }
        available
            .into_iter()
            .filter(|c| self.countries.iter().any(|w| w.eq_ignore_ascii_case(c)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub countries: usize,
    pub leaders: usize,
    pub bios: usize,
    pub failures: usize,
    pub missing_url: usize,
}

pub struct Pipeline<'a, T: Transport> {
    auth: Authenticator<'a, T>,
    api: LeadersApi<'a, T>,
    scraper: BioScraper<'a, T>,
    show_progress: bool,
}

impl<'a, T: Transport> Pipeline<'a, T> {
    pub fn new(
        auth: Authenticator<'a, T>,
        api: LeadersApi<'a, T>,
        scraper: BioScraper<'a, T>,
    ) -> Self {
        Pipeline {
            auth,
            api,
            scraper,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Authenticate and list the available country codes.
    pub fn countries(&self) -> Result<Vec<String>> {
        let cred = self.auth.get_token()?;
        self.api.get_countries(&cred)
    }

    /// Countries -> leaders -> bios. Only auth, country-list and leader-list failures
    /// abort; a failed page leaves that leader's bio empty.
    pub fn run(&self, selector: &Selector) -> Result<(Dataset, RunStats)> {
        let mut cred = self.auth.get_token()?;
        let codes = selector.filter(self.api.get_countries(&cred)?);

        let mut dataset = Dataset::default();
        for code in codes {
            let mut leaders = self
                .api
                .get_leaders(&code, &mut cred, || self.auth.get_token())?;
            if let Some(n) = selector.limit {
                leaders.truncate(n);
            }
            info!("{}: {} leaders", code, leaders.len());
            dataset.countries.push(Country { code, leaders });
        }

        let mut stats = RunStats {
            countries: dataset.countries.len(),
            leaders: dataset.leader_count(),
            ..Default::default()
        };

        let pb = self.progress_bar(stats.leaders as u64);
        for country in &mut dataset.countries {
            for leader in &mut country.leaders {
                self.attach_bio(leader, &mut stats);
                pb.inc(1);
            }
        }
        pb.finish_and_clear();

        info!(
            "Collected {} bios for {} leaders ({} failed, {} without URL)",
            stats.bios, stats.leaders, stats.failures, stats.missing_url
        );
        Ok((dataset, stats))
    }

    fn attach_bio(&self, leader: &mut Leader, stats: &mut RunStats) {
        let name = leader.name();
        let Some(url) = leader.wikipedia_url.clone().filter(|u| !u.trim().is_empty()) else {
            debug!("{} ({}) has no Wikipedia URL", name, leader.id);
            stats.missing_url += 1;
            leader.bio = Some(String::new());
            return;
        };

        match self.scraper.scrape(&url) {
            Ok(html) => {
                let bio = sanitize(&bio::extract_first_paragraph(&html));
                if bio.is_empty() {
                    debug!("No lead paragraph for {} at {}", name, url);
                } else {
                    stats.bios += 1;
                }
                leader.bio = Some(bio);
            }
            Err(e) => {
                warn!("Bio for {} unavailable: {}", name, e);
                stats.failures += 1;
                leader.bio = Some(String::new());
            }
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb
    }
}
