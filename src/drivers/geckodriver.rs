//! Geckodriver resolution.
//!
//! Geckodriver is versioned independently of Firefox and publishes no
//! compatibility table, so "matching" collapses to "latest". The latest
//! version is read from wherever the `releases/latest` URL redirects to.

use std::sync::{Arc, LazyLock, OnceLock};

use async_trait::async_trait;
use regex::Regex;

use crate::Browser;
use crate::command::CommandRunner;
use crate::detect;
use crate::drivers::DriverResolver;
use crate::error::Error;
use crate::http::Http;

const LATEST_RELEASE_URL: &str = "https://github.com/mozilla/geckodriver/releases/latest";
const DOWNLOAD_BASE_URL: &str = "https://github.com/mozilla/geckodriver/releases/download/";

const VERSION_TOKEN_PATTERN: &str = r"\d{1,2}[\d.]+";

static VERSION_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VERSION_TOKEN_PATTERN).expect("version token pattern compiles"));

/// Pulls the version token out of a resolved release URL, e.g. `0.30.0`
/// from `https://github.com/mozilla/geckodriver/releases/tag/v0.30.0`.
pub fn version_from_release_url(url: &str) -> Result<String, Error> {
    let segment = url.rsplit('/').next().unwrap_or_default();
    VERSION_TOKEN_RE
        .find(segment)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::VersionParse {
            pattern: VERSION_TOKEN_PATTERN,
            output: url.to_string(),
        })
}

/// Geckodriver resolution strategy.
pub struct GeckoDriver {
    http: Http,
    runner: Arc<dyn CommandRunner>,
    installed: OnceLock<u32>,
}

impl GeckoDriver {
    pub fn new(http: Http, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            http,
            runner,
            installed: OnceLock::new(),
        }
    }
}

#[async_trait]
impl DriverResolver for GeckoDriver {
    fn browser(&self) -> Browser {
        Browser::Firefox
    }

    fn driver_name(&self) -> &'static str {
        "geckodriver"
    }

    async fn installed_browser_version(&self) -> Result<u32, Error> {
        if let Some(version) = self.installed.get() {
            return Ok(*version);
        }
        let version = detect::firefox_version(self.runner.as_ref())?;
        Ok(*self.installed.get_or_init(|| version))
    }

    async fn latest_driver_version(&self) -> Result<String, Error> {
        let resolved = self.http.get_final_url(LATEST_RELEASE_URL).await?;
        version_from_release_url(&resolved)
    }

    async fn matching_driver_version(&self) -> Result<String, Error> {
        // No Firefox-version-to-geckodriver table exists upstream; the
        // latest release is the best available answer.
        self.latest_driver_version().await
    }

    fn archive_name(&self, driver_version: &str) -> String {
        if cfg!(windows) {
            format!("geckodriver-v{driver_version}-win64.zip")
        } else {
            format!("geckodriver-v{driver_version}-linux64.tar.gz")
        }
    }

    fn download_url(&self, driver_version: &str) -> String {
        format!(
            "{DOWNLOAD_BASE_URL}v{driver_version}/{}",
            self.archive_name(driver_version)
        )
    }

    fn binary_name(&self) -> &'static str {
        if cfg!(windows) {
            "geckodriver.exe"
        } else {
            "geckodriver"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ProxyConfig;

    #[test]
    fn version_extracted_from_resolved_release_url() {
        let url = "https://github.com/mozilla/geckodriver/releases/tag/v0.30.0";
        assert_eq!(version_from_release_url(url).unwrap(), "0.30.0");
    }

    #[test]
    fn unresolved_url_is_a_parse_error() {
        let err = version_from_release_url("https://github.com/mozilla/geckodriver/releases")
            .unwrap_err();
        assert!(matches!(err, Error::VersionParse { .. }));
    }

    #[test]
    fn download_url_pins_the_release_tag() {
        struct NoRunner;
        impl CommandRunner for NoRunner {
            fn run(&self, program: &str, _args: &[&str]) -> Result<String, Error> {
                Err(Error::CommandNotFound {
                    command: program.to_string(),
                })
            }
        }

        let http = Http::new(&ProxyConfig::default()).unwrap();
        let resolver = GeckoDriver::new(http, Arc::new(NoRunner));
        let url = resolver.download_url("0.30.0");
        assert!(url.starts_with(
            "https://github.com/mozilla/geckodriver/releases/download/v0.30.0/geckodriver-v0.30.0-"
        ));
    }
}
