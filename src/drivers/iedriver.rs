//! IEDriverServer resolution.
//!
//! Releases live in an S3-style bucket listing; the right artifact depends
//! on the host CPU architecture. Like geckodriver there is no published
//! compatibility table, so "matching" returns the latest release.

use std::sync::{Arc, LazyLock, OnceLock};

use async_trait::async_trait;
use regex::Regex;

use crate::Browser;
use crate::command::CommandRunner;
use crate::detect;
use crate::drivers::DriverResolver;
use crate::error::Error;
use crate::http::Http;
use crate::version;

const RELEASE_BUCKET_URL: &str = "https://selenium-release.storage.googleapis.com/";

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Key>([^<]+)</Key>").expect("key pattern compiles"));

static WIN32_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"IEDriverServer_Win32_(\d+(?:\.\d+)+)").expect("win32 version pattern compiles")
});

static X64_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"IEDriverServer_x64_(\d+(?:\.\d+)+)").expect("x64 version pattern compiles")
});

/// Host CPU architecture, as encoded in the bucket's artifact names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Win32,
    X64,
}

impl Arch {
    pub fn host() -> Arch {
        if cfg!(target_pointer_width = "64") {
            Arch::X64
        } else {
            Arch::Win32
        }
    }

    /// Marker embedded in artifact keys, e.g. `IEDriverServer_x64_3.14.0.zip`.
    pub fn marker(self) -> &'static str {
        match self {
            Arch::Win32 => "Win32",
            Arch::X64 => "x64",
        }
    }
}

/// Newest driver version in a bucket listing for the given architecture.
///
/// Versions are ordered by their full numeric components, so `3.10.0`
/// ranks above `3.9.0`.
pub fn latest_from_listing(listing: &str, arch: Arch) -> Option<String> {
    let version_re: &Regex = match arch {
        Arch::Win32 => &WIN32_VERSION_RE,
        Arch::X64 => &X64_VERSION_RE,
    };

    KEY_RE
        .captures_iter(listing)
        .filter_map(|captures| {
            let key = captures.get(1)?.as_str();
            version_re
                .captures(key)
                .and_then(|v| v.get(1))
                .map(|m| m.as_str().to_string())
        })
        .max_by(|a, b| version::compare(a, b))
}

/// IEDriverServer resolution strategy.
pub struct IeDriver {
    http: Http,
    runner: Arc<dyn CommandRunner>,
    arch: Arch,
    installed: OnceLock<u32>,
}

impl IeDriver {
    pub fn new(http: Http, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            http,
            runner,
            arch: Arch::host(),
            installed: OnceLock::new(),
        }
    }
}

#[async_trait]
impl DriverResolver for IeDriver {
    fn browser(&self) -> Browser {
        Browser::InternetExplorer
    }

    fn driver_name(&self) -> &'static str {
        "IEDriverServer"
    }

    async fn installed_browser_version(&self) -> Result<u32, Error> {
        if let Some(version) = self.installed.get() {
            return Ok(*version);
        }
        let version = detect::ie_version(self.runner.as_ref())?;
        Ok(*self.installed.get_or_init(|| version))
    }

    async fn latest_driver_version(&self) -> Result<String, Error> {
        let listing = self.http.get_text(RELEASE_BUCKET_URL).await?;
        latest_from_listing(&listing, self.arch).ok_or_else(|| Error::DriverVersionNotFound {
            browser: Browser::InternetExplorer,
            detail: format!(
                "no IEDriverServer_{}_ entries in the release bucket",
                self.arch.marker()
            ),
        })
    }

    async fn matching_driver_version(&self) -> Result<String, Error> {
        // No IE-version-to-driver table exists upstream either.
        self.latest_driver_version().await
    }

    fn archive_name(&self, driver_version: &str) -> String {
        format!(
            "IEDriverServer_{}_{driver_version}.zip",
            self.arch.marker()
        )
    }

    fn download_url(&self, driver_version: &str) -> String {
        // The bucket prefixes keys with the release's major.minor pair,
        // e.g. `3.14/IEDriverServer_Win32_3.14.0.zip`.
        let prefix: Vec<&str> = driver_version.split('.').take(2).collect();
        format!(
            "{RELEASE_BUCKET_URL}{}/{}",
            prefix.join("."),
            self.archive_name(driver_version)
        )
    }

    fn binary_name(&self) -> &'static str {
        "IEDriverServer.exe"
    }
}
