//! Chromedriver resolution.
//!
//! Chrome is the only browser with a real compatibility problem: driver
//! releases support a bounded range of browser majors. The range table is
//! scraped from the vendor's release-notes text and cached as JSON; newer
//! browsers (no longer covered by the notes) fall back to scanning the
//! driver storage index for a same-major release.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, LazyLock, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Browser;
use crate::command::CommandRunner;
use crate::detect;
use crate::drivers::DriverResolver;
use crate::error::Error;
use crate::http::Http;
use crate::paths;
use crate::version;

const STORAGE_URL: &str = "https://chromedriver.storage.googleapis.com/";
const LATEST_RELEASE_URL: &str = "https://chromedriver.storage.googleapis.com/LATEST_RELEASE";

/// Oldest Chrome major the release notes cover.
const MIN_SUPPORTED_MAJOR: u32 = 29;
/// First Chrome major absent from the parseable release notes; resolution
/// goes straight to the storage index from here on.
const NOTES_CUTOFF_MAJOR: u32 = 70;
/// Notes anchors: the newest notes file still listing a given era of
/// supported ranges.
const NOTES_ANCHOR_RECENT: &str = "2.46";
const NOTES_ANCHOR_LEGACY: &str = "2.9";

static NOTES_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"----------ChromeDriver v((?:\d+\.?)+) \((?:\d+-?)+\)----------\nSupports Chrome v(\d+)-(\d+)",
    )
    .expect("release-notes pattern compiles")
});

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Key>([^<]+)</Key>").expect("key pattern compiles"));

/// Inclusive range of browser majors supported by one driver release.
///
/// Serialized with int-as-string bounds to keep the on-disk cache format
/// `{"from": "71", "to": "73"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    #[serde(with = "int_string")]
    pub from: u32,
    #[serde(with = "int_string")]
    pub to: u32,
}

impl VersionRange {
    pub fn contains(&self, installed: u32) -> bool {
        self.from <= installed && installed <= self.to
    }
}

/// Mapping from driver version to the browser range it supports, keyed the
/// way the cache file is keyed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatTable {
    #[serde(rename = "CHROME")]
    pub chrome: BTreeMap<String, VersionRange>,
}

mod int_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Scrapes the release-notes text into a compatibility table.
///
/// Blocks that do not match the vendor's formatting are skipped; the
/// endpoint guarantees neither complete nor non-overlapping ranges.
pub fn parse_compat_table(notes: &str) -> CompatTable {
    let mut table = CompatTable::default();
    for captures in NOTES_BLOCK_RE.captures_iter(notes) {
        let (Ok(from), Ok(to)) = (captures[2].parse(), captures[3].parse()) else {
            continue;
        };
        table
            .chrome
            .insert(captures[1].to_string(), VersionRange { from, to });
    }
    table
}

/// Picks the driver version for `installed` from the table.
///
/// When several ranges contain the installed version (the source data does
/// not rule out overlaps), the highest driver version wins so the choice
/// does not depend on table iteration order.
pub fn match_driver(table: &CompatTable, installed: u32) -> Option<String> {
    table
        .chrome
        .iter()
        .filter(|(_, range)| range.contains(installed))
        .map(|(driver, _)| driver.as_str())
        .max_by(|a, b| version::compare(a, b))
        .map(str::to_string)
}

/// Newest driver version in a storage-index listing whose major matches
/// `major`, or `None` when the listing has no such release.
pub fn newest_for_major(listing: &str, major: u32) -> Option<String> {
    let prefix = format!("{major}.");
    KEY_RE
        .captures_iter(listing)
        .filter_map(|captures| {
            let key = captures.get(1)?.as_str();
            let dir = key.split('/').next()?;
            (dir.starts_with(&prefix) && dir.split('.').all(|part| part.parse::<u64>().is_ok()))
                .then(|| dir.to_string())
        })
        .max_by(|a, b| version::compare(a, b))
}

/// Overwrites the cache file with `table`, deleting any previous cache.
pub fn write_cache(path: &Path, table: &CompatTable) -> Result<(), Error> {
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let file = std::fs::File::create(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::to_writer(file, table).map_err(|e| Error::Cache {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads a previously written cache file.
pub fn read_cache(path: &Path) -> Result<CompatTable, Error> {
    let file = std::fs::File::open(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_reader(file).map_err(|e| Error::Cache {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Chromedriver resolution strategy.
pub struct ChromeDriver {
    http: Http,
    runner: Arc<dyn CommandRunner>,
    installed: OnceLock<u32>,
}

impl ChromeDriver {
    pub fn new(http: Http, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            http,
            runner,
            installed: OnceLock::new(),
        }
    }

    async fn newest_from_storage_index(&self, installed: u32) -> Result<String, Error> {
        debug!(installed, "scanning the chromedriver storage index");
        let listing = self.http.get_text(STORAGE_URL).await?;
        newest_for_major(&listing, installed).ok_or_else(|| Error::DriverVersionNotFound {
            browser: Browser::Chrome,
            detail: format!("no release with major version {installed} in the storage index"),
        })
    }
}

#[async_trait]
impl DriverResolver for ChromeDriver {
    fn browser(&self) -> Browser {
        Browser::Chrome
    }

    fn driver_name(&self) -> &'static str {
        "chromedriver"
    }

    async fn installed_browser_version(&self) -> Result<u32, Error> {
        if let Some(version) = self.installed.get() {
            return Ok(*version);
        }
        let version = detect::chrome_version(self.runner.as_ref())?;
        Ok(*self.installed.get_or_init(|| version))
    }

    async fn latest_driver_version(&self) -> Result<String, Error> {
        let body = self.http.get_text(LATEST_RELEASE_URL).await?;
        version::find_token(&body)
    }

    async fn matching_driver_version(&self) -> Result<String, Error> {
        let installed = self.installed_browser_version().await?;

        if installed < MIN_SUPPORTED_MAJOR {
            return Err(Error::BrowserNotSupported {
                detail: format!(
                    "Chrome versions below {MIN_SUPPORTED_MAJOR} (installed: {installed})"
                ),
            });
        }
        if installed >= NOTES_CUTOFF_MAJOR {
            // The release notes stop listing ranges here; the storage index
            // carries one driver line per browser major instead.
            return self.newest_from_storage_index(installed).await;
        }

        let anchor = if installed >= 43 {
            NOTES_ANCHOR_RECENT
        } else {
            NOTES_ANCHOR_LEGACY
        };
        let notes = self
            .http
            .get_text(&format!("{STORAGE_URL}{anchor}/notes.txt"))
            .await?;
        let table = parse_compat_table(&notes);
        write_cache(&paths::cache_file()?, &table)?;

        match match_driver(&table, installed) {
            Some(driver) => Ok(driver),
            None => self.newest_from_storage_index(installed).await,
        }
    }

    fn archive_name(&self, _driver_version: &str) -> String {
        if cfg!(windows) {
            "chromedriver_win32.zip".to_string()
        } else {
            "chromedriver_linux64.zip".to_string()
        }
    }

    fn download_url(&self, driver_version: &str) -> String {
        format!(
            "{STORAGE_URL}{driver_version}/{}",
            self.archive_name(driver_version)
        )
    }

    fn binary_name(&self) -> &'static str {
        if cfg!(windows) {
            "chromedriver.exe"
        } else {
            "chromedriver"
        }
    }
}
