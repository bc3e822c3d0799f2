//! Per-browser driver resolution strategies.

pub mod chromedriver;
pub mod geckodriver;
pub mod iedriver;

use std::sync::Arc;

use async_trait::async_trait;

use crate::Browser;
use crate::command::CommandRunner;
use crate::error::Error;
use crate::http::Http;

pub use chromedriver::ChromeDriver;
pub use geckodriver::GeckoDriver;
pub use iedriver::IeDriver;

/// One browser's strategy for mapping an installed browser to a driver
/// release and a download location.
#[async_trait]
pub trait DriverResolver: Send + Sync {
    /// The browser this strategy serves.
    fn browser(&self) -> Browser;

    /// Name of the driver executable family (e.g. "chromedriver").
    fn driver_name(&self) -> &'static str;

    /// Major version of the browser installed on this machine, memoized
    /// for the lifetime of the resolver instance.
    async fn installed_browser_version(&self) -> Result<u32, Error>;

    /// Most recent published driver version, independent of what is
    /// installed locally.
    async fn latest_driver_version(&self) -> Result<String, Error>;

    /// Best driver version for the locally installed browser.
    async fn matching_driver_version(&self) -> Result<String, Error>;

    /// Archive file name for `driver_version` on the current OS.
    fn archive_name(&self, driver_version: &str) -> String;

    /// Full download URL for `driver_version` on the current OS.
    fn download_url(&self, driver_version: &str) -> String;

    /// File name of the driver executable on the current OS.
    fn binary_name(&self) -> &'static str;
}

/// Builds the resolution strategy for `browser`.
pub fn resolver_for(
    browser: Browser,
    http: &Http,
    runner: Arc<dyn CommandRunner>,
) -> Box<dyn DriverResolver> {
    match browser {
        Browser::Chrome => Box::new(ChromeDriver::new(http.clone(), runner)),
        Browser::Firefox => Box::new(GeckoDriver::new(http.clone(), runner)),
        Browser::InternetExplorer => Box::new(IeDriver::new(http.clone(), runner)),
    }
}
