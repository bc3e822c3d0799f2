//! Detects locally installed browsers and downloads the matching WebDriver
//! binary to a predictable per-user location.

use std::fmt;

// Top-level public modules
pub mod command;
pub mod detect;
pub mod downloader;
pub mod drivers;
pub mod error;
pub mod http;
pub mod install;
pub mod paths;
pub mod version;

pub use command::{CommandRunner, SystemCommandRunner};
pub use drivers::{DriverResolver, resolver_for};
pub use error::Error;
pub use http::{Http, ProxyConfig};
pub use install::{
    InstallOptions, VersionSpec, install_chrome_driver, install_driver, install_gecko_driver,
    install_ie_driver,
};

/// The browsers this crate knows how to resolve drivers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Browser {
    Chrome,
    Firefox,
    InternetExplorer,
}

impl Browser {
    /// Short name used for install directories and CLI dispatch.
    pub fn name(self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::InternetExplorer => "ie",
        }
    }

    /// Parses a browser name as given on the command line or by an API caller.
    pub fn from_name(name: &str) -> Result<Browser, Error> {
        match name.to_ascii_lowercase().as_str() {
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            "ie" | "internet_explorer" | "internet-explorer" => Ok(Browser::InternetExplorer),
            other => Err(Error::BrowserNotSupported {
                detail: format!("unknown browser `{other}`"),
            }),
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Browser::Chrome => "Google Chrome",
            Browser::Firefox => "Firefox",
            Browser::InternetExplorer => "Internet Explorer",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_names_round_trip() {
        for browser in [Browser::Chrome, Browser::Firefox, Browser::InternetExplorer] {
            assert_eq!(Browser::from_name(browser.name()).unwrap(), browser);
        }
    }

    #[test]
    fn from_name_accepts_cli_spelling() {
        assert_eq!(
            Browser::from_name("internet-explorer").unwrap(),
            Browser::InternetExplorer
        );
        assert_eq!(Browser::from_name("CHROME").unwrap(), Browser::Chrome);
    }

    #[test]
    fn from_name_rejects_unknown_browser() {
        let err = Browser::from_name("safari").unwrap_err();
        assert!(matches!(err, Error::BrowserNotSupported { .. }));
    }
}
