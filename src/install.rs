//! Facade tying detection, resolution and file handling together.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::Browser;
use crate::command::{CommandRunner, SystemCommandRunner};
use crate::downloader;
use crate::drivers::resolver_for;
use crate::error::Error;
use crate::http::{Http, ProxyConfig};
use crate::paths::{self, DriverPaths};

/// Which driver version to install.
#[derive(Debug, Clone, Default)]
pub enum VersionSpec {
    /// Resolve the version matching the locally installed browser.
    #[default]
    Autodetect,
    /// Take the latest published driver, ignoring what is installed.
    Latest,
    /// Install exactly this version.
    Exact(String),
}

/// Options for [`install_driver`].
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub version: VersionSpec,
    /// Overrides the default hidden per-user install root.
    pub install_root: Option<PathBuf>,
    pub proxy: ProxyConfig,
}

/// Resolves, downloads and unpacks the driver for `browser`, returning the
/// path to the driver executable.
///
/// A driver already present at the target path is trusted and returned
/// without any network traffic. The downloaded archive is deleted after a
/// successful extraction.
pub async fn install_driver(browser: Browser, options: &InstallOptions) -> Result<PathBuf, Error> {
    let http = Http::new(&options.proxy)?;
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
    let resolver = resolver_for(browser, &http, runner.clone());

    let driver_version = match &options.version {
        VersionSpec::Autodetect => resolver.matching_driver_version().await?,
        VersionSpec::Latest => resolver.latest_driver_version().await?,
        VersionSpec::Exact(version) => version.clone(),
    };
    info!(%browser, driver = resolver.driver_name(), version = %driver_version, "resolved driver version");

    let root = match &options.install_root {
        Some(custom) => {
            std::fs::create_dir_all(custom).map_err(|e| Error::Io {
                path: custom.clone(),
                source: e,
            })?;
            custom.clone()
        }
        None => paths::ensure_hidden_root(runner.as_ref())?,
    };

    let layout = DriverPaths::new(
        &root,
        browser,
        &driver_version,
        &resolver.archive_name(&driver_version),
        resolver.binary_name(),
    )?;

    if layout.binary.is_file() {
        info!(path = %layout.binary.display(), "driver already installed");
        return Ok(layout.binary);
    }

    let url = resolver.download_url(&driver_version);
    downloader::download(&http, &url, &layout.archive).await?;
    downloader::extract(&layout.archive, &layout.dir, true).await?;

    let binary = downloader::find_binary(&layout.dir, resolver.binary_name())?;
    if !binary.extension().is_some_and(|e| e == "exe") {
        downloader::make_executable(&binary)?;
    }

    info!(path = %binary.display(), "driver installed");
    Ok(binary)
}

/// Installs the chromedriver matching the local Chrome.
pub async fn install_chrome_driver() -> Result<PathBuf, Error> {
    install_driver(Browser::Chrome, &InstallOptions::default()).await
}

/// Installs the geckodriver for the local Firefox.
pub async fn install_gecko_driver() -> Result<PathBuf, Error> {
    install_driver(Browser::Firefox, &InstallOptions::default()).await
}

/// Installs the IEDriverServer for the local Internet Explorer.
pub async fn install_ie_driver() -> Result<PathBuf, Error> {
    install_driver(Browser::InternetExplorer, &InstallOptions::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn existing_driver_short_circuits_without_network() {
        let root = tempfile::tempdir().unwrap();
        let binary_name = if cfg!(windows) {
            "chromedriver.exe"
        } else {
            "chromedriver"
        };

        let dir = root.path().join("chrome").join("2.46");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(binary_name), b"driver").unwrap();

        let options = InstallOptions {
            version: VersionSpec::Exact("2.46".to_string()),
            install_root: Some(root.path().to_path_buf()),
            proxy: ProxyConfig::default(),
        };

        let installed = install_driver(Browser::Chrome, &options).await.unwrap();
        assert_eq!(installed, dir.join(binary_name));
    }
}
