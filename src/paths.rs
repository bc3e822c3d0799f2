//! Install-directory layout.
//!
//! Drivers land in a hidden per-user root, partitioned by browser name and
//! resolved driver version so several driver versions can coexist:
//! `~/.driloader/drivers/chrome/2.46/chromedriver` on Unix,
//! `~\Driloader\Drivers\chrome\2.46\chromedriver.exe` on Windows.

use std::fs;
use std::path::{Path, PathBuf};

use crate::Browser;
use crate::command::CommandRunner;
use crate::error::Error;

fn user_root() -> Result<PathBuf, Error> {
    let home = dirs::home_dir().ok_or(Error::HomeDirNotFound)?;
    if cfg!(windows) {
        Ok(home.join("Driloader"))
    } else {
        // Hidden by the dot prefix.
        Ok(home.join(".driloader"))
    }
}

/// Default root directory holding all downloaded drivers.
pub fn drivers_root() -> Result<PathBuf, Error> {
    Ok(user_root()?.join(if cfg!(windows) { "Drivers" } else { "drivers" }))
}

/// Location of the Chrome compatibility-table cache file.
pub fn cache_file() -> Result<PathBuf, Error> {
    let configs = user_root()?.join(if cfg!(windows) { "Configs" } else { "configs" });
    Ok(configs.join("version_matcher.json"))
}

/// Creates the default drivers root and marks it hidden.
///
/// On Unix the dot-prefixed name is already hidden; on Windows the hidden
/// file attribute is set on the top-level folder.
pub fn ensure_hidden_root(runner: &dyn CommandRunner) -> Result<PathBuf, Error> {
    let root = drivers_root()?;
    fs::create_dir_all(&root).map_err(|e| Error::Io {
        path: root.clone(),
        source: e,
    })?;

    if cfg!(windows) {
        if let Some(top) = root.parent() {
            let _ = runner.run("attrib", &["+h", &top.display().to_string()]);
        }
    }

    Ok(root)
}

/// Resolved on-disk locations for one driver artifact.
#[derive(Debug, Clone)]
pub struct DriverPaths {
    /// Per-browser, per-version directory.
    pub dir: PathBuf,
    /// Where the downloaded archive is written before extraction.
    pub archive: PathBuf,
    /// Expected location of the extracted driver executable.
    pub binary: PathBuf,
}

impl DriverPaths {
    pub fn new(
        root: &Path,
        browser: Browser,
        driver_version: &str,
        archive_name: &str,
        binary_name: &str,
    ) -> Result<Self, Error> {
        let dir = root.join(browser.name()).join(driver_version);
        fs::create_dir_all(&dir).map_err(|e| Error::Io {
            path: dir.clone(),
            source: e,
        })?;
        Ok(Self {
            archive: dir.join(archive_name),
            binary: dir.join(binary_name),
            dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_paths_partition_by_browser_and_version() {
        let root = tempfile::tempdir().unwrap();
        let paths = DriverPaths::new(
            root.path(),
            Browser::Chrome,
            "2.46",
            "chromedriver_linux64.zip",
            "chromedriver",
        )
        .unwrap();

        assert!(paths.dir.is_dir());
        assert_eq!(paths.dir, root.path().join("chrome").join("2.46"));
        assert_eq!(paths.archive, paths.dir.join("chromedriver_linux64.zip"));
        assert_eq!(paths.binary, paths.dir.join("chromedriver"));
    }

    #[cfg(not(windows))]
    #[test]
    fn unix_root_is_dot_prefixed() {
        // Skipped where no home directory is resolvable.
        let Ok(root) = drivers_root() else { return };
        assert!(root.ends_with(".driloader/drivers"));
    }
}
