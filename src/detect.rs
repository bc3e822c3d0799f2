//! Browser version detection.
//!
//! Produces the integer major version of a named browser on the current OS
//! by shelling out through a [`CommandRunner`]: version flags on Unix,
//! `wmic`/`reg` queries on Windows. Every invocation re-detects; nothing is
//! cached across process runs.

use tracing::debug;

use crate::Browser;
use crate::command::CommandRunner;
use crate::error::Error;
use crate::version;

const CHROME_LAUNCH_UNIX: &str = "google-chrome";
const CHROME_LAUNCH_FALLBACK_UNIX: &str = "google-chrome-stable";

// wmic needs the backslashes in the `where` clause escaped, hence the
// doubled separators.
const CHROME_DEFAULT_PATH_WIN: &str =
    r"C:\\Program Files (x86)\\Google\\Chrome\\Application\\chrome.exe";

const FIREFOX_REGISTRY_KEYS: [&str; 2] = [
    r"SOFTWARE\Classes\FirefoxHTML\shell\open\command",
    r"SOFTWARE\Classes\Applications\firefox.exe\shell\open\command",
];

const IE_REGISTRY_KEY: &str = r"HKEY_LOCAL_MACHINE\Software\Microsoft\Internet Explorer";

/// Returns the installed Google Chrome major version.
pub fn chrome_version(runner: &dyn CommandRunner) -> Result<u32, Error> {
    let output = if cfg!(windows) {
        let clause = format!(r#"name="{CHROME_DEFAULT_PATH_WIN}""#);
        runner.run(
            "wmic",
            &["datafile", "where", &clause, "get", "Version", "/value"],
        )
    } else {
        // The stable channel installs only the suffixed launcher on some
        // distributions.
        let program = [CHROME_LAUNCH_UNIX, CHROME_LAUNCH_FALLBACK_UNIX]
            .into_iter()
            .find(|candidate| which::which(candidate).is_ok())
            .unwrap_or(CHROME_LAUNCH_UNIX);
        runner.run(program, &["--product-version"])
    }
    .map_err(|e| Error::detection(Browser::Chrome, e))?;

    version::extract_major(&output).map_err(|e| Error::detection(Browser::Chrome, e))
}

/// Returns the installed Firefox major version.
pub fn firefox_version(runner: &dyn CommandRunner) -> Result<u32, Error> {
    let output = if cfg!(windows) {
        let path = find_firefox_exe(runner);
        runner.run(&path, &["-v"])
    } else {
        runner.run("firefox", &["-v"])
    }
    .map_err(|e| Error::detection(Browser::Firefox, e))?;

    version::extract_major(&output).map_err(|e| Error::detection(Browser::Firefox, e))
}

/// Returns the installed Internet Explorer major version. Windows only.
pub fn ie_version(runner: &dyn CommandRunner) -> Result<u32, Error> {
    if !cfg!(windows) {
        return Err(Error::UnsupportedPlatform {
            browser: Browser::InternetExplorer,
            os: std::env::consts::OS,
        });
    }

    let output = runner
        .run("reg", &["query", IE_REGISTRY_KEY, "/v", "svcVersion"])
        .map_err(|e| Error::detection(Browser::InternetExplorer, e))?;

    version::extract_major(&output).map_err(|e| Error::detection(Browser::InternetExplorer, e))
}

/// Detects all three browsers sequentially and renders a three-line report.
///
/// Per-browser failures are rendered inline instead of aborting the batch,
/// so the report itself always succeeds.
pub fn detect_all(runner: &dyn CommandRunner) -> String {
    let firefox = render(firefox_version(runner));
    let chrome = render(chrome_version(runner));
    let ie = render(ie_version(runner));
    format!("Firefox: {firefox}\nGoogle Chrome: {chrome}\nInternet Explorer: {ie}")
}

fn render(result: Result<u32, Error>) -> String {
    match result {
        Ok(version) => version.to_string(),
        Err(error) => match std::error::Error::source(&error) {
            Some(cause) => format!("{error} ({cause})"),
            None => error.to_string(),
        },
    }
}

/// Locates `firefox.exe` through the Windows registry, checking the
/// `HKEY_LOCAL_MACHINE` hive before `HKEY_CURRENT_USER` for each known key.
///
/// Returns an empty string when no hive holds a launch command.
pub fn find_firefox_exe(runner: &dyn CommandRunner) -> String {
    for key in FIREFOX_REGISTRY_KEYS {
        for hive in ["HKEY_LOCAL_MACHINE", "HKEY_CURRENT_USER"] {
            let query = format!(r"{hive}\{key}");
            match runner.run("reg", &["query", &query, "/ve"]) {
                Ok(output) => {
                    let exe = exe_from_reg_command(&output);
                    if !exe.is_empty() {
                        return exe;
                    }
                }
                Err(error) => debug!(%query, %error, "registry lookup missed"),
            }
        }
    }
    String::new()
}

/// Extracts the executable path from a `reg query` default-value line such
/// as `(Default)  REG_SZ  "C:\...\firefox.exe" -osint -url "%1"`.
fn exe_from_reg_command(output: &str) -> String {
    output
        .lines()
        .find_map(|line| {
            let (_, command) = line.split_once("REG_SZ")?;
            let command = command.trim();
            let exe = match command.strip_prefix('"') {
                Some(quoted) => quoted.split('"').next().unwrap_or_default(),
                None => command.split_whitespace().next().unwrap_or_default(),
            };
            (!exe.is_empty()).then(|| exe.to_string())
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Canned-output runner keyed by program name.
    struct StubRunner {
        outputs: HashMap<&'static str, &'static str>,
    }

    impl StubRunner {
        fn new(outputs: &[(&'static str, &'static str)]) -> Self {
            Self {
                outputs: outputs.iter().copied().collect(),
            }
        }

        fn empty() -> Self {
            Self::new(&[])
        }
    }

    impl CommandRunner for StubRunner {
        fn run(&self, program: &str, _args: &[&str]) -> Result<String, Error> {
            self.outputs
                .get(program)
                .map(|s| s.to_string())
                .ok_or_else(|| Error::CommandNotFound {
                    command: program.to_string(),
                })
        }
    }

    #[cfg(not(windows))]
    #[test]
    fn chrome_major_version_from_product_version_output() {
        let runner = StubRunner::new(&[
            ("google-chrome", "95.0.4638.54"),
            ("google-chrome-stable", "95.0.4638.54"),
        ]);
        assert_eq!(chrome_version(&runner).unwrap(), 95);
    }

    #[cfg(not(windows))]
    #[test]
    fn firefox_major_version_from_dash_v_output() {
        let runner = StubRunner::new(&[("firefox", "Mozilla Firefox 68.0.2")]);
        assert_eq!(firefox_version(&runner).unwrap(), 68);
    }

    #[cfg(not(windows))]
    #[test]
    fn ie_detection_is_unsupported_off_windows() {
        let err = ie_version(&StubRunner::empty()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform { .. }));
    }

    #[test]
    fn garbage_output_is_a_detection_error_not_a_sentinel() {
        let runner = StubRunner::new(&[
            ("google-chrome", "command not understood"),
            ("google-chrome-stable", "command not understood"),
            ("wmic", "command not understood"),
        ]);
        let err = chrome_version(&runner).unwrap_err();
        assert!(matches!(err, Error::Detection { browser: Browser::Chrome, .. }));
    }

    #[test]
    fn firefox_registry_miss_yields_empty_path() {
        // Both hives empty: path resolution reports "", it does not fail.
        assert_eq!(find_firefox_exe(&StubRunner::empty()), "");
    }

    #[test]
    fn exe_path_parsed_from_quoted_reg_value() {
        let output = concat!(
            "HKEY_LOCAL_MACHINE\\SOFTWARE\\Classes\\FirefoxHTML\\shell\\open\\command\r\n",
            "    (Default)    REG_SZ    \"C:\\Program Files\\Mozilla Firefox\\firefox.exe\" -osint -url \"%1\"\r\n",
        );
        assert_eq!(
            exe_from_reg_command(output),
            r"C:\Program Files\Mozilla Firefox\firefox.exe"
        );
    }

    #[test]
    fn exe_path_parsed_from_unquoted_reg_value() {
        let output = "    (Default)    REG_SZ    C:\\firefox.exe -osint\r\n";
        assert_eq!(exe_from_reg_command(output), r"C:\firefox.exe");
    }

    #[test]
    fn report_renders_failures_inline() {
        let runner = StubRunner::new(&[
            ("google-chrome", "95.0.4638.54"),
            ("google-chrome-stable", "95.0.4638.54"),
        ]);
        let report = detect_all(&runner);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Firefox: "));
        assert!(lines[1].starts_with("Google Chrome: "));
        assert!(lines[2].starts_with("Internet Explorer: "));
        // Firefox is absent from the stub, so its line carries the error text.
        assert!(lines[0].contains("unable to retrieve Firefox version"));
        #[cfg(not(windows))]
        assert_eq!(lines[1], "Google Chrome: 95");
    }
}
