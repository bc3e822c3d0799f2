//! The "all browsers" report aggregates per-browser results and never
//! fails as a whole: individual detection errors are rendered inline.

use driloader::command::{CommandRunner, SystemCommandRunner};
use driloader::detect::detect_all;
use driloader::error::Error;

/// Runner that only knows Chrome; everything else is missing.
struct ChromeOnlyRunner;

impl CommandRunner for ChromeOnlyRunner {
    fn run(&self, program: &str, _args: &[&str]) -> Result<String, Error> {
        if program.contains("google-chrome") || program == "wmic" {
            Ok("95.0.4638.54".to_string())
        } else {
            Err(Error::CommandNotFound {
                command: program.to_string(),
            })
        }
    }
}

#[test]
fn report_mixes_versions_and_inline_errors() {
    let report = detect_all(&ChromeOnlyRunner);
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Firefox: "));
    assert!(lines[1].starts_with("Google Chrome: 95"));
    assert!(lines[2].starts_with("Internet Explorer: "));

    // Firefox is missing: its line carries the rendered error instead of a
    // version, and the report still came back as a whole.
    assert!(lines[0].contains("unable to retrieve Firefox version"));
}

#[test]
fn report_from_the_real_system_always_has_three_lines() {
    // Works whether or not any browser is installed on the test machine;
    // missing browsers degrade to inline error text.
    let report = detect_all(&SystemCommandRunner);
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Firefox: "));
    assert!(lines[1].starts_with("Google Chrome: "));
    assert!(lines[2].starts_with("Internet Explorer: "));
}
