//! Debian package tooling: `apt-get` installs and `dpkg-query` listings.

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{error, info};

use crate::core::installer::{package_name, PackageManager};
use crate::domain::error::{XtuiError, XtuiResult};

pub const APPS_HEADERS: [&str; 5] = ["Name", "Version", "Method", "Status", "Description"];

const DPKG_FORMAT: &str = "${Package}\t${Version}\t${Status}\t${binary:Summary}\n";

#[derive(Debug, Clone, Default)]
pub struct AptPackageManager {
    pub path: Option<PathBuf>,
    pub assume_yes: bool,
    pub quiet: bool,
}

impl AptPackageManager {
    /// Arguments passed after `sudo`
    pub fn install_args(&self, identifier: &str) -> Vec<String> {
        let mut args = vec![
            "apt-get".to_string(),
            "install".to_string(),
            package_name(identifier).to_string(),
        ];
        if self.assume_yes {
            args.push("-y".to_string());
        }
        if self.quiet {
            args.push("-qq".to_string());
        }
        if let Some(path) = &self.path {
            args.push("-o".to_string());
            args.push(format!("Dir={}", path.display()));
        }
        args
    }
}

#[async_trait]
impl PackageManager for AptPackageManager {
    async fn install(&self, package: &str) -> XtuiResult<()> {
        let args = self.install_args(package);
        let command_line = format!("sudo {}", args.join(" "));
        info!(app = package, "Installing application");

        let output = Command::new("sudo")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| XtuiError::subprocess(&command_line, e))?;

        // The screen owns the terminal, so apt's output goes to the log file
        for line in String::from_utf8_lossy(&output.stdout).lines().filter(|l| !l.trim().is_empty()) {
            info!(app = package, "{}", line);
        }

        if output.status.success() {
            info!(app = package, "Application installed");
            Ok(())
        } else {
            error!(app = package, status = %output.status, "Error installing application");
            Err(XtuiError::subprocess(
                command_line,
                failure_message(&output.status, &output.stderr),
            ))
        }
    }

    fn name(&self) -> &str {
        "apt-get"
    }
}

/// `exited with <status>`, followed by apt's trimmed stderr when there is any.
pub fn failure_message(status: &impl std::fmt::Display, stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", status)
    } else {
        format!("exited with {}: {}", status, stderr)
    }
}

/// One row of the installed-applications table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub method: String,
    pub status: String,
    pub description: String,
}

impl AppInfo {
    pub fn into_row(self) -> Vec<String> {
        vec![self.name, self.version, self.method, self.status, self.description]
    }
}

/// Case-insensitive substring filters; empty filters match everything.
#[derive(Debug, Clone, Default)]
pub struct AppFilter {
    pub name: Option<String>,
    pub status: Option<String>,
    pub method: Option<String>,
}

impl AppFilter {
    pub fn matches(&self, app: &AppInfo) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            match needle.as_deref() {
                None | Some("") => true,
                Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
            }
        }
        contains(&app.name, &self.name) && contains(&app.status, &self.status) && contains(&app.method, &self.method)
    }
}

/// Parse tab-separated `dpkg-query -W` output. Lines with fewer than four fields are skipped.
pub fn parse_dpkg_output(output: &str) -> Vec<AppInfo> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields: Vec<&str> = line.splitn(4, '\t').collect();
            if fields.len() < 4 {
                return None;
            }
            let status = if fields[2].contains("deinstall") {
                "residual"
            } else {
                "installed"
            };
            Some(AppInfo {
                name: fields[0].to_string(),
                version: fields[1].to_string(),
                method: "auto".to_string(),
                status: status.to_string(),
                description: fields[3].to_string(),
            })
        })
        .collect()
}

pub async fn installed_apps(filter: &AppFilter) -> XtuiResult<Vec<AppInfo>> {
    let command_line = format!("dpkg-query -W -f='{}'", DPKG_FORMAT.escape_default());
    let output = Command::new("dpkg-query")
        .arg("-W")
        .arg(format!("-f={}", DPKG_FORMAT))
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| XtuiError::subprocess(&command_line, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(status = %output.status, "Error getting installed apps");
        return Err(XtuiError::subprocess(command_line, stderr.trim()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_dpkg_output(&stdout)
        .into_iter()
        .filter(|app| filter.matches(app))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "nginx\t1.24.0-2\tinstall ok installed\tsmall, powerful, scalable web/proxy server\n\
curl\t8.5.0-2\tdeinstall ok config-files\tcommand line tool for transferring data with URL syntax\n\
broken-line\n\n";

    #[test]
    fn test_parse_dpkg_output() {
        let apps = parse_dpkg_output(SAMPLE);
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].name, "nginx");
        assert_eq!(apps[0].status, "installed");
        assert_eq!(apps[1].status, "residual");
        assert_eq!(apps[1].method, "auto");
        assert_eq!(apps[1].clone().into_row().len(), APPS_HEADERS.len());
    }

    #[test]
    fn test_filters_are_case_insensitive() {
        let apps = parse_dpkg_output(SAMPLE);
        let filter = AppFilter {
            status: Some("RESID".into()),
            ..AppFilter::default()
        };
        let matched: Vec<&AppInfo> = apps.iter().filter(|a| filter.matches(a)).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "curl");

        let filter = AppFilter {
            name: Some("ngi".into()),
            method: Some("auto".into()),
            ..AppFilter::default()
        };
        assert!(filter.matches(&apps[0]));
        assert!(!filter.matches(&apps[1]));
    }

    #[test]
    fn test_failure_message_carries_stderr() {
        let stderr = b"E: Unable to locate package htopp\n\n";
        assert_eq!(
            failure_message(&"exit status: 100", stderr),
            "exited with exit status: 100: E: Unable to locate package htopp"
        );
        assert_eq!(failure_message(&"exit status: 1", b"  \n"), "exited with exit status: 1");
    }

    #[test]
    fn test_install_args() {
        let apt = AptPackageManager {
            path: Some(PathBuf::from("/opt/root")),
            assume_yes: true,
            quiet: true,
        };
        assert_eq!(
            apt.install_args("universe/htop"),
            vec!["apt-get", "install", "htop", "-y", "-qq", "-o", "Dir=/opt/root"]
        );
        assert_eq!(AptPackageManager::default().install_args("jq"), vec!["apt-get", "install", "jq"]);
    }
}
