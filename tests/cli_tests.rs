use std::path::Path;
use std::process::{Command, Output};
use std::str;

/// CLI interface tests against the built binary
#[cfg(test)]
mod cli_tests {
    use super::*;
    use tempfile::tempdir;

    /// Run xtui quietly with an explicit (empty) config file so the user's own config never leaks in.
    fn xtui(config_dir: &Path, args: &[&str]) -> Output {
        let config = config_dir.join("config.toml");
        if !config.exists() {
            std::fs::write(&config, "").expect("Failed to write config");
        }
        Command::new(env!("CARGO_BIN_EXE_xtui"))
            .arg("-q")
            .arg("-c")
            .arg(&config)
            .args(args)
            .env_remove("XTUI_PAGE_SIZE_LIMIT")
            .output()
            .expect("Failed to execute command")
    }

    fn stdout(output: &Output) -> &str {
        str::from_utf8(&output.stdout).expect("Invalid UTF-8")
    }

    fn stderr(output: &Output) -> &str {
        str::from_utf8(&output.stderr).expect("Invalid UTF-8")
    }

    #[test]
    fn test_cli_help() {
        let output = Command::new(env!("CARGO_BIN_EXE_xtui"))
            .arg("--help")
            .output()
            .expect("Failed to execute command");

        let text = stdout(&output);
        assert!(text.contains("Usage:"));
        assert!(text.contains("Commands:"));
        for command in ["install", "form", "loader", "table", "apps", "logs", "tcp-status", "config"] {
            assert!(text.contains(command), "help is missing {}", command);
        }
    }

    #[test]
    fn test_cli_version() {
        let dir = tempdir().unwrap();
        let output = xtui(dir.path(), &["version"]);
        assert!(output.status.success());
        assert_eq!(stdout(&output).trim(), format!("xtui {}", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_plain_table_with_filter_as_csv() {
        let dir = tempdir().unwrap();
        let output = xtui(
            dir.path(),
            &[
                "view-table",
                "--plain",
                "--headers",
                "Name,Status",
                "-r",
                "nginx,installed",
                "-r",
                "curl,residual",
                "--filter",
                "resid",
                "-o",
                "csv",
            ],
        );
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(stdout(&output), "Name,Status\ncurl,residual\n");
    }

    #[test]
    fn test_plain_table_from_csv_file_as_json() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("apps.csv");
        std::fs::write(&csv_path, "Name,Status\nnginx,installed\ncurl,residual\n").unwrap();

        let output = xtui(
            dir.path(),
            &["table", "--plain", "--file", csv_path.to_str().unwrap(), "-o", "json"],
        );
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let rows: Vec<serde_json::Value> = serde_json::from_str(stdout(&output)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Status"], "residual");
    }

    #[test]
    fn test_table_without_columns_fails() {
        let dir = tempdir().unwrap();
        let output = xtui(dir.path(), &["table", "--plain"]);
        assert!(!output.status.success());
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).starts_with("Error: "));
    }

    #[test]
    fn test_config_show_and_validate() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[table]\npage_size = 15\n").unwrap();

        let output = xtui(dir.path(), &["config", "show", "-o", "json"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let config: serde_json::Value = serde_json::from_str(stdout(&output)).unwrap();
        assert_eq!(config["table"]["page_size"], 15);

        let output = xtui(dir.path(), &["config", "validate"]);
        assert!(output.status.success());
        assert!(stdout(&output).contains("Configuration is valid"));
    }

    #[test]
    fn test_config_validate_reports_issues() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[loader]\nspinner = \"sparkle\"\n").unwrap();

        let output = xtui(dir.path(), &["config", "validate"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stdout(&output).contains("loader.spinner"));
        assert!(stderr(&output).contains("1 configuration issue(s) found"));
    }

    #[test]
    fn test_config_init_writes_once() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir(&project).unwrap();
        let project_arg = project.to_str().unwrap();

        let output = xtui(dir.path(), &["config", "init", "--dir", project_arg]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(project.join(".xtui").join("config.toml").exists());

        let output = xtui(dir.path(), &["config", "init", "--dir", project_arg]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("already exists"));
    }

    #[test]
    fn test_missing_config_file_fails() {
        let output = Command::new(env!("CARGO_BIN_EXE_xtui"))
            .args(["-q", "-c", "/nonexistent/xtui/config.toml", "version"])
            .output()
            .expect("Failed to execute command");
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Configuration file not found"));
    }

    #[test]
    fn test_tcp_status_reachable_and_refused() {
        let dir = tempdir().unwrap();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let target = listener.local_addr().unwrap().to_string();

        let output = xtui(dir.path(), &["tcp-status", &target, "-o", "json"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let report: serde_json::Value = serde_json::from_str(stdout(&output)).unwrap();
        assert_eq!(report["reachable"], true);

        drop(listener);
        let output = xtui(dir.path(), &["tcp-status", &target, "-t", "2"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).starts_with("Error: "));
    }

    #[test]
    fn test_invalid_field_spec_is_rejected_before_the_screen() {
        let dir = tempdir().unwrap();
        let output = xtui(dir.path(), &["form", "-f", "Code:min=5:max=2"]);
        assert!(!output.status.success());
        assert!(stderr(&output).contains("min length 5 exceeds max length 2"));
    }
}
