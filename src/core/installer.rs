//! Sequential package installation state machine.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::error::{XtuiError, XtuiResult};

/// Installs one package. Implementations shell out to a real package manager.
#[async_trait]
pub trait PackageManager: Send + Sync {
    async fn install(&self, package: &str) -> XtuiResult<()>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    Installing(usize),
    Done,
}

/// What to do after the current package finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStep {
    Next(String),
    Done,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub installed: Vec<String>,
    pub total: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct InstallerState {
    packages: Vec<String>,
    phase: InstallPhase,
    installed: Vec<String>,
}

impl InstallerState {
    pub fn new(packages: Vec<String>) -> XtuiResult<Self> {
        let packages: Vec<String> = packages
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if packages.is_empty() {
            return Err(XtuiError::InvalidInput("no applications requested".to_string()));
        }
        Ok(Self {
            packages,
            phase: InstallPhase::Installing(0),
            installed: Vec::new(),
        })
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    pub fn phase(&self) -> InstallPhase {
        self.phase
    }

    pub fn total(&self) -> usize {
        self.packages.len()
    }

    pub fn index(&self) -> usize {
        match self.phase {
            InstallPhase::Installing(index) => index,
            InstallPhase::Done => self.packages.len() - 1,
        }
    }

    pub fn current(&self) -> Option<&str> {
        match self.phase {
            InstallPhase::Installing(index) => self.packages.get(index).map(String::as_str),
            InstallPhase::Done => None,
        }
    }

    pub fn installed(&self) -> &[String] {
        &self.installed
    }

    pub fn is_done(&self) -> bool {
        self.phase == InstallPhase::Done
    }

    /// `(index + 1) / total`, or 1.0 once done.
    pub fn progress(&self) -> f64 {
        match self.phase {
            InstallPhase::Installing(index) => (index + 1) as f64 / self.packages.len() as f64,
            InstallPhase::Done => 1.0,
        }
    }

    /// Record the current package as installed and advance.
    pub fn on_installed(&mut self) -> InstallStep {
        let InstallPhase::Installing(index) = self.phase else {
            return InstallStep::Done;
        };
        self.installed.push(self.packages[index].clone());

        if index + 1 >= self.packages.len() {
            self.phase = InstallPhase::Done;
            InstallStep::Done
        } else {
            self.phase = InstallPhase::Installing(index + 1);
            InstallStep::Next(self.packages[index + 1].clone())
        }
    }

    pub fn report(&self, cancelled: bool) -> InstallReport {
        InstallReport {
            installed: self.installed.clone(),
            total: self.packages.len(),
            cancelled,
        }
    }
}

/// Package name without a `repo/` prefix
pub fn package_name(identifier: &str) -> &str {
    identifier
        .split_once('/')
        .map(|(_, name)| name)
        .unwrap_or(identifier)
}
