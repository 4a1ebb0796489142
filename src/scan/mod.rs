//! Installed-software discovery for the three package sources.
//!
//! Each scanner is a function of filesystem paths and a [`CommandRunner`];
//! [`scan_all`] runs them side by side and folds the results into a
//! [`Catalog`]. A source that is not installed on this machine simply
//! contributes no records.

pub mod desktop_entry;
pub mod dpkg;
pub mod flatpak;
pub mod snap;

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use chrono::Utc;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::process::{CommandRunner, ProcessError};
use crate::settings::AppSettings;
use crate::types::{AppRecord, CommandResult, PackageSource};

pub const DEFAULT_HIDDEN_SECTIONS: &[&str] = &[
    "libs",
    "python",
    "perl",
    "kernel",
    "doc",
    "metapackages",
    "oldlibs",
    "debug",
];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{0} is not installed")]
    ToolMissing(String),
    #[error("{program} exited with code {code}: {detail}")]
    CommandFailed {
        program: String,
        code: i32,
        detail: String,
    },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub(crate) fn command_failed(program: &str, result: &CommandResult) -> Self {
        ScanError::CommandFailed {
            program: program.to_string(),
            code: result.code.unwrap_or(-1),
            detail: result.failure_detail(),
        }
    }

    /// The source does not exist on this system, as opposed to being broken.
    pub fn is_unavailable(&self) -> bool {
        match self {
            ScanError::ToolMissing(_) => true,
            ScanError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            ScanError::CommandFailed { .. } => false,
        }
    }
}

impl From<ProcessError> for ScanError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Missing(program) => ScanError::ToolMissing(program),
            ProcessError::Io { program, source } => ScanError::Io {
                path: PathBuf::from(program),
                source,
            },
        }
    }
}

/// Where the scanners look. Rooted at `/` in production and at a fixture
/// directory in tests.
#[derive(Clone, Debug)]
pub struct ScanConfig {
    pub dpkg_status: PathBuf,
    pub dpkg_info_dir: PathBuf,
    /// Searched in order; the first directory providing a desktop id wins.
    pub desktop_dirs: Vec<PathBuf>,
    pub flatpak_export_dirs: Vec<PathBuf>,
    pub snap_desktop_dir: PathBuf,
    pub hidden_sections: Vec<String>,
    pub include_standalone_entries: bool,
}

impl ScanConfig {
    #[cfg(test)]
    pub fn for_root(root: &Path) -> Self {
        Self::with_home(root, &root.join("home"), None)
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        let home = env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/root"));
        let data_home = env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .filter(|path| path.is_absolute());

        let mut config = Self::with_home(Path::new("/"), &home, data_home);
        config.desktop_dirs.extend(
            settings
                .extra_desktop_dirs
                .iter()
                .map(|dir| expand_home(dir, &home)),
        );
        config.hidden_sections = settings.hidden_sections.clone();
        config.include_standalone_entries = settings.include_standalone_entries;
        config
    }

    fn with_home(root: &Path, home: &Path, data_home: Option<PathBuf>) -> Self {
        let data_home = data_home.unwrap_or_else(|| home.join(".local/share"));
        Self {
            dpkg_status: root.join("var/lib/dpkg/status"),
            dpkg_info_dir: root.join("var/lib/dpkg/info"),
            desktop_dirs: vec![
                data_home.join("applications"),
                root.join("usr/local/share/applications"),
                root.join("usr/share/applications"),
            ],
            flatpak_export_dirs: vec![
                data_home.join("flatpak/exports/share/applications"),
                root.join("var/lib/flatpak/exports/share/applications"),
            ],
            snap_desktop_dir: root.join("var/lib/snapd/desktop/applications"),
            hidden_sections: DEFAULT_HIDDEN_SECTIONS
                .iter()
                .map(|section| section.to_string())
                .collect(),
            include_standalone_entries: true,
        }
    }
}

fn expand_home(dir: &str, home: &Path) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(dir),
    }
}

/// Run every scanner concurrently and merge the results.
pub fn scan_all(config: &ScanConfig, runner: &dyn CommandRunner) -> Catalog {
    let (dpkg, flatpak, snap) = thread::scope(|scope| {
        let dpkg = scope.spawn(|| dpkg::scan_dpkg(config));
        let flatpak = scope.spawn(|| flatpak::scan_flatpak(runner, &config.flatpak_export_dirs));
        let snap = scope.spawn(|| snap::scan_snap(runner, &config.snap_desktop_dir));
        (join(dpkg), join(flatpak), join(snap))
    });

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    for (source, result) in [
        (PackageSource::Apt, dpkg),
        (PackageSource::Flatpak, flatpak),
        (PackageSource::Snap, snap),
    ] {
        match result {
            Ok(found) => records.extend(found),
            Err(err) if err.is_unavailable() => {
                log::debug!("{} source unavailable: {}", source, err);
            }
            Err(err) => {
                log::warn!("{} scan failed: {}", source, err);
                warnings.push(format!("{}: {}", source, err));
            }
        }
    }

    Catalog::new(records, Some(Utc::now()), warnings)
}

fn join(
    handle: thread::ScopedJoinHandle<'_, Result<Vec<AppRecord>, ScanError>>,
) -> Result<Vec<AppRecord>, ScanError> {
    handle.join().unwrap_or_else(|_| {
        log::error!("Scanner thread panicked");
        Ok(Vec::new())
    })
}
