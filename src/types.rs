use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum PackageSource {
    Apt,
    Flatpak,
    Snap,
}

impl PackageSource {
    pub fn label(self) -> &'static str {
        match self {
            PackageSource::Apt => "APT",
            PackageSource::Flatpak => "Flatpak",
            PackageSource::Snap => "Snap",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PackageSource::Apt => "Debian/Ubuntu package",
            PackageSource::Flatpak => "Flatpak application",
            PackageSource::Snap => "Snap package",
        }
    }
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum AppKind {
    Desktop,
    Cli,
    NotApplicable,
}

impl AppKind {
    pub fn label(self) -> &'static str {
        match self {
            AppKind::Desktop => "Desktop",
            AppKind::Cli => "CLI",
            AppKind::NotApplicable => "n/a",
        }
    }
}

/// One installed application, normalized across package sources.
///
/// Records are rebuilt from scratch on every scan and never edited afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppRecord {
    pub name: String,
    pub identifier: String,
    pub source: PackageSource,
    pub kind: AppKind,
    pub icon: Option<String>,
    pub launch: Vec<String>,
    pub version: Option<String>,
    /// Flatpak remote, Snap publisher or dpkg section.
    pub origin: Option<String>,
    pub desktop_file: Option<PathBuf>,
    pub terminal: bool,
    pub removable: bool,
    pub name_lower: Arc<str>,
}

pub(crate) fn lowercase_cache(value: &str) -> Arc<str> {
    if value.is_empty() {
        Arc::<str>::from("")
    } else {
        Arc::<str>::from(value.to_lowercase())
    }
}

impl AppRecord {
    pub(crate) fn new(
        name: String,
        identifier: String,
        source: PackageSource,
        kind: AppKind,
        launch: Vec<String>,
    ) -> Self {
        Self {
            name_lower: lowercase_cache(&name),
            name,
            identifier,
            source,
            kind,
            icon: None,
            launch,
            version: None,
            origin: None,
            desktop_file: None,
            terminal: false,
            removable: true,
        }
    }

    pub fn label(&self) -> String {
        match self.origin.as_deref().filter(|o| !o.is_empty()) {
            Some(origin) => format!("{} [{}]", self.name, origin),
            None => self.name.clone(),
        }
    }

    pub fn launch_display(&self) -> String {
        self.launch.join(" ")
    }

    pub fn can_launch(&self) -> bool {
        self.launch.first().is_some_and(|program| !program.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub(crate) fn success(&self) -> bool {
        self.code.unwrap_or(-1) == 0
    }

    /// Most useful human-readable failure text: stderr, then stdout, then the exit code.
    pub(crate) fn failure_detail(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("Exit code: {}", self.code.unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_includes_origin_when_present() {
        let mut record = AppRecord::new(
            "GIMP".into(),
            "org.gimp.GIMP".into(),
            PackageSource::Flatpak,
            AppKind::NotApplicable,
            vec!["flatpak".into(), "run".into(), "org.gimp.GIMP".into()],
        );
        assert_eq!(record.label(), "GIMP");
        record.origin = Some("flathub".into());
        assert_eq!(record.label(), "GIMP [flathub]");
        assert_eq!(record.name_lower.as_ref(), "gimp");
    }

    #[test]
    fn failure_detail_prefers_stderr() {
        let result = CommandResult {
            code: Some(1),
            stdout: "partial".into(),
            stderr: "  denied \n".into(),
        };
        assert_eq!(result.failure_detail(), "denied");

        let silent = CommandResult {
            code: Some(126),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(!silent.success());
        assert_eq!(silent.failure_detail(), "Exit code: 126");
    }
}
