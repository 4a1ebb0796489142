use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{AppKind, AppRecord, PackageSource};

use super::ScanConfig;
use super::ScanError;
use super::desktop_entry::{DesktopEntry, list_desktop_files, read_desktop_entry};

pub(crate) const STANDALONE_ORIGIN: &str = "standalone";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DpkgPackage {
    pub name: String,
    pub version: Option<String>,
    pub section: Option<String>,
    pub architecture: Option<String>,
}

/// Installed packages from the contents of a dpkg status database.
///
/// Multi-arch installs list the same package once per architecture; only the
/// first stanza is kept so each package yields one record.
pub fn parse_status(content: &str) -> Vec<DpkgPackage> {
    let mut seen = HashSet::new();
    content
        .split("\n\n")
        .filter_map(parse_stanza)
        .filter(|pkg| seen.insert(pkg.name.clone()))
        .collect()
}

fn parse_stanza(stanza: &str) -> Option<DpkgPackage> {
    let mut name = None;
    let mut version = None;
    let mut section = None;
    let mut architecture = None;
    let mut status = None;

    for line in stanza.lines() {
        // Continuation lines of multi-line fields.
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key {
            "Package" => name = Some(value.to_string()),
            "Version" => version = Some(value.to_string()),
            "Section" => section = Some(value.to_string()),
            "Architecture" => architecture = Some(value.to_string()),
            "Status" => status = Some(value),
            _ => {}
        }
    }

    let name = name?;
    let installed = status.is_some_and(|s| s.split_whitespace().last() == Some("installed"));
    if !installed {
        log::debug!("Skipping dpkg stanza for {}: not installed", name);
        return None;
    }

    Some(DpkgPackage {
        name,
        version,
        section,
        architecture,
    })
}

/// Library-ish sections are not applications; `libs/foo` style sections match too.
pub fn section_is_hidden(section: Option<&str>, hidden: &[String]) -> bool {
    let Some(section) = section.filter(|s| !s.is_empty()) else {
        return false;
    };
    let lowered = section.to_lowercase();
    lowered.split('/').any(|component| {
        hidden
            .iter()
            .any(|blocked| blocked.eq_ignore_ascii_case(component))
    })
}

pub fn scan_dpkg(config: &ScanConfig) -> Result<Vec<AppRecord>, ScanError> {
    let content = fs::read(&config.dpkg_status).map_err(|source| ScanError::Io {
        path: config.dpkg_status.clone(),
        source,
    })?;
    let content = String::from_utf8_lossy(&content);

    let packages: Vec<DpkgPackage> = parse_status(&content)
        .into_iter()
        .filter(|pkg| !section_is_hidden(pkg.section.as_deref(), &config.hidden_sections))
        .collect();

    let catalog = DesktopCatalog::load(&config.desktop_dirs);
    let mut claimed_ids: HashSet<String> = HashSet::new();
    let mut records = Vec::with_capacity(packages.len());

    for pkg in &packages {
        let entries = catalog.entries_for_package(pkg, &config.dpkg_info_dir);
        for entry in &entries {
            claimed_ids.insert(entry.id.clone());
        }
        records.push(package_record(pkg, entries.first()));
    }

    if config.include_standalone_entries {
        let known: HashSet<&str> = packages.iter().map(|pkg| pkg.name.as_str()).collect();
        for entry in catalog.unclaimed(&claimed_ids) {
            if is_sandbox_export(entry) || known.contains(entry.id.as_str()) {
                continue;
            }
            records.push(standalone_record(entry));
        }
    }

    records.sort_by(|a, b| {
        a.name_lower
            .cmp(&b.name_lower)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });

    let desktop = records.iter().filter(|r| r.kind == AppKind::Desktop).count();
    log::info!(
        "dpkg: {} packages ({} desktop, {} cli)",
        records.len(),
        desktop,
        records.len() - desktop
    );
    Ok(records)
}

fn package_record(pkg: &DpkgPackage, entry: Option<&DesktopEntry>) -> AppRecord {
    match entry {
        Some(entry) => {
            let mut record = AppRecord::new(
                entry.name.clone(),
                pkg.name.clone(),
                PackageSource::Apt,
                AppKind::Desktop,
                entry.argv.clone(),
            );
            record.icon = entry.icon.clone();
            record.desktop_file = Some(entry.path.clone());
            record.terminal = entry.terminal;
            record.version = pkg.version.clone();
            record.origin = pkg.section.clone();
            record
        }
        None => {
            let mut record = AppRecord::new(
                pkg.name.clone(),
                pkg.name.clone(),
                PackageSource::Apt,
                AppKind::Cli,
                vec![pkg.name.clone()],
            );
            record.version = pkg.version.clone();
            record.origin = pkg.section.clone();
            record.terminal = true;
            record
        }
    }
}

fn standalone_record(entry: &DesktopEntry) -> AppRecord {
    let mut record = AppRecord::new(
        entry.name.clone(),
        entry.id.clone(),
        PackageSource::Apt,
        AppKind::Desktop,
        entry.argv.clone(),
    );
    record.icon = entry.icon.clone();
    record.desktop_file = Some(entry.path.clone());
    record.terminal = entry.terminal;
    record.origin = Some(STANDALONE_ORIGIN.to_string());
    record.removable = false;
    record
}

/// Entries that launch through Flatpak or Snap belong to those tabs.
fn is_sandbox_export(entry: &DesktopEntry) -> bool {
    let program = entry.argv.first().map(String::as_str).unwrap_or_default();
    let program_name = Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program);
    program_name == "flatpak"
        || program_name == "snap"
        || program.starts_with("/snap/bin/")
        || entry.path.to_string_lossy().contains("/flatpak/exports/")
}

/// Parsed desktop entries from every application directory, first directory wins per id.
struct DesktopCatalog {
    by_id: BTreeMap<String, DesktopEntry>,
    by_path: BTreeMap<PathBuf, String>,
}

impl DesktopCatalog {
    fn load(dirs: &[PathBuf]) -> Self {
        let mut by_id = BTreeMap::new();
        let mut by_path = BTreeMap::new();
        for dir in dirs {
            for path in list_desktop_files(dir) {
                let Some(entry) = read_desktop_entry(&path) else {
                    log::debug!("Ignoring desktop entry {}", path.display());
                    continue;
                };
                if by_id.contains_key(&entry.id) {
                    continue;
                }
                by_path.insert(path, entry.id.clone());
                by_id.insert(entry.id.clone(), entry);
            }
        }
        Self { by_id, by_path }
    }

    fn entries_for_package(&self, pkg: &DpkgPackage, info_dir: &Path) -> Vec<DesktopEntry> {
        let mut found: BTreeMap<String, DesktopEntry> = BTreeMap::new();

        for path in owned_desktop_files(pkg, info_dir) {
            if let Some(id) = self.by_path.get(&path) {
                if let Some(entry) = self.by_id.get(id) {
                    found.insert(entry.id.clone(), entry.clone());
                }
                continue;
            }
            if let Some(entry) = read_desktop_entry(&path) {
                found.entry(entry.id.clone()).or_insert(entry);
            }
        }

        let prefix = format!("{}-", pkg.name);
        for (id, entry) in &self.by_id {
            if *id == pkg.name || id.starts_with(&prefix) {
                found.entry(id.clone()).or_insert_with(|| entry.clone());
            }
        }

        // An exact id match is the best launcher for the package.
        let mut entries: Vec<DesktopEntry> = found.into_values().collect();
        entries.sort_by_key(|entry| (entry.id != pkg.name, entry.id.clone()));
        entries
    }

    fn unclaimed<'a>(&'a self, claimed: &'a HashSet<String>) -> impl Iterator<Item = &'a DesktopEntry> {
        self.by_id
            .values()
            .filter(move |entry| !claimed.contains(&entry.id))
    }
}

/// Desktop files listed in the package's dpkg file list.
fn owned_desktop_files(pkg: &DpkgPackage, info_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![info_dir.join(format!("{}.list", pkg.name))];
    if let Some(arch) = pkg.architecture.as_deref() {
        candidates.push(info_dir.join(format!("{}:{}.list", pkg.name, arch)));
    }

    candidates
        .into_iter()
        .filter_map(|list| fs::read_to_string(list).ok())
        .flat_map(|content| {
            content
                .lines()
                .map(str::trim)
                .filter(|line| line.ends_with(".desktop") && line.contains("/applications/"))
                .map(PathBuf::from)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::scan::ScanConfig;
    use crate::testing::{FixtureDir, fixture_dir};

    const STATUS: &str = "\
Package: vim
Status: install ok installed
Priority: optional
Section: editors
Architecture: amd64
Version: 2:9.0.1378-2
Description: Vi IMproved - enhanced vi editor
 Vim is an almost compatible version of the UNIX editor Vi.

Package: firefox-esr
Status: install ok installed
Section: web
Architecture: amd64
Version: 115.6.0esr-1
Description: Mozilla Firefox web browser

Package: libc6
Status: install ok installed
Section: libs
Architecture: amd64
Version: 2.36-9

Package: python3-yaml
Status: install ok installed
Section: python
Version: 6.0-3

Package: removed-thing
Status: deinstall ok config-files
Section: utils
Version: 1.0

Package: gimp
Status: install ok installed
Section: graphics
Architecture: amd64
Version: 2.10.34-1
";

    fn config_for(dir: &TempDir) -> ScanConfig {
        let mut config = ScanConfig::for_root(dir.path());
        config.dpkg_status = dir.path().join("var/lib/dpkg/status");
        config
    }

    #[test]
    fn parse_status_keeps_installed_packages_only() {
        let packages = parse_status(STATUS);
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["vim", "firefox-esr", "libc6", "python3-yaml", "gimp"]);
        assert_eq!(packages[0].version.as_deref(), Some("2:9.0.1378-2"));
        assert_eq!(packages[0].section.as_deref(), Some("editors"));
    }

    #[test]
    fn multiarch_package_yields_one_entry() {
        let status = "\
Package: libgl1-mesa-dri
Status: install ok installed
Architecture: amd64
Version: 22.3.6-1

Package: libgl1-mesa-dri
Status: install ok installed
Architecture: i386
Version: 22.3.6-1
";
        let packages = parse_status(status);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].architecture.as_deref(), Some("amd64"));
    }

    #[test]
    fn section_blacklist_matches_components() {
        let hidden = vec!["libs".to_string(), "python".to_string()];
        assert!(section_is_hidden(Some("libs"), &hidden));
        assert!(section_is_hidden(Some("contrib/libs"), &hidden));
        assert!(section_is_hidden(Some("Python"), &hidden));
        assert!(!section_is_hidden(Some("editors"), &hidden));
        assert!(!section_is_hidden(Some("libsomething"), &hidden));
        assert!(!section_is_hidden(None, &hidden));
    }

    #[test]
    fn missing_status_database_is_an_error_not_a_panic() {
        let dir = fixture_dir();
        let config = config_for(&dir);
        let err = scan_dpkg(&config).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn classifies_desktop_and_cli_packages() {
        let dir = fixture_dir();
        dir.write("var/lib/dpkg/status", STATUS);
        let firefox_desktop = dir.write(
            "opt/firefox/share/applications/browser.desktop",
            "[Desktop Entry]\nType=Application\nName=Firefox ESR\nExec=/usr/lib/firefox-esr/firefox-esr %u\nIcon=firefox-esr\n",
        );
        dir.write(
            "var/lib/dpkg/info/firefox-esr:amd64.list",
            &format!("/usr/lib/firefox-esr\n{}\n", firefox_desktop.display()),
        );
        dir.write(
            "usr/share/applications/gimp-2.10.desktop",
            "[Desktop Entry]\nType=Application\nName=GNU Image Manipulation Program\nExec=gimp-2.10 %U\nIcon=gimp\n",
        );
        let mut config = config_for(&dir);
        config.include_standalone_entries = false;

        let records = scan_dpkg(&config).unwrap();
        let summary: Vec<(&str, AppKind)> = records
            .iter()
            .map(|r| (r.identifier.as_str(), r.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("firefox-esr", AppKind::Desktop),
                ("gimp", AppKind::Desktop),
                ("vim", AppKind::Cli),
            ]
        );

        let firefox = &records[0];
        assert_eq!(firefox.name, "Firefox ESR");
        assert_eq!(firefox.label(), "Firefox ESR [web]");
        assert_eq!(firefox.launch, vec!["/usr/lib/firefox-esr/firefox-esr"]);
        assert_eq!(firefox.desktop_file.as_deref(), Some(firefox_desktop.as_path()));
        assert_eq!(firefox.icon.as_deref(), Some("firefox-esr"));
        assert_eq!(firefox.version.as_deref(), Some("115.6.0esr-1"));

        let gimp = &records[1];
        assert_eq!(gimp.name, "GNU Image Manipulation Program");
        assert_eq!(gimp.launch, vec!["gimp-2.10"]);

        let vim = &records[2];
        assert_eq!(vim.name, "vim");

        assert_eq!(vim.launch, vec!["vim"]);
        assert!(vim.icon.is_none());
        assert!(vim.removable);
    }

    #[test]
    fn standalone_entries_are_listed_but_not_removable() {
        let dir = fixture_dir();
        dir.write("var/lib/dpkg/status", "Package: vim\nStatus: install ok installed\nVersion: 9\n");
        dir.write(
            "home/.local/share/applications/my-script.desktop",
            "[Desktop Entry]\nType=Application\nName=My Script\nExec=/home/me/bin/run.sh\n",
        );
        dir.write(
            "home/.local/share/applications/org.gimp.GIMP.desktop",
            "[Desktop Entry]\nType=Application\nName=GIMP\nExec=/usr/bin/flatpak run org.gimp.GIMP\n",
        );
        let config = config_for(&dir);

        let records = scan_dpkg(&config).unwrap();
        assert_eq!(records.len(), 2);
        let standalone = records.iter().find(|r| r.identifier == "my-script").unwrap();
        assert_eq!(standalone.name, "My Script");
        assert_eq!(standalone.kind, AppKind::Desktop);
        assert_eq!(standalone.origin.as_deref(), Some(STANDALONE_ORIGIN));
        assert!(!standalone.removable);
    }

    #[test]
    fn repeated_scans_are_identical() {
        let dir = fixture_dir();
        dir.write("var/lib/dpkg/status", STATUS);
        dir.write(
            "usr/share/applications/vim.desktop",
            "[Desktop Entry]\nType=Application\nName=Vim\nExec=vim %F\nTerminal=true\n",
        );
        let config = config_for(&dir);
        let first = scan_dpkg(&config).unwrap();
        let second = scan_dpkg(&config).unwrap();
        assert_eq!(first, second);
        let vim = first.iter().find(|r| r.identifier == "vim").unwrap();
        assert_eq!(vim.kind, AppKind::Desktop);
        assert!(vim.terminal);
    }
}
