use std::path::Path;

use crate::process::CommandRunner;
use crate::types::{AppKind, AppRecord, PackageSource};

use super::ScanError;
use super::desktop_entry::{DesktopEntry, list_desktop_files, read_desktop_entry};

const SNAP: &str = "snap";
const MIN_COLUMNS: usize = 4;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SnapRow {
    pub name: String,
    pub version: Option<String>,
    pub revision: Option<String>,
    pub publisher: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct SnapColumns {
    name: usize,
    version: usize,
    revision: usize,
    publisher: usize,
    notes: usize,
}

impl Default for SnapColumns {
    fn default() -> Self {
        Self {
            name: 0,
            version: 1,
            revision: 2,
            publisher: 4,
            notes: 5,
        }
    }
}

impl SnapColumns {
    fn from_header(header: &str) -> Option<Self> {
        let titles: Vec<String> = header
            .split_whitespace()
            .map(|title| title.to_ascii_lowercase())
            .collect();
        let find = |title: &str| titles.iter().position(|t| t == title);

        Some(Self {
            name: find("name")?,
            version: find("version")?,
            revision: find("rev").unwrap_or(usize::MAX),
            publisher: find("publisher").unwrap_or(usize::MAX),
            notes: find("notes").unwrap_or(usize::MAX),
        })
    }
}

/// Rows of `snap list`; the first line is the column header.
pub fn parse_snap_list(output: &str) -> Vec<SnapRow> {
    let mut lines = output.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns = SnapColumns::from_header(header).unwrap_or_else(|| {
        log::debug!("Unrecognized snap list header {:?}", header);
        SnapColumns::default()
    });

    lines
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < MIN_COLUMNS {
                log::debug!("Skipping short snap row {:?}", line);
                return None;
            }
            let column = |index: usize| {
                tokens
                    .get(index)
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty() && *value != "-")
                    .map(str::to_string)
            };

            Some(SnapRow {
                name: column(columns.name)?,
                version: column(columns.version),
                revision: column(columns.revision),
                publisher: column(columns.publisher)
                    .map(|publisher| publisher.trim_end_matches(['✓', '*', '✪']).to_string())
                    .filter(|publisher| !publisher.is_empty()),
                notes: column(columns.notes),
            })
        })
        .collect()
}

pub fn scan_snap(runner: &dyn CommandRunner, desktop_dir: &Path) -> Result<Vec<AppRecord>, ScanError> {
    let result = runner.run(SNAP, &["list"])?;
    if !result.success() {
        return Err(ScanError::command_failed(SNAP, &result));
    }

    let mut records: Vec<AppRecord> = parse_snap_list(&result.stdout)
        .into_iter()
        .map(|row| snap_record(row, desktop_dir))
        .collect();
    records.sort_by(|a, b| {
        a.name_lower
            .cmp(&b.name_lower)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });

    log::info!("snap: {} packages", records.len());
    Ok(records)
}

fn snap_record(row: SnapRow, desktop_dir: &Path) -> AppRecord {
    let entry = snap_desktop_entry(&row.name, desktop_dir);
    let name = entry
        .as_ref()
        .map(|entry| entry.name.clone())
        .unwrap_or_else(|| row.name.clone());

    let mut record = AppRecord::new(
        name,
        row.name.clone(),
        PackageSource::Snap,
        AppKind::NotApplicable,
        vec![SNAP.to_string(), "run".to_string(), row.name],
    );
    record.version = row.version;
    record.origin = row.publisher;
    if let Some(entry) = entry {
        record.icon = entry.icon;
        record.desktop_file = Some(entry.path);
    }
    record
}

fn snap_desktop_entry(name: &str, desktop_dir: &Path) -> Option<DesktopEntry> {
    let exact = desktop_dir.join(format!("{name}_{name}.desktop"));
    if let Some(entry) = read_desktop_entry(&exact) {
        return Some(entry);
    }

    let prefix = format!("{name}_");
    list_desktop_files(desktop_dir)
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix))
        })
        .find_map(|path| read_desktop_entry(&path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixtureDir, StubRunner, fixture_dir};

    const SNAP_LIST: &str = "\
Name               Version                     Rev    Tracking         Publisher     Notes
core22             20240111                    1122   latest/stable    canonical✓    base
firefox            122.0-2                     3728   latest/stable/…  mozilla✓      -
spotify            1.2.26.1187.g36b715a1       74     latest/stable    spotify*      -
broken
";

    #[test]
    fn parses_columns_from_header() {
        let rows = parse_snap_list(SNAP_LIST);
        assert_eq!(rows.len(), 3);

        let firefox = &rows[1];
        assert_eq!(firefox.name, "firefox");
        assert_eq!(firefox.version.as_deref(), Some("122.0-2"));
        assert_eq!(firefox.revision.as_deref(), Some("3728"));
        assert_eq!(firefox.publisher.as_deref(), Some("mozilla"));
        assert_eq!(firefox.notes, None);

        assert_eq!(rows[0].notes.as_deref(), Some("base"));
        assert_eq!(rows[2].publisher.as_deref(), Some("spotify"));
    }

    #[test]
    fn unknown_header_uses_positional_columns() {
        let output = "Nom Version Rév Suivi Éditeur Notes\nhello 2.10 42 latest/stable canonical -\n";
        let rows = parse_snap_list(output);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "hello");
        assert_eq!(rows[0].publisher.as_deref(), Some("canonical"));
    }

    #[test]
    fn empty_output_yields_nothing() {
        assert!(parse_snap_list("").is_empty());
        assert!(parse_snap_list("No snaps are installed yet.\n").is_empty());
    }

    #[test]
    fn missing_tool_is_unavailable() {
        let runner = StubRunner::new().with_missing(SNAP);
        let err = scan_snap(&runner, Path::new("/nonexistent")).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn records_pick_up_snap_desktop_files() {
        let dir = fixture_dir();
        dir.write(
            "firefox_firefox.desktop",
            "[Desktop Entry]\nType=Application\nName=Firefox Web Browser\nExec=/snap/bin/firefox %u\nIcon=/snap/firefox/3728/default256.png\n",
        );
        dir.write(
            "spotify_spotify-client.desktop",
            "[Desktop Entry]\nType=Application\nName=Spotify\nExec=spotify %U\nIcon=/snap/spotify/74/usr/share/spotify/icons/spotify-linux-128.png\n",
        );
        let runner = StubRunner::new().with_output(SNAP, 0, SNAP_LIST);

        let records = scan_snap(&runner, dir.path()).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(names, vec!["core22", "firefox", "spotify"]);

        let firefox = &records[1];
        assert_eq!(firefox.launch, vec!["snap", "run", "firefox"]);
        assert_eq!(firefox.icon.as_deref(), Some("/snap/firefox/3728/default256.png"));
        assert_eq!(firefox.name, "Firefox Web Browser");
        assert_eq!(firefox.label(), "Firefox Web Browser [mozilla]");
        assert_eq!(records[2].name, "Spotify");
        assert_eq!(records[0].name, "core22");

        assert!(records[2].icon.as_deref().is_some_and(|icon| icon.ends_with(".png")));
        assert!(records[0].desktop_file.is_none());
    }
}
