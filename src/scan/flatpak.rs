use std::path::PathBuf;

use crate::process::CommandRunner;
use crate::types::{AppKind, AppRecord, PackageSource};

use super::ScanError;
use super::desktop_entry::read_desktop_entry;

const FLATPAK: &str = "flatpak";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlatpakRow {
    pub application: String,
    pub origin: Option<String>,
    pub version: Option<String>,
    pub name: Option<String>,
}

/// Rows of `flatpak list --app --columns=application,origin,version,name`.
pub fn parse_flatpak_list(output: &str) -> Vec<FlatpakRow> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim_end();
            if line.trim().is_empty() {
                return None;
            }

            let (columns, joined_name): (Vec<&str>, Option<String>) = if line.contains('\t') {
                (line.split('\t').map(str::trim).collect(), None)
            } else {
                let mut parts = line.split_whitespace();
                let columns: Vec<&str> = parts.by_ref().take(3).collect();
                let rest = parts.collect::<Vec<_>>().join(" ");
                (columns, Some(rest).filter(|name| !name.is_empty()))
            };

            let application = columns.first().copied().unwrap_or_default();
            // Header rows and runtimes listed by older flatpak versions.
            if application.eq_ignore_ascii_case("application id")
                || application.eq_ignore_ascii_case("application")
                || !application.contains('.')
            {
                log::debug!("Skipping flatpak row {:?}", line);
                return None;
            }

            let column = |index: usize| {
                columns
                    .get(index)
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            };

            Some(FlatpakRow {
                application: application.to_string(),
                origin: column(1),
                version: column(2),
                name: column(3).or(joined_name),
            })
        })
        .collect()
}

pub fn scan_flatpak(
    runner: &dyn CommandRunner,
    export_dirs: &[PathBuf],
) -> Result<Vec<AppRecord>, ScanError> {
    let args = [
        "list",
        "--app",
        "--columns=application,origin,version,name",
    ];
    let result = runner.run(FLATPAK, &args)?;
    if !result.success() {
        return Err(ScanError::command_failed(FLATPAK, &result));
    }

    let mut records: Vec<AppRecord> = parse_flatpak_list(&result.stdout)
        .into_iter()
        .map(|row| flatpak_record(row, export_dirs))
        .collect();
    records.sort_by(|a, b| {
        a.name_lower
            .cmp(&b.name_lower)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    records.dedup_by(|a, b| a.identifier == b.identifier);

    log::info!("flatpak: {} applications", records.len());
    Ok(records)
}

fn flatpak_record(row: FlatpakRow, export_dirs: &[PathBuf]) -> AppRecord {
    let entry = export_dirs
        .iter()
        .map(|dir| dir.join(format!("{}.desktop", row.application)))
        .find_map(|path| read_desktop_entry(&path));

    let name = entry
        .as_ref()
        .map(|entry| entry.name.clone())
        .or(row.name)
        .unwrap_or_else(|| row.application.clone());

    let mut record = AppRecord::new(
        name,
        row.application.clone(),
        PackageSource::Flatpak,
        AppKind::NotApplicable,
        vec![FLATPAK.to_string(), "run".to_string(), row.application],
    );
    record.version = row.version;
    record.origin = row.origin;
    if let Some(entry) = entry {
        // Exported icons are named after the app id.
        record.icon = entry.icon.or_else(|| Some(record.identifier.clone()));
        record.desktop_file = Some(entry.path);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixtureDir, StubRunner, fixture_dir};

    #[test]
    fn parses_tab_separated_columns() {
        let output = "org.gimp.GIMP\tflathub\t2.10.36\tGNU Image Manipulation Program\n\
                      com.spotify.Client\tflathub\t\tSpotify\n";
        let rows = parse_flatpak_list(output);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].application, "org.gimp.GIMP");
        assert_eq!(rows[0].origin.as_deref(), Some("flathub"));
        assert_eq!(rows[0].version.as_deref(), Some("2.10.36"));
        assert_eq!(rows[0].name.as_deref(), Some("GNU Image Manipulation Program"));
        assert_eq!(rows[1].version, None);
    }

    #[test]
    fn falls_back_to_whitespace_columns() {
        let output = "Application ID   Origin   Version   Name\n\
                      org.gnome.Maps   flathub  45.1      GNOME Maps\n\
                      runtime\n";
        let rows = parse_flatpak_list(output);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].application, "org.gnome.Maps");
        assert_eq!(rows[0].name.as_deref(), Some("GNOME Maps"));
    }

    #[test]
    fn id_only_output_is_enough() {
        let rows = parse_flatpak_list("org.gimp.GIMP\n");
        assert_eq!(rows[0].application, "org.gimp.GIMP");
        assert!(rows[0].origin.is_none());
        assert!(rows[0].name.is_none());
    }

    #[test]
    fn missing_tool_is_unavailable() {
        let runner = StubRunner::new().with_missing(FLATPAK);
        let err = scan_flatpak(&runner, &[]).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn non_zero_exit_is_reported() {
        let runner = StubRunner::new().with_failure(FLATPAK, 1, "error: no installations");
        let err = scan_flatpak(&runner, &[]).unwrap_err();
        assert!(matches!(err, ScanError::CommandFailed { .. }));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn records_are_enriched_from_exports() {
        let dir = fixture_dir();
        dir.write(
            "org.gimp.GIMP.desktop",
            "[Desktop Entry]\nType=Application\nName=GIMP\nExec=/usr/bin/flatpak run --branch=stable org.gimp.GIMP @@ %U @@\nIcon=org.gimp.GIMP\n",
        );
        let runner = StubRunner::new().with_output(
            FLATPAK,
            0,
            "org.gimp.GIMP\tflathub\t2.10.36\tGNU Image Manipulation Program\n\
             com.valvesoftware.Steam\tflathub\t1.0.0.78\tSteam\n",
        );

        let records = scan_flatpak(&runner, &[dir.path().to_path_buf()]).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["GIMP", "Steam"]);

        let gimp = &records[0];
        assert_eq!(gimp.kind, AppKind::NotApplicable);
        assert_eq!(gimp.launch, vec!["flatpak", "run", "org.gimp.GIMP"]);
        assert_eq!(gimp.icon.as_deref(), Some("org.gimp.GIMP"));
        assert_eq!(gimp.label(), "GIMP [flathub]");
        assert!(records[1].icon.is_none());

        assert_eq!(
            runner.calls(),
            vec![vec![
                "flatpak".to_string(),
                "list".to_string(),
                "--app".to_string(),
                "--columns=application,origin,version,name".to_string(),
            ]]
        );
    }
}
