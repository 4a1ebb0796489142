use chrono::{DateTime, Utc};

use crate::types::{AppKind, AppRecord, PackageSource};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Tab {
    #[default]
    Desktop,
    Cli,
    Flatpak,
    Snap,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Desktop, Tab::Cli, Tab::Flatpak, Tab::Snap];

    pub fn key(self) -> &'static str {
        match self {
            Tab::Desktop => "desktop",
            Tab::Cli => "cli",
            Tab::Flatpak => "flatpak",
            Tab::Snap => "snap",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Desktop => "Desktop",
            Tab::Cli => "CLI",
            Tab::Flatpak => "Flatpak",
            Tab::Snap => "Snap",
        }
    }

    pub fn icon_name(self) -> &'static str {
        match self {
            Tab::Desktop => "computer-symbolic",
            Tab::Cli => "utilities-terminal-symbolic",
            Tab::Flatpak => "package-x-generic-symbolic",
            Tab::Snap => "application-x-addon-symbolic",
        }
    }

    pub fn from_key(value: &str) -> Option<Self> {
        Tab::ALL.into_iter().find(|tab| tab.key() == value)
    }

    pub fn contains(self, record: &AppRecord) -> bool {
        match self {
            Tab::Desktop => record.source == PackageSource::Apt && record.kind == AppKind::Desktop,
            Tab::Cli => record.source == PackageSource::Apt && record.kind == AppKind::Cli,
            Tab::Flatpak => record.source == PackageSource::Flatpak,
            Tab::Snap => record.source == PackageSource::Snap,
        }
    }
}

/// Everything one refresh found. Replaced wholesale by the next refresh.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub records: Vec<AppRecord>,
    pub scanned_at: Option<DateTime<Utc>>,
    pub warnings: Vec<String>,
}

impl Catalog {
    pub fn new(
        records: Vec<AppRecord>,
        scanned_at: Option<DateTime<Utc>>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            records,
            scanned_at,
            warnings,
        }
    }

    pub fn tab(&self, tab: Tab) -> impl Iterator<Item = &AppRecord> {
        self.records.iter().filter(move |record| tab.contains(record))
    }

    pub fn count(&self, tab: Tab) -> usize {
        self.tab(tab).count()
    }

    pub fn filtered(&self, tab: Tab, query: &str) -> Vec<&AppRecord> {
        filter_records(self.tab(tab), query)
    }

    pub fn find(&self, source: PackageSource, identifier: &str) -> Option<&AppRecord> {
        self.records
            .iter()
            .find(|record| record.source == source && record.identifier == identifier)
    }

    /// `Desktop: N | CLI: N | Flatpak: N | Snap: N`
    pub fn summary(&self) -> String {
        Tab::ALL
            .iter()
            .map(|tab| format!("{}: {}", tab.title(), self.count(*tab)))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Case-insensitive substring match on the display name.
pub fn record_matches(record: &AppRecord, needle_lower: &str) -> bool {
    needle_lower.is_empty() || record.name_lower.contains(needle_lower)
}

pub fn filter_records<'a, I>(records: I, query: &str) -> Vec<&'a AppRecord>
where
    I: IntoIterator<Item = &'a AppRecord>,
{
    let needle = query.trim().to_lowercase();
    records
        .into_iter()
        .filter(|record| record_matches(record, &needle))
        .collect()
}
