use std::path::Path;

use chrono::{DateTime, Utc};
use gtk4 as gtk;
use libadwaita::prelude::*;

use crate::types::{AppKind, AppRecord};

const FALLBACK_APP_ICON: &str = "application-x-executable";
const FALLBACK_CLI_ICON: &str = "utilities-terminal";

pub(crate) fn clear_listbox(list: &gtk::ListBox) {
    while let Some(child) = list.first_child() {
        list.remove(&child);
    }
}

/// Icon for a record: absolute paths load from disk, anything else is a theme name.
pub(crate) fn record_icon(record: &AppRecord, pixel_size: i32) -> gtk::Image {
    let image = match icon_source(record) {
        IconSource::File(path) => gtk::Image::from_file(path),
        IconSource::Themed(name) => gtk::Image::from_icon_name(name),
    };
    image.set_pixel_size(pixel_size);
    image
}

pub(crate) fn set_record_icon(image: &gtk::Image, record: &AppRecord) {
    match icon_source(record) {
        IconSource::File(path) => image.set_from_file(Some(path)),
        IconSource::Themed(name) => image.set_icon_name(Some(name)),
    }
}

#[derive(Debug, Eq, PartialEq)]
enum IconSource<'a> {
    File(&'a Path),
    Themed(&'a str),
}

fn icon_source(record: &AppRecord) -> IconSource<'_> {
    match record.icon.as_deref().filter(|icon| !icon.is_empty()) {
        Some(icon) if icon.starts_with('/') && Path::new(icon).is_file() => {
            IconSource::File(Path::new(icon))
        }
        Some(icon) if !icon.starts_with('/') => IconSource::Themed(icon),
        _ if record.kind == AppKind::Cli => IconSource::Themed(FALLBACK_CLI_ICON),
        _ => IconSource::Themed(FALLBACK_APP_ICON),
    }
}

pub(crate) fn format_relative_time(timestamp: DateTime<Utc>) -> String {
    relative_time_between(timestamp, Utc::now())
}

fn relative_time_between(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(timestamp);

    if delta.num_minutes() < 1 {
        return "just now".to_string();
    }

    if delta.num_hours() < 1 {
        let minutes = delta.num_minutes();
        return format!(
            "{} minute{} ago",
            minutes,
            if minutes == 1 { "" } else { "s" }
        );
    }

    if delta.num_hours() < 24 {
        let hours = delta.num_hours();
        return format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" });
    }

    let days = delta.num_days();
    format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
}

pub(crate) fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", count, if count == 1 { singular } else { plural })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackageSource;
    use chrono::Duration;

    fn record(kind: AppKind, icon: Option<&str>) -> AppRecord {
        let mut record = AppRecord::new("x".into(), "x".into(), PackageSource::Apt, kind, vec!["x".into()]);
        record.icon = icon.map(str::to_string);
        record
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(relative_time_between(now, now), "just now");
        assert_eq!(relative_time_between(now - Duration::seconds(30), now), "just now");
        assert_eq!(relative_time_between(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_time_between(now - Duration::minutes(45), now), "45 minutes ago");
        assert_eq!(relative_time_between(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(relative_time_between(now - Duration::days(2), now), "2 days ago");
    }

    #[test]
    fn icons_fall_back_by_kind() {
        assert_eq!(icon_source(&record(AppKind::Desktop, Some("firefox"))), IconSource::Themed("firefox"));
        assert_eq!(icon_source(&record(AppKind::Cli, None)), IconSource::Themed(FALLBACK_CLI_ICON));
        assert_eq!(
            icon_source(&record(AppKind::Desktop, Some("/nonexistent/icon.png"))),
            IconSource::Themed(FALLBACK_APP_ICON)
        );
    }

    #[test]
    fn plural_picks_form() {
        assert_eq!(plural(1, "app", "apps"), "1 app");
        assert_eq!(plural(0, "app", "apps"), "0 apps");
    }
}
