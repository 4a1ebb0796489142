use std::collections::HashMap;
use std::sync::mpsc;

use crate::catalog::{Catalog, Tab, record_matches};
use crate::types::{AppRecord, CommandResult, PackageSource};

#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) catalog: Catalog,
    pub(crate) filter: String,
    pub(crate) active_tab: Tab,
    /// Per tab, indices into `catalog.records` in row order.
    pub(crate) visible: HashMap<Tab, Vec<usize>>,
    pub(crate) selected: Option<RecordKey>,
    /// Set while list rows are recreated, so selection signals are ignored.
    pub(crate) rebuilding_lists: bool,
    pub(crate) refresh_in_progress: bool,
    pub(crate) remove_in_progress: bool,
    pub(crate) confirm_remove: bool,
    pub(crate) terminal: String,
    pub(crate) status_message: Option<String>,
}

/// Identity of a record across refreshes.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct RecordKey {
    pub(crate) source: PackageSource,
    pub(crate) identifier: String,
}

impl RecordKey {
    pub(crate) fn of(record: &AppRecord) -> Self {
        Self {
            source: record.source,
            identifier: record.identifier.clone(),
        }
    }
}

impl AppState {
    /// Recompute the visible rows of every tab from the catalog and filter.
    pub(crate) fn apply_filter(&mut self) {
        let needle = self.filter.trim().to_lowercase();
        let records = &self.catalog.records;
        self.visible = Tab::ALL
            .into_iter()
            .map(|tab| {
                let rows = records
                    .iter()
                    .enumerate()
                    .filter(|(_, record)| tab.contains(record) && record_matches(record, &needle))
                    .map(|(idx, _)| idx)
                    .collect();
                (tab, rows)
            })
            .collect();
    }

    pub(crate) fn visible_rows(&self, tab: Tab) -> &[usize] {
        self.visible.get(&tab).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn record_at(&self, tab: Tab, row: usize) -> Option<&AppRecord> {
        self.visible_rows(tab)
            .get(row)
            .and_then(|idx| self.catalog.records.get(*idx))
    }

    pub(crate) fn row_of(&self, tab: Tab, key: &RecordKey) -> Option<usize> {
        self.visible_rows(tab).iter().position(|idx| {
            self.catalog
                .records
                .get(*idx)
                .is_some_and(|record| RecordKey::of(record) == *key)
        })
    }

    pub(crate) fn selected_record(&self) -> Option<&AppRecord> {
        let key = self.selected.as_ref()?;
        self.catalog.find(key.source, &key.identifier)
    }

    /// Returns false when a scan is already running.
    pub(crate) fn begin_refresh(&mut self) -> bool {
        if self.refresh_in_progress {
            return false;
        }
        self.refresh_in_progress = true;
        true
    }

    /// Swap in a freshly scanned catalog and hand back its warnings.
    pub(crate) fn finish_refresh(&mut self, catalog: Catalog) -> Vec<String> {
        self.refresh_in_progress = false;
        self.catalog = catalog;
        if self.selected_record().is_none() {
            self.selected = None;
        }
        self.apply_filter();
        self.catalog.warnings.clone()
    }

    /// Returns false when a removal is already running.
    pub(crate) fn begin_remove(&mut self) -> bool {
        if self.remove_in_progress {
            return false;
        }
        self.remove_in_progress = true;
        true
    }

    pub(crate) fn finish_remove(&mut self) {
        self.remove_in_progress = false;
    }
}

pub(crate) enum AppMessage {
    ScanFinished {
        catalog: Catalog,
    },
    RemoveFinished {
        name: String,
        result: Result<CommandResult, String>,
    },
}

/// Feed every queued worker message to `handle`. Returns how many were handled.
pub(crate) fn drain_messages(
    receiver: &mpsc::Receiver<AppMessage>,
    mut handle: impl FnMut(AppMessage),
) -> usize {
    let mut handled = 0;
    while let Ok(msg) = receiver.try_recv() {
        handle(msg);
        handled += 1;
    }
    handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppKind;

    fn state() -> AppState {
        let records = vec![
            AppRecord::new("Firefox".into(), "firefox".into(), PackageSource::Apt, AppKind::Desktop, vec!["firefox".into()]),
            AppRecord::new("vim".into(), "vim".into(), PackageSource::Apt, AppKind::Cli, vec!["vim".into()]),
            AppRecord::new("firefox".into(), "firefox".into(), PackageSource::Snap, AppKind::NotApplicable, vec!["snap".into()]),
        ];
        let mut state = AppState {
            catalog: Catalog::new(records, None, Vec::new()),
            ..AppState::default()
        };
        state.apply_filter();
        state
    }

    #[test]
    fn rows_map_back_to_records() {
        let mut state = state();
        assert_eq!(state.visible_rows(Tab::Desktop), &[0]);
        assert_eq!(state.visible_rows(Tab::Snap), &[2]);
        assert_eq!(state.record_at(Tab::Cli, 0).map(|r| r.name.as_str()), Some("vim"));

        state.filter = "FIRE".into();
        state.apply_filter();
        assert!(state.visible_rows(Tab::Cli).is_empty());
        assert_eq!(state.visible_rows(Tab::Snap), &[2]);
    }

    #[test]
    fn selection_survives_by_key() {
        let mut state = state();
        let snap_firefox = RecordKey {
            source: PackageSource::Snap,
            identifier: "firefox".into(),
        };
        state.selected = Some(snap_firefox.clone());
        assert_eq!(state.row_of(Tab::Snap, &snap_firefox), Some(0));
        assert_eq!(state.row_of(Tab::Desktop, &snap_firefox), None);
        assert_eq!(state.selected_record().map(|r| r.source), Some(PackageSource::Snap));
    }

    #[test]
    fn refresh_is_ignored_while_one_is_running() {
        let mut state = AppState::default();
        assert!(state.begin_refresh());
        assert!(!state.begin_refresh());
        state.finish_refresh(Catalog::default());
        assert!(!state.refresh_in_progress);
        assert!(state.begin_refresh());
    }

    #[test]
    fn finished_scan_replaces_catalog_and_drops_stale_selection() {
        let mut state = state();
        state.filter = "vim".into();
        state.selected = Some(RecordKey {
            source: PackageSource::Apt,
            identifier: "firefox".into(),
        });
        assert!(state.begin_refresh());

        let records = vec![AppRecord::new(
            "vim".into(),
            "vim".into(),
            PackageSource::Apt,
            AppKind::Cli,
            vec!["vim".into()],
        )];
        let warnings = state.finish_refresh(Catalog::new(
            records,
            None,
            vec!["Snap: snap list exited with status 1".into()],
        ));

        assert!(!state.refresh_in_progress);
        assert_eq!(warnings, vec!["Snap: snap list exited with status 1"]);
        assert_eq!(state.catalog.records.len(), 1);
        assert!(state.selected.is_none());
        assert_eq!(state.visible_rows(Tab::Cli), &[0]);
        assert!(state.visible_rows(Tab::Desktop).is_empty());
    }

    #[test]
    fn removal_flag_blocks_a_second_removal() {
        let mut state = AppState::default();
        assert!(state.begin_remove());
        assert!(!state.begin_remove());
        state.finish_remove();
        assert!(state.begin_remove());
    }

    #[test]
    fn queued_worker_messages_are_all_delivered() {
        let (sender, receiver) = mpsc::channel();
        sender
            .send(AppMessage::ScanFinished {
                catalog: Catalog::default(),
            })
            .unwrap();
        sender
            .send(AppMessage::RemoveFinished {
                name: "vim".into(),
                result: Err("denied".into()),
            })
            .unwrap();

        let mut state = AppState::default();
        assert!(state.begin_refresh());
        let mut removed = Vec::new();
        let handled = drain_messages(&receiver, |msg| match msg {
            AppMessage::ScanFinished { catalog } => {
                state.finish_refresh(catalog);
            }
            AppMessage::RemoveFinished { name, .. } => removed.push(name),
        });

        assert_eq!(handled, 2);
        assert!(!state.refresh_in_progress);
        assert_eq!(removed, vec!["vim"]);
        assert_eq!(drain_messages(&receiver, |_| {}), 0);
    }
}
