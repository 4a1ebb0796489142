use std::rc::Rc;
use std::thread;

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::glib;

use crate::catalog::{Catalog, Tab};
use crate::helpers::{clear_listbox, format_relative_time, plural, record_icon, set_record_icon};
use crate::scan::{ScanConfig, scan_all};
use crate::state::controller::AppController;
use crate::state::types::{AppMessage, RecordKey};
use crate::types::{AppKind, AppRecord};

impl AppController {
    /// Rescan every source off the main loop. Ignored while a scan is running.
    pub(crate) fn refresh_catalog(self: &Rc<Self>) {
        if !self.state.borrow_mut().begin_refresh() {
            log::debug!("Refresh already in progress");
            return;
        }

        self.set_status_message(Some("Scanning installed applications…".to_string()));
        self.update_busy_ui();

        let config = ScanConfig::from_settings(&self.settings.borrow());
        let runner = self.runner.clone();
        let sender = self.sender.clone();
        thread::spawn(move || {
            let catalog = scan_all(&config, runner.as_ref());
            let _ = sender.send(AppMessage::ScanFinished { catalog });
        });
    }

    pub(crate) fn finish_refresh(self: &Rc<Self>, catalog: Catalog) {
        let warnings = self.state.borrow_mut().finish_refresh(catalog);
        log::info!("Catalog refreshed: {}", self.state.borrow().catalog.summary());

        self.set_status_message(None);
        self.update_busy_ui();
        self.rebuild_lists();

        if let Some(first) = warnings.first() {
            let more = warnings.len() - 1;
            let message = if more == 0 {
                first.clone()
            } else {
                format!("{} (and {} more)", first, more)
            };
            self.show_toast(&message);
        }
    }

    pub(crate) fn on_search_changed(self: &Rc<Self>, query: String) {
        {
            let mut state = self.state.borrow_mut();
            if state.filter == query {
                return;
            }
            state.filter = query;
        }
        self.rebuild_lists();
    }

    /// Rebuild every tab's rows from the catalog and the current filter.
    pub(crate) fn rebuild_lists(self: &Rc<Self>) {
        {
            let mut state = self.state.borrow_mut();
            state.apply_filter();
            state.rebuilding_lists = true;
        }

        for tab in Tab::ALL {
            self.rebuild_tab_list(tab);
        }

        self.state.borrow_mut().rebuilding_lists = false;
        self.update_tab_titles();
        self.update_summary();
        self.sync_selection_from_list(self.active_tab());
    }

    fn rebuild_tab_list(&self, tab: Tab) {
        let Some(page) = self.widgets.page(tab) else {
            return;
        };
        let list = &page.widgets.list;
        clear_listbox(list);

        let selected_row = {
            let state = self.state.borrow();
            let rows = state.visible_rows(tab);
            for idx in rows {
                if let Some(record) = state.catalog.records.get(*idx) {
                    list.append(&build_record_row(record));
                }
            }

            if !rows.is_empty() {
                page.widgets.show_list();
            } else if state.refresh_in_progress && state.catalog.records.is_empty() {
                page.widgets
                    .show_empty("Scanning…", "Looking for installed applications.");
            } else if state.catalog.count(tab) == 0 {
                page.widgets.show_empty(
                    &format!("No {} Applications", tab.title()),
                    empty_tab_description(tab),
                );
            } else {
                page.widgets.show_empty(
                    "No Matches",
                    &format!("Nothing in {} matches \"{}\".", tab.title(), state.filter.trim()),
                );
            }

            state
                .selected
                .as_ref()
                .and_then(|key| state.row_of(tab, key))
        };

        if let Some(row) = selected_row.and_then(|row| list.row_at_index(row as i32)) {
            list.select_row(Some(&row));
        }
    }

    fn update_tab_titles(&self) {
        let state = self.state.borrow();
        for tab in Tab::ALL {
            if let Some(page) = self.widgets.page(tab) {
                let shown = state.visible_rows(tab).len();
                page.page
                    .set_title(Some(&format!("{} ({})", tab.title(), shown)));
            }
        }
    }

    pub(crate) fn on_row_selected(self: &Rc<Self>, tab: Tab, row: Option<i32>) {
        if tab != self.active_tab() || self.state.borrow().rebuilding_lists {
            return;
        }
        let key = {
            let state = self.state.borrow();
            row.and_then(|row| usize::try_from(row).ok())
                .and_then(|row| state.record_at(tab, row))
                .map(RecordKey::of)
        };
        self.state.borrow_mut().selected = key;
        self.update_detail();
    }

    pub(crate) fn on_row_activated(self: &Rc<Self>, tab: Tab, row: i32) {
        self.on_row_selected(tab, Some(row));
        self.on_launch_selected();
    }

    /// Make the detail pane follow whatever row is selected in `tab`.
    pub(crate) fn sync_selection_from_list(self: &Rc<Self>, tab: Tab) {
        let row = self
            .widgets
            .page(tab)
            .and_then(|page| page.widgets.list.selected_row())
            .map(|row| row.index());
        self.on_row_selected(tab, row);
    }

    pub(crate) fn update_detail(&self) {
        let detail = &self.widgets.detail;
        let state = self.state.borrow();
        let Some(record) = state.selected_record() else {
            detail.stack.set_visible_child_name("placeholder");
            return;
        };

        set_record_icon(&detail.icon, record);
        detail.name.set_text(&record.name);
        detail.source_tag.set_text(record.source.description());
        detail.kind_tag.set_text(record.kind.label());
        detail.kind_tag.set_visible(record.kind != AppKind::NotApplicable);
        detail.identifier_value.set_text(&record.identifier);
        detail
            .version_value
            .set_text(record.version.as_deref().unwrap_or("—"));

        match record.origin.as_deref() {
            Some(origin) => {
                detail.origin_value.set_text(origin);
                detail.origin_row.set_visible(true);
            }
            None => detail.origin_row.set_visible(false),
        }

        let command = if record.terminal {
            format!("{}  (in terminal)", record.launch_display())
        } else {
            record.launch_display()
        };
        detail.command_value.set_text(&command);

        match record.desktop_file.as_deref() {
            Some(path) => {
                detail.desktop_file_value.set_text(&path.display().to_string());
                detail.desktop_file_row.set_visible(true);
            }
            None => detail.desktop_file_row.set_visible(false),
        }

        let note = if !record.removable {
            Some("Not installed by a package manager; remove its desktop entry by hand.")
        } else if record.kind == AppKind::Cli {
            Some("No desktop entry found; launching runs the package name in a terminal.")
        } else {
            None
        };
        detail.note_label.set_visible(note.is_some());
        detail.note_label.set_text(note.unwrap_or_default());

        detail.launch_button.set_sensitive(record.can_launch());
        detail
            .remove_button
            .set_sensitive(record.removable && !state.remove_in_progress);
        detail.stack.set_visible_child_name("detail");
    }

    pub(crate) fn set_status_message(&self, message: Option<String>) {
        self.state.borrow_mut().status_message = message;
        self.update_summary();
    }

    pub(crate) fn update_summary(&self) {
        let state = self.state.borrow();
        let text = match &state.status_message {
            Some(message) => message.clone(),
            None => {
                let summary = state.catalog.summary();
                let query = state.filter.trim();
                if query.is_empty() {
                    summary
                } else {
                    let shown: usize = Tab::ALL
                        .iter()
                        .map(|tab| state.visible_rows(*tab).len())
                        .sum();
                    format!(
                        "{}  ·  {} matching \"{}\"",
                        summary,
                        plural(shown, "app", "apps"),
                        query
                    )
                }
            }
        };
        self.widgets.status_label.set_text(&text);

        let footer = match state.catalog.scanned_at {
            Some(at) => format!("Last refreshed {}", format_relative_time(at)),
            None => "Last refreshed —".to_string(),
        };
        self.widgets.footer_label.set_text(&footer);
    }

    pub(crate) fn update_busy_ui(&self) {
        let (refreshing, removing) = {
            let state = self.state.borrow();
            (state.refresh_in_progress, state.remove_in_progress)
        };
        let busy = refreshing || removing;
        self.widgets.spinner.set_visible(busy);
        if busy {
            self.widgets.spinner.start();
        } else {
            self.widgets.spinner.stop();
        }
        self.widgets.refresh_button.set_sensitive(!refreshing);
        if let Some(action) = self.app.lookup_action("refresh") {
            if let Ok(action) = action.downcast::<gtk::gio::SimpleAction>() {
                action.set_enabled(!refreshing);
            }
        }
        self.update_detail();
    }
}

fn empty_tab_description(tab: Tab) -> &'static str {
    match tab {
        Tab::Desktop => "No packaged desktop applications were found.",
        Tab::Cli => "No command-line packages were found.",
        Tab::Flatpak => "Flatpak is not installed, or no Flatpak apps are installed.",
        Tab::Snap => "Snap is not installed, or no snaps are installed.",
    }
}

fn build_record_row(record: &AppRecord) -> adw::ActionRow {
    let title = glib::markup_escape_text(&record.label());
    let subtitle = match record.version.as_deref() {
        Some(version) => format!("{}  ·  {}", record.identifier, version),
        None => record.identifier.clone(),
    };

    let row = adw::ActionRow::builder()
        .title(title.as_str())
        .subtitle(glib::markup_escape_text(&subtitle).as_str())
        .activatable(true)
        .build();
    row.set_title_lines(1);
    row.set_subtitle_lines(1);
    row.set_tooltip_text(Some(&record.launch_display()));

    let icon = record_icon(record, 32);
    icon.set_margin_end(6);
    icon.set_valign(gtk::Align::Center);
    row.add_prefix(&icon);

    if record.terminal {
        let badge = gtk::Label::new(Some("Terminal"));
        badge.add_css_class("dim-label");
        badge.add_css_class("caption");
        row.add_suffix(&badge);
    }

    row
}
