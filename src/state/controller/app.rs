use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, mpsc};

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::glib::Propagation;
use gtk::pango;

use crate::catalog::Tab;
use crate::process::CommandRunner;
use crate::settings::{AppSettings, save_app_settings};
use crate::state::types::{AppMessage, AppState};
use crate::ui::AppWidgets;

pub(crate) struct AppController {
    pub(crate) widgets: AppWidgets,
    pub(crate) state: RefCell<AppState>,
    pub(crate) sender: mpsc::Sender<AppMessage>,
    pub(crate) app: adw::Application,
    pub(crate) window: adw::ApplicationWindow,
    pub(crate) settings: Rc<RefCell<AppSettings>>,
    pub(crate) runner: Arc<dyn CommandRunner>,
    pub(crate) about_dialog: RefCell<Option<gtk::Dialog>>,
}

impl AppController {
    pub(crate) fn new(
        widgets: AppWidgets,
        sender: mpsc::Sender<AppMessage>,
        app: adw::Application,
        window: adw::ApplicationWindow,
        settings: Rc<RefCell<AppSettings>>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let mut state = AppState::default();
        {
            let settings_ref = settings.borrow();
            state.confirm_remove = settings_ref.confirm_remove;
            state.terminal = settings_ref.terminal_command().to_string();
        }

        Self {
            widgets,
            state: RefCell::new(state),
            sender,
            app,
            window,
            settings,
            runner,
            about_dialog: RefCell::new(None),
        }
    }

    pub(crate) fn setup_connections(self: &Rc<Self>) {
        {
            let weak_self = Rc::downgrade(self);
            self.widgets
                .search_entry
                .connect_search_changed(move |entry| {
                    if let Some(controller) = weak_self.upgrade() {
                        controller.on_search_changed(entry.text().to_string());
                    }
                });
        }

        for (tab, page) in &self.widgets.pages {
            let tab = *tab;
            {
                let weak_self = Rc::downgrade(self);
                page.widgets.list.connect_row_selected(move |_, row| {
                    if let Some(controller) = weak_self.upgrade() {
                        controller.on_row_selected(tab, row.map(|r| r.index()));
                    }
                });
            }
            {
                let weak_self = Rc::downgrade(self);
                page.widgets.list.connect_row_activated(move |_, row| {
                    if let Some(controller) = weak_self.upgrade() {
                        controller.on_row_activated(tab, row.index());
                    }
                });
            }
        }

        {
            let weak_self = Rc::downgrade(self);
            self.widgets.detail.launch_button.connect_clicked(move |_| {
                if let Some(controller) = weak_self.upgrade() {
                    controller.on_launch_selected();
                }
            });
        }

        {
            let weak_self = Rc::downgrade(self);
            self.widgets.detail.remove_button.connect_clicked(move |_| {
                if let Some(controller) = weak_self.upgrade() {
                    controller.on_remove_selected();
                }
            });
        }

        {
            let weak_self = Rc::downgrade(self);
            self.widgets
                .confirm_remove_row
                .connect_active_notify(move |row| {
                    if let Some(controller) = weak_self.upgrade() {
                        controller.set_confirm_remove(row.is_active(), true);
                    }
                });
        }

        let weak_self = Rc::downgrade(self);
        self.widgets
            .view_stack
            .connect_visible_child_name_notify(move |_| {
                if let Some(controller) = weak_self.upgrade() {
                    controller.on_view_changed();
                }
            });

        self.rebuild_lists();
    }

    pub(crate) fn persist_settings(&self) {
        if let Err(err) = save_app_settings(&self.settings.borrow()) {
            log::warn!("Failed to save settings: {:#}", err);
        }
    }

    pub(crate) fn restore_last_tab(&self) {
        let tab = self
            .settings
            .borrow()
            .last_tab
            .as_deref()
            .and_then(Tab::from_key)
            .unwrap_or_default();
        self.state.borrow_mut().active_tab = tab;
        if self.widgets.view_stack.visible_child_name().as_deref() != Some(tab.key()) {
            self.widgets.view_stack.set_visible_child_name(tab.key());
        }
    }

    pub(crate) fn active_tab(&self) -> Tab {
        self.widgets
            .view_stack
            .visible_child_name()
            .as_deref()
            .and_then(Tab::from_key)
            .unwrap_or_default()
    }

    pub(crate) fn on_view_changed(self: &Rc<Self>) {
        let tab = self.active_tab();
        {
            let mut state = self.state.borrow_mut();
            if state.active_tab == tab {
                return;
            }
            state.active_tab = tab;
        }
        self.sync_selection_from_list(tab);
    }

    pub(crate) fn save_window_state(&self, width: i32, height: i32) {
        {
            let mut data = self.settings.borrow_mut();
            if width > 0 && height > 0 {
                data.window_width = Some(width);
                data.window_height = Some(height);
            }
            data.last_tab = Some(self.active_tab().key().to_string());
        }
        self.persist_settings();
    }

    pub(crate) fn focus_search(&self) {
        self.window.present();
        self.widgets.search_entry.grab_focus();
        self.widgets.search_entry.select_region(0, -1);
    }

    pub(crate) fn set_confirm_remove(&self, enabled: bool, persist: bool) {
        {
            let mut state = self.state.borrow_mut();
            state.confirm_remove = enabled;
        }
        if persist {
            {
                let mut settings = self.settings.borrow_mut();
                settings.confirm_remove = enabled;
            }
            self.persist_settings();
        }
    }

    pub(crate) fn confirm_action<F>(
        self: &Rc<Self>,
        heading: &str,
        body: &str,
        confirm_label: &str,
        on_confirm: F,
    ) where
        F: FnOnce(&Rc<Self>) + 'static,
    {
        let dialog = gtk::MessageDialog::builder()
            .text(heading)
            .secondary_text(body)
            .message_type(gtk::MessageType::Question)
            .modal(true)
            .build();
        dialog.set_transient_for(Some(&self.window));
        dialog.add_button("Cancel", gtk::ResponseType::Cancel);
        dialog.add_button(confirm_label, gtk::ResponseType::Accept);
        dialog.set_default_response(gtk::ResponseType::Cancel);
        if let Some(button) = dialog.widget_for_response(gtk::ResponseType::Accept) {
            button.add_css_class("destructive-action");
        }
        let controller_weak = Rc::downgrade(self);
        let callback = Rc::new(RefCell::new(Some(on_confirm)));
        dialog.connect_response(move |dlg, response| {
            dlg.close();
            if response != gtk::ResponseType::Accept {
                return;
            }
            if let Some(controller) = controller_weak.upgrade() {
                if let Some(callback) = callback.borrow_mut().take() {
                    callback(&controller);
                }
            }
        });
        dialog.present();
    }

    pub(crate) fn handle_message(self: &Rc<Self>, msg: AppMessage) {
        match msg {
            AppMessage::ScanFinished { catalog } => {
                self.finish_refresh(catalog);
            }
            AppMessage::RemoveFinished { name, result } => {
                self.finish_remove(name, result);
            }
        }
    }

    pub(crate) fn show_toast(&self, message: &str) {
        let toast = adw::Toast::builder().title(message).timeout(5).build();
        self.widgets.toast_overlay.add_toast(toast);
    }

    pub(crate) fn show_error_dialog(&self, title: &str, message: &str) {
        let dialog = gtk::MessageDialog::builder()
            .transient_for(&self.window)
            .modal(true)
            .message_type(gtk::MessageType::Error)
            .text(title)
            .secondary_text(message)
            .build();
        dialog.add_button("Close", gtk::ResponseType::Close);
        dialog.connect_response(|dlg, _| dlg.close());
        dialog.present();
    }

    pub(crate) fn show_about_dialog(self: &Rc<Self>) {
        if let Some(existing) = self.about_dialog.borrow().as_ref() {
            existing.present();
            return;
        }

        let version = env!("CARGO_PKG_VERSION");
        let dialog = gtk::Dialog::builder()
            .transient_for(&self.window)
            .modal(true)
            .title("About AppVault")
            .resizable(false)
            .build();
        dialog.set_application(Some(&self.app));

        let content = dialog.content_area();
        content.set_margin_start(24);
        content.set_margin_end(24);
        content.set_margin_top(20);
        content.set_margin_bottom(20);
        content.set_spacing(12);

        let title = gtk::Label::builder()
            .label("AppVault")
            .halign(gtk::Align::Start)
            .build();
        title.add_css_class("title-3");

        let version_label = gtk::Label::builder()
            .label(format!("Version {}", version))
            .halign(gtk::Align::Start)
            .build();
        version_label.add_css_class("dim-label");

        let description = gtk::Label::builder()
            .label(
                "AppVault lists the applications installed through APT, Flatpak and Snap, \
                 and lets you launch or remove them from one place.",
            )
            .wrap(true)
            .wrap_mode(pango::WrapMode::WordChar)
            .halign(gtk::Align::Start)
            .build();
        description.set_xalign(0.0);

        content.append(&title);
        content.append(&version_label);
        content.append(&description);

        dialog.add_button("Close", gtk::ResponseType::Close);
        dialog.connect_response(|dialog, _| dialog.close());

        {
            let controller = Rc::downgrade(self);
            dialog.connect_close_request(move |_| {
                if let Some(controller) = controller.upgrade() {
                    controller.about_dialog.replace(None);
                }
                Propagation::Proceed
            });
        }

        self.about_dialog.replace(Some(dialog.clone()));
        dialog.present();
    }
}
