use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use glib::{Variant, VariantTy};
use gtk::{gio, glib, pango};

use crate::catalog::Tab;
use crate::process::SystemRunner;
use crate::settings::{ThemePreference, load_app_settings, save_app_settings};
use crate::state::controller::AppController;
use crate::state::types::{AppMessage, drain_messages};
use crate::ui::{
    CatalogPageWidgets, DetailWidgets, apply_theme_css_class, build_catalog_page,
    build_detail_pane, build_theme_icon,
};

const MESSAGE_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub(crate) struct TabPage {
    pub(crate) page: adw::ViewStackPage,
    pub(crate) widgets: CatalogPageWidgets,
}

pub(crate) struct AppWidgets {
    pub(crate) toast_overlay: adw::ToastOverlay,
    pub(crate) view_stack: adw::ViewStack,
    pub(crate) search_entry: gtk::SearchEntry,
    pub(crate) pages: HashMap<Tab, TabPage>,
    pub(crate) detail: DetailWidgets,
    pub(crate) refresh_button: gtk::Button,
    pub(crate) spinner: gtk::Spinner,
    pub(crate) status_label: gtk::Label,
    pub(crate) footer_label: gtk::Label,
    pub(crate) confirm_remove_row: adw::SwitchRow,
}

impl AppWidgets {
    pub(crate) fn page(&self, tab: Tab) -> Option<&TabPage> {
        self.pages.get(&tab)
    }
}

pub(crate) fn build_ui(app: &adw::Application) {
    let settings = Rc::new(RefCell::new(load_app_settings()));
    let (initial_width, initial_height) = {
        let settings = settings.borrow();
        (
            settings.window_width.unwrap_or(1000),
            settings.window_height.unwrap_or(680),
        )
    };

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("AppVault")
        .default_width(initial_width)
        .default_height(initial_height)
        .build();
    window.add_css_class("appvault-window");

    let toast_overlay = adw::ToastOverlay::new();
    window.set_content(Some(&toast_overlay));

    let root_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
    toast_overlay.set_child(Some(&root_box));

    let view_stack = adw::ViewStack::new();
    view_stack.set_vexpand(true);
    view_stack.set_hexpand(true);

    let header_bar = adw::HeaderBar::new();
    header_bar.set_hexpand(true);
    let view_switcher = adw::ViewSwitcher::new();
    view_switcher.set_stack(Some(&view_stack));
    view_switcher.set_policy(adw::ViewSwitcherPolicy::Wide);
    header_bar.set_title_widget(Some(&view_switcher));
    root_box.append(&header_bar);

    let style_manager = adw::StyleManager::default();
    let stored_theme = settings.borrow().theme_preference;
    stored_theme.apply(&style_manager);
    apply_theme_css_class(&window, style_manager.is_dark());
    style_manager.connect_dark_notify(glib::clone!(
        #[weak]
        window,
        move |manager| {
            apply_theme_css_class(&window, manager.is_dark());
        },
    ));

    let theme_action = gio::SimpleAction::new_stateful(
        "theme",
        Some(&VariantTy::STRING),
        &Variant::from(stored_theme.key()),
    );
    theme_action.connect_change_state(glib::clone!(
        #[weak]
        style_manager,
        #[strong]
        settings,
        move |action, value| {
            let Some(value) = value else {
                return;
            };
            if let Some(theme) = value.str() {
                action.set_state(value);
                let preference = ThemePreference::from_key(theme);
                preference.apply(&style_manager);
                let mut data = settings.borrow_mut();
                data.theme_preference = preference;
                if let Err(err) = save_app_settings(&data) {
                    log::warn!("Failed to save settings: {:#}", err);
                }
            }
        },
    ));
    app.add_action(&theme_action);

    let refresh_action = gio::SimpleAction::new("refresh", None);
    app.add_action(&refresh_action);
    app.set_accels_for_action("app.refresh", &["F5", "<Control>r"]);

    let focus_search_action = gio::SimpleAction::new("focus-search", None);
    app.add_action(&focus_search_action);
    app.set_accels_for_action("app.focus-search", &["<Control>f"]);

    let about_action = gio::SimpleAction::new("about", None);
    app.add_action(&about_action);

    let refresh_header_button = gtk::Button::builder()
        .icon_name("view-refresh-symbolic")
        .tooltip_text("Rescan installed applications (F5)")
        .action_name("app.refresh")
        .build();
    header_bar.pack_start(&refresh_header_button);

    let menu_button = gtk::MenuButton::builder()
        .icon_name("open-menu-symbolic")
        .valign(gtk::Align::Center)
        .build();
    let popover = gtk::Popover::new();

    let popover_box = gtk::Box::builder()
        .orientation(gtk::Orientation::Vertical)
        .spacing(6)
        .margin_top(12)
        .margin_bottom(12)
        .margin_start(12)
        .margin_end(12)
        .build();

    let theme_box = gtk::Box::builder()
        .orientation(gtk::Orientation::Horizontal)
        .spacing(6)
        .build();
    let theme_buttons: Rc<Vec<(ThemePreference, gtk::Button)>> = Rc::new(
        [
            (ThemePreference::System, "Match system theme"),
            (ThemePreference::Light, "Use light theme"),
            (ThemePreference::Dark, "Use dark theme"),
        ]
        .into_iter()
        .map(|(theme, tooltip)| {
            let button = gtk::Button::builder().has_frame(false).build();
            button.add_css_class("flat");
            button.set_child(Some(&build_theme_icon(theme)));
            button.set_tooltip_text(Some(tooltip));
            let action = theme_action.clone();
            button.connect_clicked(glib::clone!(
                #[weak]
                popover,
                move |_| {
                    action.activate(Some(&Variant::from(theme.key())));
                    popover.popdown();
                },
            ));
            theme_box.append(&button);
            (theme, button)
        })
        .collect(),
    );

    let refresh_theme_buttons = |scheme: adw::ColorScheme, buttons: &[(ThemePreference, gtk::Button)]| {
        let active = match scheme {
            adw::ColorScheme::ForceLight => ThemePreference::Light,
            adw::ColorScheme::ForceDark => ThemePreference::Dark,
            _ => ThemePreference::System,
        };
        for (theme, button) in buttons {
            if *theme == active {
                button.add_css_class("theme-active");
            } else {
                button.remove_css_class("theme-active");
            }
        }
    };
    refresh_theme_buttons(style_manager.color_scheme(), &theme_buttons);
    style_manager.connect_color_scheme_notify(glib::clone!(
        #[strong]
        theme_buttons,
        move |manager| {
            refresh_theme_buttons(manager.color_scheme(), &theme_buttons);
        },
    ));

    let menu_list = gtk::ListBox::builder()
        .selection_mode(gtk::SelectionMode::None)
        .build();
    menu_list.add_css_class("boxed-list");

    let theme_row = adw::ActionRow::builder().title("Switch theme").build();
    theme_row.add_suffix(&theme_box);
    theme_row.set_activatable(false);
    menu_list.append(&theme_row);

    let confirm_remove_row = adw::SwitchRow::builder()
        .title("Confirm before removing")
        .active(settings.borrow().confirm_remove)
        .build();
    menu_list.append(&confirm_remove_row);

    let about_row = adw::ActionRow::builder()
        .title("About AppVault")
        .activatable(true)
        .build();
    about_row.set_action_name(Some("app.about"));
    menu_list.append(&about_row);

    popover_box.append(&menu_list);
    popover.set_child(Some(&popover_box));
    menu_button.set_popover(Some(&popover));
    header_bar.pack_end(&menu_button);

    let search_entry = gtk::SearchEntry::builder()
        .placeholder_text("Search applications")
        .hexpand(true)
        .build();
    let search_bar = gtk::SearchBar::new();
    search_bar.set_search_mode(true);
    search_bar.set_show_close_button(false);
    search_bar.set_key_capture_widget(Some(&window));
    search_bar.connect_entry(&search_entry);
    search_bar.set_child(Some(&search_entry));
    root_box.append(&search_bar);

    let mut pages = HashMap::new();
    for tab in Tab::ALL {
        let (page_widget, widgets) = build_catalog_page(tab);
        let page = view_stack.add_titled(&page_widget, Some(tab.key()), tab.title());
        page.set_icon_name(Some(tab.icon_name()));
        pages.insert(tab, TabPage { page, widgets });
    }

    let (detail_frame, detail_widgets) = build_detail_pane();

    let paned = gtk::Paned::builder()
        .orientation(gtk::Orientation::Horizontal)
        .wide_handle(true)
        .shrink_start_child(false)
        .shrink_end_child(false)
        .vexpand(true)
        .build();
    paned.set_start_child(Some(&view_stack));
    paned.set_end_child(Some(&detail_frame));
    paned.set_position(initial_width * 3 / 5);
    root_box.append(&paned);

    let status_label = gtk::Label::builder()
        .halign(gtk::Align::Start)
        .single_line_mode(true)
        .ellipsize(pango::EllipsizeMode::End)
        .hexpand(true)
        .build();
    status_label.set_xalign(0.0);

    let spinner = gtk::Spinner::new();
    spinner.set_visible(false);
    spinner.set_valign(gtk::Align::Center);

    let refresh_button = gtk::Button::builder()
        .icon_name("view-refresh-symbolic")
        .tooltip_text("Refresh")
        .action_name("app.refresh")
        .build();
    refresh_button.add_css_class("flat");
    refresh_button.set_focus_on_click(false);

    let footer_label = gtk::Label::builder()
        .label("Last refreshed —")
        .halign(gtk::Align::End)
        .build();
    footer_label.add_css_class("dim-label");

    let status_row = gtk::Box::builder()
        .orientation(gtk::Orientation::Horizontal)
        .spacing(6)
        .margin_start(12)
        .margin_end(12)
        .margin_bottom(8)
        .build();
    status_row.append(&refresh_button);
    status_row.append(&status_label);
    status_row.append(&spinner);
    status_row.append(&footer_label);
    root_box.append(&status_row);

    let widgets = AppWidgets {
        toast_overlay: toast_overlay.clone(),
        view_stack: view_stack.clone(),
        search_entry: search_entry.clone(),
        pages,
        detail: detail_widgets,
        refresh_button,
        spinner,
        status_label,
        footer_label,
        confirm_remove_row,
    };

    let (sender, receiver) = mpsc::channel::<AppMessage>();
    let controller = Rc::new(AppController::new(
        widgets,
        sender,
        app.clone(),
        window.clone(),
        settings.clone(),
        Arc::new(SystemRunner),
    ));

    // The poll loop owns the controller for the lifetime of the main loop.
    let controller_clone = controller.clone();
    glib::timeout_add_local(MESSAGE_POLL_INTERVAL, move || {
        drain_messages(&receiver, |msg| controller_clone.handle_message(msg));
        glib::ControlFlow::Continue
    });

    controller.setup_connections();
    controller.restore_last_tab();

    {
        let controller_weak = Rc::downgrade(&controller);
        refresh_action.connect_activate(move |_, _| {
            if let Some(controller) = controller_weak.upgrade() {
                controller.refresh_catalog();
            }
        });
    }

    {
        let controller_weak = Rc::downgrade(&controller);
        focus_search_action.connect_activate(move |_, _| {
            if let Some(controller) = controller_weak.upgrade() {
                controller.focus_search();
            }
        });
    }

    {
        let controller_weak = Rc::downgrade(&controller);
        let popover_clone = popover.clone();
        about_action.connect_activate(move |_, _| {
            popover_clone.popdown();
            if let Some(controller) = controller_weak.upgrade() {
                controller.show_about_dialog();
            }
        });
    }

    controller.refresh_catalog();

    {
        let controller_weak = Rc::downgrade(&controller);
        window.connect_close_request(move |win| {
            if let Some(controller) = controller_weak.upgrade() {
                controller.save_window_state(win.width(), win.height());
            }
            glib::Propagation::Proceed
        });
    }

    window.present();
}
