use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;

use crate::catalog::Tab;

pub(crate) struct CatalogPageWidgets {
    pub(crate) list: gtk::ListBox,
    pub(crate) results_stack: gtk::Stack,
    pub(crate) empty_page: adw::StatusPage,
}

impl CatalogPageWidgets {
    pub(crate) fn show_list(&self) {
        self.results_stack.set_visible_child_name("list");
    }

    pub(crate) fn show_empty(&self, title: &str, description: &str) {
        self.empty_page.set_title(title);
        self.empty_page.set_description(Some(description));
        self.results_stack.set_visible_child_name("empty");
    }
}

pub(crate) fn build_page(tab: Tab) -> (gtk::Stack, CatalogPageWidgets) {
    let list = gtk::ListBox::builder()
        .selection_mode(gtk::SelectionMode::Single)
        .activate_on_single_click(false)
        .build();
    list.add_css_class("boxed-list");
    list.set_valign(gtk::Align::Start);
    list.set_margin_start(12);
    list.set_margin_end(12);
    list.set_margin_top(6);
    list.set_margin_bottom(12);

    let scroller = gtk::ScrolledWindow::builder()
        .hexpand(true)
        .vexpand(true)
        .min_content_height(320)
        .hscrollbar_policy(gtk::PolicyType::Never)
        .build();
    scroller.set_child(Some(&list));

    let empty_page = adw::StatusPage::builder()
        .icon_name(tab.icon_name())
        .title(format!("No {} Applications", tab.title()))
        .vexpand(true)
        .hexpand(true)
        .build();

    let results_stack = gtk::Stack::builder()
        .transition_type(gtk::StackTransitionType::Crossfade)
        .hexpand(true)
        .vexpand(true)
        .build();
    results_stack.add_named(&scroller, Some("list"));
    results_stack.add_named(&empty_page, Some("empty"));
    results_stack.set_visible_child_name("empty");

    let widgets = CatalogPageWidgets {
        list,
        results_stack: results_stack.clone(),
        empty_page,
    };

    (results_stack, widgets)
}
