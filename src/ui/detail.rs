use gtk::pango;
use gtk4 as gtk;

use libadwaita::prelude::*;

pub(crate) struct DetailWidgets {
    pub(crate) stack: gtk::Stack,
    pub(crate) icon: gtk::Image,
    pub(crate) name: gtk::Label,
    pub(crate) source_tag: gtk::Label,
    pub(crate) kind_tag: gtk::Label,
    pub(crate) identifier_value: gtk::Label,
    pub(crate) version_value: gtk::Label,
    pub(crate) origin_row: gtk::Box,
    pub(crate) origin_value: gtk::Label,
    pub(crate) command_value: gtk::Label,
    pub(crate) desktop_file_row: gtk::Box,
    pub(crate) desktop_file_value: gtk::Label,
    pub(crate) note_label: gtk::Label,
    pub(crate) launch_button: gtk::Button,
    pub(crate) remove_button: gtk::Button,
}

fn metadata_row(title: &str, selectable: bool) -> (gtk::Box, gtk::Label) {
    let row = gtk::Box::builder()
        .orientation(gtk::Orientation::Horizontal)
        .spacing(6)
        .halign(gtk::Align::Fill)
        .build();

    let title_label = gtk::Label::builder()
        .label(title)
        .halign(gtk::Align::Start)
        .valign(gtk::Align::Start)
        .build();
    title_label.add_css_class("dim-label");
    title_label.set_xalign(0.0);
    title_label.set_width_chars(12);

    let value = gtk::Label::builder()
        .halign(gtk::Align::Start)
        .wrap(true)
        .wrap_mode(pango::WrapMode::WordChar)
        .selectable(selectable)
        .build();
    value.set_hexpand(true);
    value.set_xalign(0.0);

    row.append(&title_label);
    row.append(&value);
    (row, value)
}

fn tag_label() -> gtk::Label {
    let label = gtk::Label::new(None);
    label.add_css_class("tag");
    label.add_css_class("caption");
    label
}

pub(crate) fn build_detail_pane() -> (gtk::Frame, DetailWidgets) {
    let icon = gtk::Image::builder()
        .pixel_size(64)
        .icon_name("application-x-executable")
        .valign(gtk::Align::Start)
        .build();

    let name = gtk::Label::builder()
        .halign(gtk::Align::Start)
        .wrap(true)
        .wrap_mode(pango::WrapMode::WordChar)
        .build();
    name.add_css_class("title-2");
    name.set_xalign(0.0);

    let source_tag = tag_label();
    let kind_tag = tag_label();
    let tags_row = gtk::Box::builder()
        .orientation(gtk::Orientation::Horizontal)
        .spacing(6)
        .build();
    tags_row.append(&source_tag);
    tags_row.append(&kind_tag);

    let title_box = gtk::Box::builder()
        .orientation(gtk::Orientation::Vertical)
        .spacing(6)
        .valign(gtk::Align::Center)
        .build();
    title_box.append(&name);
    title_box.append(&tags_row);

    let header_row = gtk::Box::builder()
        .orientation(gtk::Orientation::Horizontal)
        .spacing(12)
        .build();
    header_row.append(&icon);
    header_row.append(&title_box);

    let metadata_box = gtk::Box::builder()
        .orientation(gtk::Orientation::Vertical)
        .spacing(4)
        .margin_top(6)
        .build();
    let (identifier_row, identifier_value) = metadata_row("Identifier", true);
    let (version_row, version_value) = metadata_row("Version", true);
    let (origin_row, origin_value) = metadata_row("Origin", false);
    let (command_row, command_value) = metadata_row("Command", true);
    command_value.add_css_class("monospace");
    let (desktop_file_row, desktop_file_value) = metadata_row("Desktop file", true);
    metadata_box.append(&identifier_row);
    metadata_box.append(&version_row);
    metadata_box.append(&origin_row);
    metadata_box.append(&command_row);
    metadata_box.append(&desktop_file_row);

    let note_label = gtk::Label::builder()
        .halign(gtk::Align::Start)
        .wrap(true)
        .wrap_mode(pango::WrapMode::WordChar)
        .visible(false)
        .build();
    note_label.add_css_class("dim-label");
    note_label.set_xalign(0.0);

    let launch_button = gtk::Button::builder()
        .label("Launch")
        .width_request(120)
        .tooltip_text("Start this application.")
        .build();
    launch_button.add_css_class("suggested-action");

    let remove_button = gtk::Button::builder()
        .label("Remove")
        .width_request(120)
        .tooltip_text("Uninstall this application.")
        .build();
    remove_button.add_css_class("destructive-action");

    let actions_row = gtk::Box::builder()
        .orientation(gtk::Orientation::Horizontal)
        .spacing(8)
        .halign(gtk::Align::Start)
        .margin_top(6)
        .build();
    actions_row.append(&launch_button);
    actions_row.append(&remove_button);

    let detail_box = gtk::Box::builder()
        .orientation(gtk::Orientation::Vertical)
        .spacing(6)
        .margin_top(12)
        .margin_bottom(12)
        .margin_start(12)
        .margin_end(12)
        .build();
    detail_box.append(&header_row);
    detail_box.append(&metadata_box);
    detail_box.append(&note_label);
    detail_box.append(&actions_row);

    let detail_scroller = gtk::ScrolledWindow::builder()
        .hexpand(true)
        .vexpand(true)
        .hscrollbar_policy(gtk::PolicyType::Never)
        .build();
    detail_scroller.set_child(Some(&detail_box));

    let placeholder = gtk::Label::builder()
        .label("Select an application to see details.")
        .halign(gtk::Align::Center)
        .valign(gtk::Align::Center)
        .wrap(true)
        .justify(gtk::Justification::Center)
        .build();
    placeholder.add_css_class("dim-label");

    let stack = gtk::Stack::builder()
        .transition_type(gtk::StackTransitionType::Crossfade)
        .hexpand(true)
        .vexpand(true)
        .build();
    stack.add_named(&placeholder, Some("placeholder"));
    stack.add_named(&detail_scroller, Some("detail"));
    stack.set_visible_child_name("placeholder");

    let frame = gtk::Frame::builder()
        .hexpand(true)
        .vexpand(true)
        .width_request(320)
        .margin_end(12)
        .margin_bottom(12)
        .margin_top(6)
        .build();
    frame.set_child(Some(&stack));

    let widgets = DetailWidgets {
        stack,
        icon,
        name,
        source_tag,
        kind_tag,
        identifier_value,
        version_value,
        origin_row,
        origin_value,
        command_value,
        desktop_file_row,
        desktop_file_value,
        note_label,
        launch_button,
        remove_button,
    };

    (frame, widgets)
}
