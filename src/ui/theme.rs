use std::f64::consts::PI;

use gtk4 as gtk;
use gtk4::prelude::{DrawingAreaExt, DrawingAreaExtManual, WidgetExt};
use libadwaita as adw;

use crate::settings::ThemePreference;

pub(crate) fn apply_theme_css_class(window: &adw::ApplicationWindow, is_dark: bool) {
    window.remove_css_class("appvault-window-light");
    window.remove_css_class("appvault-window-dark");
    if is_dark {
        window.add_css_class("appvault-window-dark");
    } else {
        window.add_css_class("appvault-window-light");
    }
}

/// Small filled circle previewing a theme choice.
pub(crate) fn build_theme_icon(theme: ThemePreference) -> gtk::DrawingArea {
    let fill = match theme {
        ThemePreference::System => 0.2,
        ThemePreference::Light => 1.0,
        ThemePreference::Dark => 0.1,
    };

    let area = gtk::DrawingArea::new();
    area.set_content_width(16);
    area.set_content_height(16);
    area.set_draw_func(move |_area, cr, width, height| {
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        cr.set_line_width(2.0);
        cr.set_source_rgb(0.2, 0.2, 0.2);
        cr.arc(cx, cy, cx - 2.0, 0.0, 2.0 * PI);
        let _ = cr.stroke();

        cr.set_source_rgb(fill, fill, fill);
        cr.arc(cx, cy, cx - 4.0, 0.0, 2.0 * PI);
        let _ = cr.fill();
    });

    area
}
