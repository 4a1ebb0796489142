pub(crate) mod app;
pub(crate) mod catalog_page;
pub(crate) mod detail;
pub(crate) mod theme;

pub(crate) use app::{AppWidgets, build_ui};
pub(crate) use catalog_page::{CatalogPageWidgets, build_page as build_catalog_page};
pub(crate) use detail::{DetailWidgets, build_detail_pane};
pub(crate) use theme::{apply_theme_css_class, build_theme_icon};
