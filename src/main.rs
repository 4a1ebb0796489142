mod actions;
mod catalog;
mod helpers;
mod process;
mod scan;
mod settings;
mod state;
#[cfg(test)]
mod testing;
mod types;
mod ui;

use adw::prelude::*;
use gtk4::gio;
use gtk4::glib;
use libadwaita as adw;

use crate::ui::build_ui;

const APP_ID: &str = "io.github.appvault.AppVault";

fn main() -> glib::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = adw::init() {
        log::error!("Failed to initialize libadwaita: {}", err);
        return glib::ExitCode::FAILURE;
    }

    let app = adw::Application::builder()
        .application_id(APP_ID)
        .flags(gio::ApplicationFlags::FLAGS_NONE)
        .build();

    app.connect_activate(build_ui);

    app.run()
}
