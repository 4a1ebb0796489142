use std::rc::Rc;
use std::thread;

use crate::actions::{self, ActionError, removal_plan};
use crate::state::controller::AppController;
use crate::state::types::AppMessage;
use crate::types::{AppRecord, CommandResult, PackageSource};

impl AppController {
    pub(crate) fn on_launch_selected(self: &Rc<Self>) {
        let selected = {
            let state = self.state.borrow();
            state
                .selected_record()
                .cloned()
                .map(|record| (record, state.terminal.clone()))
        };
        let Some((record, terminal)) = selected else {
            return;
        };

        match actions::launch(&record, &terminal, self.runner.as_ref()) {
            Ok(()) => self.show_toast(&format!("Launched {}.", record.name)),
            Err(err) => {
                log::warn!("Failed to launch {}: {}", record.identifier, err);
                self.show_error_dialog(
                    "Launch Failed",
                    &format!("Could not start \"{}\": {}", record.name, err),
                );
            }
        }
    }

    pub(crate) fn on_remove_selected(self: &Rc<Self>) {
        let record = self.state.borrow().selected_record().cloned();
        if let Some(record) = record {
            self.start_remove(record);
        }
    }

    pub(crate) fn start_remove(self: &Rc<Self>, record: AppRecord) {
        let plan = match removal_plan(&record) {
            Ok(plan) => plan,
            Err(err) => {
                self.show_error_dialog("Cannot Remove", &err.to_string());
                return;
            }
        };

        if self.state.borrow().confirm_remove {
            let heading = format!("Remove \"{}\"?", record.name);
            let body = format!(
                "{}\n\nThis will run:\n{}",
                removal_warning(record.source),
                plan.command_line()
            );
            self.confirm_action(&heading, &body, "Remove", move |controller| {
                controller.execute_remove(record);
            });
            return;
        }

        self.execute_remove(record);
    }

    pub(crate) fn execute_remove(self: &Rc<Self>, record: AppRecord) {
        if !self.state.borrow_mut().begin_remove() {
            return;
        }

        self.set_status_message(Some(format!("Removing \"{}\"…", record.name)));
        self.update_busy_ui();

        let runner = self.runner.clone();
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = actions::remove(&record, runner.as_ref()).map_err(|err| match err {
                ActionError::Failed { detail, .. } => detail,
                other => other.to_string(),
            });
            let _ = sender.send(AppMessage::RemoveFinished {
                name: record.name,
                result,
            });
        });
    }

    pub(crate) fn finish_remove(self: &Rc<Self>, name: String, result: Result<CommandResult, String>) {
        self.state.borrow_mut().finish_remove();
        self.set_status_message(None);
        self.update_busy_ui();

        match result {
            Ok(_) => {
                self.show_toast(&format!("Removed {}.", name));
                self.refresh_catalog();
            }
            Err(err) => {
                log::warn!("Removal of {} failed: {}", name, err);
                self.show_error_dialog(
                    "Removal Failed",
                    &format!("Failed to remove \"{}\": {}", name, err),
                );
            }
        }
    }
}

fn removal_warning(source: PackageSource) -> &'static str {
    match source {
        PackageSource::Apt => {
            "The package, its configuration and any dependencies nothing else needs will be removed."
        }
        PackageSource::Flatpak => "The application and its data will be removed.",
        PackageSource::Snap => "The snap and its saved data will be removed.",
    }
}
