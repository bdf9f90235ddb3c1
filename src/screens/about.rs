use super::components::render_heading;
use crate::app::player_app::MusicPlayerApp;
use crate::services::updates::{open_releases_page, CURRENT_VERSION};
use crate::services::UpdateStatus;
use crate::state::content_state::UpdateCheck;
use eframe::egui::{self, Color32};

pub fn render_about_view(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    render_heading(ui, "About");
    ui.label(format!("OpenSpot v{}", CURRENT_VERSION));
    ui.label(egui::RichText::new(env!("CARGO_PKG_DESCRIPTION")).color(Color32::GRAY));
    ui.add_space(16.0);

    ui.horizontal(|ui| {
        let checking = matches!(app.content.update_check, UpdateCheck::Checking);
        if ui
            .add_enabled(!checking, egui::Button::new("Check for updates"))
            .clicked()
        {
            app.check_for_updates();
        }
        if checking {
            ui.spinner();
        }
    });
    ui.add_space(8.0);

    match &app.content.update_check {
        UpdateCheck::NotChecked | UpdateCheck::Checking => {}
        UpdateCheck::Done(UpdateStatus::UpToDate) => {
            ui.label("You are running the latest version.");
        }
        UpdateCheck::Done(UpdateStatus::Available { latest }) => {
            ui.label(format!("Version {} is available.", latest));
            if ui.button("Open releases page").clicked() {
                open_releases_page();
            }
        }
        UpdateCheck::Failed(e) => {
            ui.label(egui::RichText::new(e).color(Color32::from_rgb(255, 100, 100)));
        }
    }
}
