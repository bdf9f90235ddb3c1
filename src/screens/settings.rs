use super::components::render_heading;
use crate::app::player_app::MusicPlayerApp;
use crate::constants::MAX_CROSSFADE_SECS;
use eframe::egui::{self, Color32};

pub fn render_settings_view(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    render_heading(ui, "Settings");

    ui.label(egui::RichText::new("Playback").size(18.0).strong());
    ui.add_space(8.0);

    let mut crossfade = app.content.library.settings().crossfade;
    ui.horizontal(|ui| {
        ui.label("Crossfade");
        let response = ui.add(
            egui::Slider::new(&mut crossfade, 0..=MAX_CROSSFADE_SECS)
                .suffix(" s"),
        );
        if response.changed() {
            app.set_crossfade(crossfade);
        }
    });
    let hint = if crossfade == 0 {
        "Tracks change without overlap.".to_string()
    } else {
        format!("The next track fades in over the last {} seconds.", crossfade)
    };
    ui.label(egui::RichText::new(hint).color(Color32::GRAY));
}
