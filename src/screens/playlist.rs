use super::components::{render_empty_state, render_heading, render_track_list, ACCENT};
use crate::app::player_app::MusicPlayerApp;
use crate::utils::formatting::format_time;
use eframe::egui::{self, Color32};

pub fn render_playlist_view(app: &mut MusicPlayerApp, ui: &mut egui::Ui, playlist_id: &str) {
    let Some(playlist) = app.content.library.playlist(playlist_id).cloned() else {
        render_empty_state(ui, "Playlist not found", "It may have been deleted");
        return;
    };

    render_heading(ui, &playlist.name);
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(format!(
                "{} songs • {}",
                playlist.tracks.len(),
                format_time(playlist.total_duration())
            ))
            .color(Color32::GRAY),
        );
        ui.add_space(12.0);
        if let Some(first) = playlist.tracks.first() {
            if ui
                .add(egui::Button::new(egui::RichText::new("▶ Play").color(Color32::BLACK)).fill(ACCENT))
                .clicked()
            {
                app.play_track_from_list(first, &playlist.tracks);
            }
        }
        if ui.button("🗑 Delete playlist").clicked() {
            app.delete_playlist(&playlist.id);
        }
    });
    ui.add_space(12.0);

    if playlist.tracks.is_empty() {
        render_empty_state(ui, "This playlist is empty", "Add songs with the ➕ button on any track");
        return;
    }
    render_track_list(app, ui, &playlist.tracks, &playlist.id);
}
