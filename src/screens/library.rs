use super::components::{render_empty_state, render_heading, render_track_list};
use crate::app::player_app::MusicPlayerApp;
use eframe::egui;

pub fn render_liked_view(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    render_heading(ui, "Liked Songs");
    let tracks = app.content.library.liked_tracks().to_vec();
    if tracks.is_empty() {
        render_empty_state(ui, "Songs you like will appear here", "Save songs by tapping the heart icon");
        return;
    }
    ui.label(format!("{} songs", tracks.len()));
    ui.add_space(8.0);
    render_track_list(app, ui, &tracks, "liked");
}

pub fn render_recent_view(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    render_heading(ui, "Recently Played");
    let tracks = app.content.library.recently_played().to_vec();
    if tracks.is_empty() {
        render_empty_state(ui, "Nothing played yet", "Tracks you play will show up here");
        return;
    }
    render_track_list(app, ui, &tracks, "recent");
}
