use super::components::{render_empty_state, render_heading, render_track_list};
use crate::app::player_app::MusicPlayerApp;
use eframe::egui::{self, Color32};

/// Live search: results refresh shortly after the user stops typing
pub fn render_search_view(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    render_heading(ui, "Search");

    let response = ui.add_sized(
        [ui.available_width().min(600.0), 32.0],
        egui::TextEdit::singleline(&mut app.content.search.query)
            .hint_text("What do you want to listen to?"),
    );
    if response.changed() {
        app.on_search_edited();
    }
    ui.add_space(12.0);

    if app.content.search.loading {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Searching...");
        });
        return;
    }

    if let Some(error) = &app.content.search.error {
        ui.label(egui::RichText::new(error).color(Color32::from_rgb(255, 100, 100)));
        return;
    }

    let results = app.content.search.results.clone();
    if results.is_empty() {
        if app.content.search.searched_query.is_empty() {
            render_empty_state(ui, "Find your music", "Search for songs, artists or albums");
        } else {
            render_empty_state(ui, "No results found", "Try a different search query");
        }
        return;
    }

    render_track_list(app, ui, &results, "search_results");
}
