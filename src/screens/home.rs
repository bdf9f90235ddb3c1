use super::components::{render_heading, render_track_list, ACCENT};
use crate::app::player_app::MusicPlayerApp;
use crate::utils::formatting::greeting_for_hour;
use eframe::egui::{self, Color32};
use chrono::Timelike;

pub fn render_home_view(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    render_heading(ui, greeting_for_hour(chrono::Local::now().hour()));

    // Made for you
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Made for you").size(20.0).strong());
        ui.add_space(12.0);
        let has_mix = !app.content.home.mixed_tracks.is_empty();
        if ui
            .add_enabled(
                has_mix,
                egui::Button::new(egui::RichText::new("▶ Play something").color(Color32::BLACK))
                    .fill(ACCENT),
            )
            .clicked()
        {
            app.play_mixed_tracks();
        }
        if ui.button("🔀 Reshuffle").clicked() {
            app.refresh_mixed_tracks();
        }
    });
    ui.add_space(8.0);

    let mixed = app.content.home.mixed_tracks.clone();
    if mixed.is_empty() {
        ui.label(
            egui::RichText::new("Like some songs or play a few tracks to get a personal mix.")
                .color(Color32::GRAY),
        );
    } else {
        render_track_list(app, ui, &mixed, "home_mix");
    }

    ui.add_space(24.0);

    // Trending
    ui.horizontal(|ui| {
        let region = &app.content.home.trending_region;
        let title = if region.is_empty() || region == "global" {
            "Trending now".to_string()
        } else {
            format!("Trending in {}", region)
        };
        ui.label(egui::RichText::new(title).size(20.0).strong());
        if app.content.home.trending_loading {
            ui.spinner();
        } else if ui.button("⟳").on_hover_text("Refresh").clicked() {
            app.fetch_trending();
        }
    });
    if let Some(error) = &app.content.home.trending_error {
        ui.label(egui::RichText::new(error).color(Color32::from_rgb(255, 100, 100)));
    }
    ui.add_space(8.0);

    let trending = app.content.home.trending_tracks.clone();
    if !trending.is_empty() {
        render_track_list(app, ui, &trending, "home_trending");
    } else if !app.content.home.trending_loading {
        ui.label(egui::RichText::new("No trending tracks right now.").color(Color32::GRAY));
    }
}
