use super::components::ACCENT;
use crate::app::player_app::{MainTab, MusicPlayerApp};
use crate::utils::formatting::truncate_text;
use eframe::egui::{self, Color32};

pub fn render_sidebar(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    ui.add_space(12.0);
    ui.label(egui::RichText::new("OpenSpot").size(24.0).strong().color(ACCENT));
    ui.add_space(16.0);

    let tab = &mut app.ui.selected_tab;
    ui.selectable_value(tab, MainTab::Home, "🏠  Home");
    ui.selectable_value(tab, MainTab::Search, "🔍  Search");
    ui.selectable_value(tab, MainTab::NowPlaying, "🎵  Now Playing");
    ui.add_space(12.0);
    ui.label(egui::RichText::new("Your Library").size(13.0).color(Color32::GRAY));
    ui.selectable_value(tab, MainTab::LikedSongs, "♥  Liked Songs");
    ui.selectable_value(tab, MainTab::RecentlyPlayed, "🕑  Recently Played");

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Playlists").size(13.0).color(Color32::GRAY));
        if ui.small_button("➕").on_hover_text("New playlist").clicked() {
            app.ui.show_new_playlist = true;
        }
    });

    if app.ui.show_new_playlist {
        render_new_playlist_form(app, ui);
    }

    let playlists: Vec<(String, String)> = app
        .content
        .library
        .playlists()
        .iter()
        .map(|p| (p.id.clone(), p.name.clone()))
        .collect();

    egui::ScrollArea::vertical()
        .id_salt("sidebar_playlists")
        .max_height((ui.available_height() - 80.0).max(60.0))
        .show(ui, |ui| {
            if playlists.is_empty() {
                ui.label(egui::RichText::new("No playlists yet").size(12.0).color(Color32::DARK_GRAY));
            }
            for (id, name) in playlists {
                ui.selectable_value(
                    &mut app.ui.selected_tab,
                    MainTab::Playlist(id),
                    format!("📃  {}", truncate_text(&name, 24)),
                );
            }
        });

    ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
        ui.add_space(8.0);
        ui.selectable_value(&mut app.ui.selected_tab, MainTab::About, "ℹ  About");
        ui.selectable_value(&mut app.ui.selected_tab, MainTab::Settings, "⚙  Settings");
    });
}

fn render_new_playlist_form(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    let response = ui.add(
        egui::TextEdit::singleline(&mut app.ui.new_playlist_name)
            .hint_text("Playlist name")
            .desired_width(f32::INFINITY),
    );
    let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

    ui.horizontal(|ui| {
        let name = app.ui.new_playlist_name.trim().to_string();
        let create = ui.add_enabled(!name.is_empty(), egui::Button::new("Create")).clicked();
        if (create || submitted) && !name.is_empty() {
            app.create_playlist(&name);
            app.ui.new_playlist_name.clear();
            app.ui.show_new_playlist = false;
        }
        if ui.button("Cancel").clicked() {
            app.ui.new_playlist_name.clear();
            app.ui.show_new_playlist = false;
        }
    });
    ui.add_space(6.0);
}
