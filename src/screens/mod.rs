pub mod about;
pub mod components;
pub mod home;
pub mod library;
pub mod now_playing;
pub mod player_bar;
pub mod playlist;
pub mod search;
pub mod settings;
pub mod sidebar;

use crate::app::player_app::{MainTab, MusicPlayerApp};
use crate::constants::{PLAYER_BAR_HEIGHT, SIDEBAR_WIDTH};
use eframe::egui;

/// Sidebar on the left, player bar along the bottom, selected screen in the middle
pub fn render_layout(app: &mut MusicPlayerApp, ctx: &egui::Context) {
    egui::SidePanel::left("sidebar")
        .exact_width(SIDEBAR_WIDTH)
        .resizable(false)
        .show(ctx, |ui| sidebar::render_sidebar(app, ui));

    egui::TopBottomPanel::bottom("player_bar")
        .exact_height(PLAYER_BAR_HEIGHT)
        .show(ctx, |ui| player_bar::render_player_bar(app, ui));

    egui::CentralPanel::default().show(ctx, |ui| {
        // Now Playing manages its own scrolling regions
        if app.ui.selected_tab == MainTab::NowPlaying {
            now_playing::render_now_playing_view(app, ui);
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("main_content")
            .auto_shrink([false, false])
            .show(ui, |ui| match app.ui.selected_tab.clone() {
                MainTab::Home => home::render_home_view(app, ui),
                MainTab::Search => search::render_search_view(app, ui),
                MainTab::LikedSongs => library::render_liked_view(app, ui),
                MainTab::RecentlyPlayed => library::render_recent_view(app, ui),
                MainTab::Playlist(id) => playlist::render_playlist_view(app, ui, &id),
                MainTab::Settings => settings::render_settings_view(app, ui),
                MainTab::About => about::render_about_view(app, ui),
                MainTab::NowPlaying => {}
            });
    });
}
