use crate::app::player_app::MusicPlayerApp;
use crate::models::Track;
use crate::utils::formatting::{format_time, truncate_text};
use eframe::egui::{self, Color32, CornerRadius, Sense, Vec2};

pub const ACCENT: Color32 = Color32::from_rgb(
    crate::constants::ACCENT_COLOR_RGB.0,
    crate::constants::ACCENT_COLOR_RGB.1,
    crate::constants::ACCENT_COLOR_RGB.2,
);

const ROW_HEIGHT: f32 = 56.0;
const THUMB_SIZE: f32 = 44.0;

/// What the user did with a row; applied after the list is drawn
enum TrackAction {
    Play(Track),
    ToggleLike(Track),
    AddToPlaylist(String, Track),
    Download(Track),
}

/// Cover art at `rect`, or a neutral placeholder while it loads
pub fn draw_artwork(app: &mut MusicPlayerApp, ui: &mut egui::Ui, rect: egui::Rect, url: &str) {
    if let Some(texture) = app.thumbnail(url) {
        ui.painter().image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    } else {
        ui.painter()
            .rect_filled(rect, CornerRadius::same(4), Color32::from_rgb(45, 45, 50));
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "🎵",
            egui::FontId::proportional(rect.height() * 0.4),
            Color32::from_rgb(120, 120, 120),
        );
    }
}

pub fn render_empty_state(ui: &mut egui::Ui, title: &str, hint: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(100.0);
        ui.label(egui::RichText::new(title).size(20.0).color(Color32::GRAY));
        ui.add_space(10.0);
        ui.label(egui::RichText::new(hint).size(14.0).color(Color32::DARK_GRAY));
    });
}

pub fn render_heading(ui: &mut egui::Ui, text: &str) {
    ui.add_space(16.0);
    ui.label(egui::RichText::new(text).size(26.0).strong().color(Color32::WHITE));
    ui.add_space(12.0);
}

/// Track rows. Clicking a row plays it with `tracks` as the queue.
pub fn render_track_list(app: &mut MusicPlayerApp, ui: &mut egui::Ui, tracks: &[Track], id_salt: &str) {
    let mut action = None;
    let current_id = app.current_track().map(|t| t.id.clone());
    let playlists: Vec<(String, String)> = app
        .content
        .library
        .playlists()
        .iter()
        .map(|p| (p.id.clone(), p.name.clone()))
        .collect();

    for (index, track) in tracks.iter().enumerate() {
        let is_current = current_id.as_deref() == Some(track.id.as_str());
        ui.push_id((id_salt, index), |ui| {
            if let Some(a) = render_track_row(app, ui, track, index, is_current, &playlists) {
                action = Some(a);
            }
        });
    }

    match action {
        Some(TrackAction::Play(track)) => app.play_track_from_list(&track, tracks),
        Some(TrackAction::ToggleLike(track)) => app.toggle_like(&track),
        Some(TrackAction::AddToPlaylist(playlist_id, track)) => {
            app.add_to_playlist(&playlist_id, &track)
        }
        Some(TrackAction::Download(track)) => app.download_track(&track),
        None => {}
    }
}

fn render_track_row(
    app: &mut MusicPlayerApp,
    ui: &mut egui::Ui,
    track: &Track,
    index: usize,
    is_current: bool,
    playlists: &[(String, String)],
) -> Option<TrackAction> {
    let mut action = None;
    let width = ui.available_width();
    let (rect, response) = ui.allocate_exact_size(Vec2::new(width, ROW_HEIGHT), Sense::click());

    if response.hovered() || is_current {
        ui.painter()
            .rect_filled(rect, CornerRadius::same(6), Color32::from_rgb(40, 40, 45));
    }

    let index_pos = rect.left_center() + Vec2::new(16.0, 0.0);
    ui.painter().text(
        index_pos,
        egui::Align2::CENTER_CENTER,
        if is_current && app.is_playing() {
            "▶".to_string()
        } else {
            (index + 1).to_string()
        },
        egui::FontId::proportional(13.0),
        if is_current { ACCENT } else { Color32::GRAY },
    );

    let thumb_rect = egui::Rect::from_min_size(
        rect.min + Vec2::new(36.0, (ROW_HEIGHT - THUMB_SIZE) / 2.0),
        Vec2::splat(THUMB_SIZE),
    );
    draw_artwork(app, ui, thumb_rect, &track.cover_url);

    let text_x = thumb_rect.max.x + 12.0;
    ui.painter().text(
        egui::pos2(text_x, rect.center().y - 9.0),
        egui::Align2::LEFT_CENTER,
        truncate_text(&track.title, 60),
        egui::FontId::proportional(15.0),
        if is_current { ACCENT } else { Color32::WHITE },
    );
    ui.painter().text(
        egui::pos2(text_x, rect.center().y + 10.0),
        egui::Align2::LEFT_CENTER,
        truncate_text(&format!("{} • {}", track.artist, track.album), 80),
        egui::FontId::proportional(12.0),
        Color32::GRAY,
    );
    ui.painter().text(
        rect.right_center() - Vec2::new(130.0, 0.0),
        egui::Align2::RIGHT_CENTER,
        format_time(track.duration),
        egui::FontId::proportional(13.0),
        Color32::GRAY,
    );

    // Row buttons on the right edge
    let buttons_rect = egui::Rect::from_min_max(
        rect.right_top() - Vec2::new(120.0, 0.0),
        rect.right_bottom(),
    );
    ui.scope_builder(egui::UiBuilder::new().max_rect(buttons_rect), |ui| {
        ui.horizontal_centered(|ui| {
            let liked = app.is_liked(&track.id);
            let heart = egui::RichText::new(if liked { "♥" } else { "♡" })
                .size(16.0)
                .color(if liked { ACCENT } else { Color32::GRAY });
            if ui.add(egui::Button::new(heart).frame(false)).on_hover_text("Like").clicked() {
                action = Some(TrackAction::ToggleLike(track.clone()));
            }

            ui.menu_button("➕", |ui| {
                if playlists.is_empty() {
                    ui.label("No playlists yet");
                }
                for (id, name) in playlists {
                    if ui.button(name.as_str()).clicked() {
                        action = Some(TrackAction::AddToPlaylist(id.clone(), track.clone()));
                    }
                }
            });

            if ui
                .add(egui::Button::new("⬇").frame(false))
                .on_hover_text("Download")
                .clicked()
            {
                action = Some(TrackAction::Download(track.clone()));
            }
        });
    });

    if action.is_none() && response.clicked() {
        action = Some(TrackAction::Play(track.clone()));
    }
    action
}
