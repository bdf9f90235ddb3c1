use super::components::{render_empty_state, render_track_list, ACCENT};
use crate::app::player_app::MusicPlayerApp;
use crate::models::Track;
use crate::state::ui_state::NowPlayingPanel;
use crate::utils::lrc::active_line;
use eframe::egui::{self, Color32, CornerRadius, Sense, Vec2};

const ARTWORK_SIZE: f32 = 360.0;

/// Now Playing screen - large artwork on the left, lyrics or the queue on the right
pub fn render_now_playing_view(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    let Some(track) = app.current_track().cloned() else {
        render_empty_state(ui, "No track playing", "Search for a track to get started");
        return;
    };

    if let Some(error_msg) = app.ui.last_playback_error.clone() {
        render_error_banner(ui, &error_msg);
    }

    app.ensure_lyrics();

    ui.columns(2, |columns| {
        render_track_details(app, &mut columns[0], &track);

        let ui = &mut columns[1];
        ui.horizontal(|ui| {
            ui.selectable_value(&mut app.ui.now_playing_panel, NowPlayingPanel::Lyrics, "Lyrics");
            ui.selectable_value(&mut app.ui.now_playing_panel, NowPlayingPanel::UpNext, "Up next");
        });
        ui.separator();
        match app.ui.now_playing_panel {
            NowPlayingPanel::Lyrics => render_lyrics(app, ui),
            NowPlayingPanel::UpNext => render_up_next(app, ui),
        }
    });
}

fn render_error_banner(ui: &mut egui::Ui, error_msg: &str) {
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(format!("⚠ Playback Error: {}", error_msg))
                .color(Color32::from_rgb(255, 100, 100)),
        );
    });
    ui.add_space(8.0);
}

fn render_track_details(app: &mut MusicPlayerApp, ui: &mut egui::Ui, track: &Track) {
    ui.vertical_centered(|ui| {
        ui.add_space(30.0);

        let (rect, _) = ui.allocate_exact_size(Vec2::splat(ARTWORK_SIZE), Sense::hover());
        match &app.ui.artwork_texture {
            Some(texture) => {
                ui.painter().image(
                    texture.id(),
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => {
                ui.painter()
                    .rect_filled(rect, CornerRadius::same(20), Color32::from_rgb(60, 60, 65));
                if app.ui.artwork_loading {
                    ui.put(rect, egui::Spinner::new());
                }
            }
        }

        ui.add_space(20.0);
        ui.label(egui::RichText::new(&track.title).size(28.0).strong().color(Color32::WHITE));
        ui.add_space(6.0);
        ui.label(egui::RichText::new(&track.artist).size(20.0).color(ACCENT));
        ui.label(egui::RichText::new(&track.album).size(14.0).color(Color32::GRAY));
        if let Some(genre) = &track.genre {
            ui.label(egui::RichText::new(genre).size(12.0).color(Color32::DARK_GRAY));
        }
        ui.add_space(16.0);

        ui.horizontal(|ui| {
            let liked = app.is_liked(&track.id);
            let like_label = if liked { "♥ Liked" } else { "♡ Like" };
            if ui.button(like_label).clicked() {
                app.toggle_like(track);
            }
            if ui.button("⬇ Download").clicked() {
                app.download_track(track);
            }
        });
    });
}

fn render_lyrics(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    if app.content.lyrics.loading {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading lyrics...");
        });
        return;
    }
    if app.content.lyrics.unavailable || app.content.lyrics.lines.is_empty() {
        ui.add_space(20.0);
        ui.label(
            egui::RichText::new("Lyrics not available for this track.")
                .size(16.0)
                .color(Color32::GRAY),
        );
        return;
    }

    let current = active_line(&app.content.lyrics.lines, app.audio.playback_queue.current_time());
    let follow = app.ui.last_lyric_line != Some(current);
    app.ui.last_lyric_line = Some(current);

    let mut seek_target = None;
    egui::ScrollArea::vertical()
        .id_salt("lyrics")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (index, line) in app.content.lyrics.lines.iter().enumerate() {
                let is_active = index == current;
                let text = if line.text.is_empty() { "♪" } else { line.text.as_str() };
                let rich = egui::RichText::new(text).size(if is_active { 22.0 } else { 18.0 });
                let rich = if is_active {
                    rich.strong().color(Color32::WHITE)
                } else {
                    rich.color(Color32::GRAY)
                };

                let response = ui.add(egui::Label::new(rich).sense(Sense::click()));
                if response.clicked() {
                    seek_target = Some(line.time);
                }
                if is_active && follow {
                    response.scroll_to_me(Some(egui::Align::Center));
                }
                ui.add_space(6.0);
            }
        });

    if let Some(time) = seek_target {
        app.seek_to(time);
    }
}

fn render_up_next(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    let up_next = app.audio.playback_queue.up_next().to_vec();
    if up_next.is_empty() {
        ui.add_space(20.0);
        ui.label(egui::RichText::new("Nothing queued after this track.").color(Color32::GRAY));
        return;
    }
    egui::ScrollArea::vertical()
        .id_salt("up_next")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            render_track_list(app, ui, &up_next, "up_next");
        });
}
