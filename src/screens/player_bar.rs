use super::components::{draw_artwork, ACCENT};
use crate::app::player_app::{MainTab, MusicPlayerApp};
use crate::models::RepeatMode;
use crate::utils::formatting::{format_time, truncate_text};
use eframe::egui::{self, Color32, Sense, Vec2};

const COVER_SIZE: f32 = 56.0;
const INFO_WIDTH: f32 = 260.0;
const VOLUME_WIDTH: f32 = 110.0;

/// Bottom bar: current track, transport, seek bar and volume
pub fn render_player_bar(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    if let Some(message) = app.ui.current_toast().map(str::to_string) {
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(message).size(13.0).color(ACCENT));
        });
    }

    ui.horizontal_centered(|ui| {
        render_track_info(app, ui);
        ui.separator();
        render_transport(app, ui);
        ui.separator();
        render_volume(app, ui);
    });
}

fn render_track_info(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    ui.allocate_ui(Vec2::new(INFO_WIDTH, COVER_SIZE), |ui| {
        let Some(track) = app.current_track().cloned() else {
            ui.label(egui::RichText::new("Nothing playing").color(Color32::GRAY));
            return;
        };

        ui.horizontal(|ui| {
            let (rect, cover) = ui.allocate_exact_size(Vec2::splat(COVER_SIZE), Sense::click());
            draw_artwork(app, ui, rect, &track.cover_url);

            let info = ui.vertical(|ui| {
                let title = ui.add(
                    egui::Label::new(
                        egui::RichText::new(truncate_text(&track.title, 28))
                            .strong()
                            .color(Color32::WHITE),
                    )
                    .sense(Sense::click()),
                );
                ui.label(egui::RichText::new(truncate_text(&track.artist, 32)).color(Color32::GRAY));
                title.clicked()
            });

            if cover.clicked() || info.inner {
                app.ui.selected_tab = MainTab::NowPlaying;
            }
        });
    });
}

fn render_transport(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    let has_track = app.current_track().is_some();
    let volume_space = VOLUME_WIDTH + 60.0;
    let width = (ui.available_width() - volume_space).max(200.0);

    ui.allocate_ui(Vec2::new(width, COVER_SIZE), |ui| {
        ui.vertical_centered(|ui| {
            ui.horizontal(|ui| {
                let shuffle = egui::RichText::new("🔀").color(if app.audio.playback_queue.is_shuffled() {
                    ACCENT
                } else {
                    Color32::GRAY
                });
                if ui.add(egui::Button::new(shuffle).frame(false)).on_hover_text("Shuffle").clicked() {
                    app.toggle_shuffle();
                }

                if ui.add_enabled(has_track, egui::Button::new("⏮")).clicked() {
                    app.play_previous();
                }

                let play_label = if app.is_playing() { "⏸" } else { "▶" };
                if ui.add_enabled(has_track, egui::Button::new(play_label)).clicked() {
                    app.toggle_playback();
                }

                if ui.add_enabled(has_track, egui::Button::new("⏭")).clicked() {
                    app.play_next();
                }

                let mode = app.audio.playback_queue.repeat_mode();
                let (icon, color) = match mode {
                    RepeatMode::Off => ("🔁", Color32::GRAY),
                    RepeatMode::Playlist => ("🔁", ACCENT),
                    RepeatMode::Track => ("🔂", ACCENT),
                };
                let repeat = egui::Button::new(egui::RichText::new(icon).color(color)).frame(false);
                if ui.add(repeat).on_hover_text(mode.label()).clicked() {
                    app.cycle_repeat_mode();
                }

                if app.audio.is_loading() {
                    ui.spinner();
                } else if let Some(err) = app.audio.load_error() {
                    ui.label(egui::RichText::new("⚠").color(Color32::from_rgb(255, 100, 100)))
                        .on_hover_text(err.to_string());
                }
            });

            render_seek_bar(app, ui, has_track);
        });
    });
}

fn render_seek_bar(app: &mut MusicPlayerApp, ui: &mut egui::Ui, has_track: bool) {
    let duration = match app.audio.playback_queue.duration() {
        d if d > 0.0 => d,
        _ => app.current_track().map(|t| t.duration).unwrap_or(0.0),
    };
    let position = if app.ui.is_seeking {
        app.ui.seek_target_secs
    } else {
        app.audio.position().min(duration.max(0.0))
    };

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(format_time(position)).size(12.0).color(Color32::GRAY));

        let mut value = position;
        let slider_width = (ui.available_width() - 50.0).max(80.0);
        ui.spacing_mut().slider_width = slider_width;
        let response = ui.add_enabled(
            has_track && duration > 0.0,
            egui::Slider::new(&mut value, 0.0..=duration.max(1.0)).show_value(false),
        );

        if response.dragged() || response.changed() {
            app.ui.is_seeking = true;
            app.ui.seek_target_secs = value;
        }
        if response.drag_stopped() || (response.changed() && !response.dragged()) {
            app.seek_to(app.ui.seek_target_secs);
            app.ui.is_seeking = false;
        }

        ui.label(egui::RichText::new(format_time(duration)).size(12.0).color(Color32::GRAY));
    });
}

fn render_volume(app: &mut MusicPlayerApp, ui: &mut egui::Ui) {
    let icon = if app.audio.muted || app.audio.volume == 0.0 {
        "🔇"
    } else if app.audio.volume < 0.5 {
        "🔉"
    } else {
        "🔊"
    };
    if ui.add(egui::Button::new(icon).frame(false)).clicked() {
        app.toggle_mute();
    }

    let mut volume = app.audio.effective_volume();
    ui.spacing_mut().slider_width = VOLUME_WIDTH;
    if ui
        .add(egui::Slider::new(&mut volume, 0.0..=1.0).show_value(false))
        .changed()
    {
        app.set_volume(volume);
    }
}
