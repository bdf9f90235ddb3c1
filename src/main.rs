//#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]
mod api;
mod app;
mod config;
mod constants;
mod data;
mod models;
mod screens;
mod services;
mod state;
mod utils;

use app::MusicPlayerApp;
use eframe::egui;

// App version and metadata
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_NAME: &str = "OpenSpot";
const APP_DESCRIPTION: &str = "Music Streaming";

const APP_HEIGHT: f32 = 800.0;
const APP_WIDTH: f32 = 1280.0;

fn main() -> Result<(), eframe::Error> {
    // Set RUST_LOG=debug for verbose output, RUST_LOG=info for normal logs
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("naga", log::LevelFilter::Warn)
        .init();

    log::info!("[Main] Starting {} v{}", APP_NAME, APP_VERSION);

    let config = config::init();
    log::info!(
        "[Main] API: {} | Trending region: {}",
        config.api_base_url,
        config.country
    );

    // Detect GPU and decide rendering backend
    let (use_gpu, gpu_info) = should_use_gpu();
    log::info!(
        "[Main] GPU Detection Result: {} | Using: {}",
        gpu_info,
        if use_gpu { "WGPU (GPU)" } else { "GLOW (CPU)" }
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("{} v{} - {}", APP_NAME, APP_VERSION, APP_DESCRIPTION))
            .with_inner_size([APP_WIDTH, APP_HEIGHT])
            .with_min_inner_size([960.0, 600.0])
            .with_resizable(true)
            .with_decorations(true)
            .with_icon(load_icon()),
        // Enable vsync in CPU mode to reduce extra swaps
        vsync: !use_gpu,
        persist_window: true,
        renderer: if use_gpu {
            eframe::Renderer::Wgpu
        } else {
            eframe::Renderer::Glow
        },
        wgpu_options: eframe::egui_wgpu::WgpuConfiguration {
            present_mode: eframe::egui_wgpu::wgpu::PresentMode::Fifo,
            ..Default::default()
        },
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(MusicPlayerApp::new(cc, use_gpu)))),
    )
}

/// Window icon: green square with a white music note
fn load_icon() -> egui::IconData {
    let size = 64usize;
    let (r, g, b) = constants::ACCENT_COLOR_RGB;
    let mut pixels = vec![0u8; size * size * 4];

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let brightness = 1.0 - (y as f32 / size as f32) * 0.3;
            pixels[idx] = (r as f32 * brightness) as u8;
            pixels[idx + 1] = (g as f32 * brightness) as u8;
            pixels[idx + 2] = (b as f32 * brightness) as u8;
            pixels[idx + 3] = 255;
        }
    }

    let center = size / 2;
    let mut paint = |x: usize, y: usize| {
        if x < size && y < size {
            let idx = (y * size + x) * 4;
            pixels[idx..idx + 4].copy_from_slice(&[255, 255, 255, 255]);
        }
    };

    // Stem
    for y in (center - 16)..(center + 4) {
        for x in (center + 4)..(center + 8) {
            paint(x, y);
        }
    }
    // Head
    for y in center..(center + 10) {
        for x in (center - 6)..(center + 4) {
            let dx = x as i32 - center as i32;
            let dy = y as i32 - (center + 5) as i32;
            if dx * dx + dy * dy < 25 {
                paint(x, y);
            }
        }
    }

    egui::IconData {
        rgba: pixels,
        width: size as u32,
        height: size as u32,
    }
}

/// Pick the renderer: wgpu only on a dedicated GPU, glow everywhere else
/// (integrated GPUs burn CPU under wgpu). Returns (use_gpu, description).
fn should_use_gpu() -> (bool, String) {
    use eframe::egui_wgpu::wgpu;

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapters: Vec<wgpu::AdapterInfo> = instance
        .enumerate_adapters(wgpu::Backends::all())
        .iter()
        .map(|adapter| adapter.get_info())
        .collect();

    log::info!("[GPU] Scanning {} adapter(s)...", adapters.len());
    for info in &adapters {
        log::info!(
            "[GPU] Found: {} | Type: {:?} | Backend: {:?}",
            info.name,
            info.device_type,
            info.backend
        );
    }

    let find = |kind: wgpu::DeviceType| {
        adapters
            .iter()
            .find(|info| info.device_type == kind)
            .map(|info| info.name.clone())
    };

    if let Some(name) = find(wgpu::DeviceType::DiscreteGpu) {
        (true, format!("{} (Dedicated)", name))
    } else if let Some(name) = find(wgpu::DeviceType::IntegratedGpu) {
        log::warn!("[GPU] Only integrated GPU available, using CPU rendering");
        (false, format!("{} (iGPU)", name))
    } else if adapters.is_empty() {
        log::warn!("[GPU] No GPU found - using CPU rendering");
        (false, "No GPU found".to_string())
    } else {
        log::warn!("[GPU] No dedicated/integrated GPU found - using CPU rendering");
        (false, "No suitable GPU".to_string())
    }
}
