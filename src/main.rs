mod action_bar;
mod app;
mod calibration;
mod canvas;
mod collection;
mod dialogs;
mod dispatcher;
mod editor;
mod error;
mod export;
mod geometry;
mod host;
mod mapping;
mod picture;
mod session;
mod settings;
mod shape;
mod shape_list;
mod theme;
mod toolbar;
mod ui_controls;

use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let viewport = egui::ViewportBuilder::default()
        .with_title("ROI Mapper")
        .with_inner_size([1280.0, 820.0])
        .with_min_inner_size([720.0, 480.0]);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "ROI Mapper",
        options,
        Box::new(|cc| Box::new(app::RoiMapperApp::new(cc))),
    )
}
