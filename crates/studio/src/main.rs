mod app;
mod viewport;

// Re-export library modules so that `crate::assets`, `crate::export`,
// etc. resolve to the lib crate types everywhere in the binary.
pub use decal_studio_lib::assets;
pub use decal_studio_lib::compose;
pub use decal_studio_lib::decal;
pub use decal_studio_lib::export;
pub use decal_studio_lib::items;
pub use decal_studio_lib::state;
pub use decal_studio_lib::studio;

use app::StudioApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "decal_studio=info".into()),
        )
        .init();

    // Parse --model <path> argument
    let model_path = parse_model_arg();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Decal Studio — garment decoration")
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "decal-studio",
        native_options,
        Box::new(move |cc| Ok(Box::new(StudioApp::new(cc, model_path)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_model_arg() -> Option<std::path::PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--model" && i + 1 < args.len() {
            let path = std::path::PathBuf::from(&args[i + 1]);
            if path.exists() {
                return Some(path);
            }
            tracing::error!("Model file not found: {}", path.display());
            break;
        }
        i += 1;
    }
    None
}
