//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting Map Pinboard");
    pinboard_app::ShortcutRegistry::print_all();

    let config = pinboard_app::AppConfig {
        pinboard: pinboard_core::PinboardConfig::from_env(),
        ..pinboard_app::AppConfig::default()
    };

    if let Err(e) = pollster::block_on(pinboard_app::App::run_with_config(config)) {
        log::error!("Map Pinboard exited with an error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
