mod app;
mod bus_monitor;
mod cache;
mod catalog;
mod config;
mod controller;
mod error;
mod gst_logger;
mod loader;
mod message;
mod state;
mod store;
mod ui;

use env_logger::{Builder, Target};
use log::LevelFilter;

use config::KioskConfig;
use state::App;

fn init_logger() {
    Builder::new()
        .target(Target::Stdout)
        .filter_level(LevelFilter::Warn)
        .filter_module("faq_kiosk", LevelFilter::Debug)
        .init();
}

fn main() -> iced::Result {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        init_logger();
    }

    let config = KioskConfig::from_environment();
    log::debug!("Configuration: {:?}", config);

    iced::application(move || App::boot(config.clone()), App::update, App::view)
        .title(App::title)
        .subscription(App::subscription)
        .window_size((1280.0, 800.0))
        .run()
}
