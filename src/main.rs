use log::info;

mod app;
mod config;
mod components {
    pub mod notification;
    pub mod spinner;
}
mod animation;
mod form;
mod loading;
mod nav;
mod notification;
mod performance;
mod platform;
mod pricing;
mod scroll;
mod templates;
mod theme;
mod timing;

#[cfg(test)]
mod testing;

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting portfolio enhancements");
    app::install_error_handlers();
    app::expose_public_api();
    app::start();
}
