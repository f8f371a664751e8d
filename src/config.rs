use log::Level;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose output while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

pub const THEME_STORAGE_KEY: &str = "portfolio-theme";
pub const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

// Navigation
pub const NAV_PROBE_OFFSET: f64 = 100.0;
pub const NAV_SCROLL_DEBOUNCE_MS: u32 = 25;
pub const SCROLL_TARGET_OFFSET: f64 = 80.0;
pub const SCROLL_DURATION_MS: f64 = 800.0;

// Animations
pub const REVEAL_SELECTOR: &str =
    ".content-section, .project-card, .sidebar-section, .service-card, .featured-item, .template-card";
pub const TILT_SELECTOR: &str = ".project-card, .template-card";
pub const STAGGER_GRID_CLASSES: [&str; 3] = ["services-grid", "projects-grid", "benefits-grid"];
pub const REVEAL_THRESHOLD: f64 = 0.1;
pub const REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";
pub const TILT_THROTTLE_MS: u32 = 16;

// Forms
pub const CONTACT_FORM_SELECTOR: &str = "form[action*=\"formspree\"]";
pub const SERVICE_SELECT_SELECTOR: &str = "select[name=\"service\"]";

// Loading and performance
pub const RESIZE_DEBOUNCE_MS: u32 = 250;

// Notifications
pub const NOTIFICATION_ENTER_DELAY_MS: u32 = 100;
pub const NOTIFICATION_TIMEOUT_MS: u32 = 5_000;
pub const NOTIFICATION_EXIT_MS: u32 = 300;
