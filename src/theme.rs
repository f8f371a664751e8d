use std::cell::RefCell;

use web_sys::{window, Element, KeyboardEvent, MediaQueryListEvent, MouseEvent};

use crate::config::{DARK_SCHEME_QUERY, THEME_STORAGE_KEY};
use crate::platform::{body, document, keep, listen, query, LocalStorage, Storage};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

/// Stored preference wins, then the OS signal, then light.
pub fn resolve(stored: Option<Theme>, prefers_dark: bool) -> Theme {
    stored.unwrap_or(Theme::from_system(prefers_dark))
}

pub struct ThemeController<S: Storage> {
    storage: S,
    theme: Theme,
    explicit: bool,
}

impl<S: Storage> ThemeController<S> {
    pub fn load(storage: S, prefers_dark: bool) -> Self {
        let stored = storage
            .get(THEME_STORAGE_KEY)
            .and_then(|value| Theme::parse(&value));
        Self {
            theme: resolve(stored, prefers_dark),
            explicit: stored.is_some(),
            storage,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn has_explicit_preference(&self) -> bool {
        self.explicit
    }

    /// Applies and persists a user choice.
    pub fn set(&mut self, theme: Theme) -> Theme {
        self.theme = theme;
        self.explicit = true;
        self.storage.set(THEME_STORAGE_KEY, theme.as_str());
        theme
    }

    pub fn toggle(&mut self) -> Theme {
        self.set(self.theme.opposite())
    }

    /// Follows the OS setting unless the user already chose. Never persists.
    pub fn system_changed(&mut self, prefers_dark: bool) -> Option<Theme> {
        if self.explicit {
            return None;
        }
        self.theme = Theme::from_system(prefers_dark);
        Some(self.theme)
    }
}

thread_local! {
    static CONTROLLER: RefCell<Option<ThemeController<LocalStorage>>> = RefCell::new(None);
}

fn system_prefers_dark() -> bool {
    window()
        .and_then(|w| w.match_media(DARK_SCHEME_QUERY).ok().flatten())
        .map(|list| list.matches())
        .unwrap_or(false)
}

fn apply(theme: Theme) {
    let dark = theme == Theme::Dark;
    if let Some(body) = body() {
        let _ = body.class_list().toggle_with_force("dark-theme", dark);
    }
    if let Some(icon) = query("#themeToggle i") {
        let (from, to) = if dark {
            ("fa-moon", "fa-sun")
        } else {
            ("fa-sun", "fa-moon")
        };
        let _ = icon.class_list().replace(from, to);
    }
}

fn with_controller<R>(f: impl FnOnce(&mut ThemeController<LocalStorage>) -> R) -> Option<R> {
    CONTROLLER.with(|controller| controller.borrow_mut().as_mut().map(f))
}

fn toggle_and_apply() {
    if let Some(theme) = with_controller(|c| c.toggle()) {
        log::debug!("Theme toggled to {}", theme.as_str());
        apply(theme);
    }
}

/// Programmatic theme change, used by the public `Portfolio.setTheme`.
pub fn set_theme(value: &str) {
    let Some(theme) = Theme::parse(value) else {
        log::warn!("Ignoring unknown theme {:?}", value);
        return;
    };
    let applied = with_controller(|c| c.set(theme)).unwrap_or_else(|| {
        LocalStorage::open().set(THEME_STORAGE_KEY, theme.as_str());
        theme
    });
    apply(applied);
}

pub fn current_theme() -> Option<Theme> {
    with_controller(|c| c.theme())
}

fn create_toggle() -> Option<Element> {
    let nav = query(".nav-container")?;
    let button = document()?.create_element("button").ok()?;
    button.set_class_name("theme-toggle");
    button.set_id("themeToggle");
    let _ = button.set_attribute("aria-label", "Toggle dark mode");
    button.set_inner_html("<i class=\"fas fa-moon\"></i>");
    nav.append_child(&button).ok()?;
    Some(button)
}

pub fn init() {
    let Some(toggle) = query("#themeToggle").or_else(create_toggle) else {
        log::debug!("No theme toggle or nav container, skipping theme controller");
        return;
    };

    let controller = ThemeController::load(LocalStorage::open(), system_prefers_dark());
    let theme = controller.theme();
    CONTROLLER.with(|c| *c.borrow_mut() = Some(controller));
    apply(theme);

    if let Some(list) = window().and_then(|w| w.match_media(DARK_SCHEME_QUERY).ok().flatten()) {
        keep(listen(&list, "change", |event: MediaQueryListEvent| {
            if let Some(Some(theme)) = with_controller(|c| c.system_changed(event.matches())) {
                apply(theme);
            }
        }));
    }

    keep(listen(&toggle, "click", |_: MouseEvent| toggle_and_apply()));
    keep(listen(&toggle, "keydown", |event: KeyboardEvent| {
        let key = event.key();
        if key == "Enter" || key == " " {
            event.prevent_default();
            toggle_and_apply();
        }
    }));
}
