//! Transient toast notifications. At most one is on screen at a time.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use web_sys::Element;
use yew::AppHandle;

use crate::components::notification::{ensure_notification_styles, Toast, ToastProps};
use crate::config::{NOTIFICATION_ENTER_DELAY_MS, NOTIFICATION_EXIT_MS, NOTIFICATION_TIMEOUT_MS};
use crate::platform::{body, document, query_all};
use crate::timing::{BrowserTimers, Timers};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    #[default]
    Info,
}

impl Severity {
    /// Anything unrecognised is shown as info.
    pub fn parse(value: &str) -> Self {
        match value {
            "success" => Severity::Success,
            "error" => Severity::Error,
            _ => Severity::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }

    pub fn accent(self) -> &'static str {
        match self {
            Severity::Success => "#10b981",
            Severity::Error => "#ef4444",
            Severity::Info => "#3b82f6",
        }
    }
}

pub trait Notifier {
    fn notify(&self, message: &str, severity: Severity);
}

/// Where panels are drawn.
pub trait ToastSurface: 'static {
    type Panel: Clone + 'static;

    /// Removes every notification panel currently in the document.
    fn clear_all(&self);
    fn mount(&self, message: &str, severity: Severity, dismiss: Rc<dyn Fn()>)
        -> Option<Self::Panel>;
    fn set_shown(&self, panel: &Self::Panel, shown: bool);
    /// Must tolerate panels that were already removed.
    fn remove(&self, panel: &Self::Panel);
}

struct Active<P> {
    id: u64,
    panel: P,
}

struct Inner<S: ToastSurface, T: Timers> {
    surface: S,
    timers: T,
    next_id: Cell<u64>,
    current: RefCell<Option<Active<S::Panel>>>,
}

pub struct NotificationCenter<S: ToastSurface, T: Timers> {
    inner: Rc<Inner<S, T>>,
}

impl<S: ToastSurface, T: Timers> Clone for NotificationCenter<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: ToastSurface, T: Timers> NotificationCenter<S, T> {
    pub fn new(surface: S, timers: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                surface,
                timers,
                next_id: Cell::new(0),
                current: RefCell::new(None),
            }),
        }
    }

    pub fn surface(&self) -> &S {
        &self.inner.surface
    }

    /// Id of the notification currently on screen.
    pub fn current(&self) -> Option<u64> {
        self.inner.current.borrow().as_ref().map(|a| a.id)
    }

    pub fn show(&self, message: &str, severity: Severity) -> u64 {
        let previous = self.inner.current.borrow_mut().take();
        if let Some(previous) = previous {
            self.inner.surface.remove(&previous.panel);
        }
        self.inner.surface.clear_all();

        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let weak = Rc::downgrade(&self.inner);
        let dismiss: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                NotificationCenter { inner }.dismiss(id);
            }
        });
        let Some(panel) = self.inner.surface.mount(message, severity, dismiss) else {
            log::warn!("Could not display notification: {}", message);
            return id;
        };

        // Pending timers are left to run; each checks the panel is still current.
        let weak = Rc::downgrade(&self.inner);
        let shown_panel = panel.clone();
        self.inner.timers.spawn_after(
            NOTIFICATION_ENTER_DELAY_MS,
            Box::new(move || {
                if let Some(inner) = still_current(&weak, id) {
                    inner.surface.set_shown(&shown_panel, true);
                }
            }),
        );
        let weak = Rc::downgrade(&self.inner);
        self.inner.timers.spawn_after(
            NOTIFICATION_TIMEOUT_MS,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    NotificationCenter { inner }.dismiss(id);
                }
            }),
        );

        *self.inner.current.borrow_mut() = Some(Active { id, panel });
        id
    }

    /// Animates the panel out and removes it. Returns false if `id` is not on screen.
    pub fn dismiss(&self, id: u64) -> bool {
        let active = {
            let mut current = self.inner.current.borrow_mut();
            match current.as_ref() {
                Some(active) if active.id == id => current.take(),
                _ => None,
            }
        };
        let Some(Active { panel, .. }) = active else {
            return false;
        };

        self.inner.surface.set_shown(&panel, false);
        let weak = Rc::downgrade(&self.inner);
        self.inner.timers.spawn_after(
            NOTIFICATION_EXIT_MS,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.surface.remove(&panel);
                }
            }),
        );
        true
    }
}

fn still_current<S: ToastSurface, T: Timers>(
    weak: &Weak<Inner<S, T>>,
    id: u64,
) -> Option<Rc<Inner<S, T>>> {
    let inner = weak.upgrade()?;
    let is_current = inner.current.borrow().as_ref().map(|a| a.id) == Some(id);
    is_current.then_some(inner)
}

impl<S: ToastSurface, T: Timers> Notifier for NotificationCenter<S, T> {
    fn notify(&self, message: &str, severity: Severity) {
        self.show(message, severity);
    }
}

#[derive(Clone)]
pub struct DomPanel {
    host: Element,
    app: Rc<RefCell<Option<AppHandle<Toast>>>>,
}

/// Mounts each panel as its own Yew app under `<body>`.
pub struct DomToasts;

impl ToastSurface for DomToasts {
    type Panel = DomPanel;

    fn clear_all(&self) {
        for host in query_all(".notification-host") {
            host.remove();
        }
        for panel in query_all(".notification") {
            panel.remove();
        }
    }

    fn mount(
        &self,
        message: &str,
        severity: Severity,
        dismiss: Rc<dyn Fn()>,
    ) -> Option<DomPanel> {
        ensure_notification_styles();
        let host = document()?.create_element("div").ok()?;
        host.set_class_name("notification-host");
        body()?.append_child(&host).ok()?;
        let props = ToastProps {
            message: message.to_string().into(),
            severity,
            on_dismiss: yew::Callback::from(move |_| dismiss()),
        };
        let app = yew::Renderer::<Toast>::with_root_and_props(host.clone(), props).render();
        Some(DomPanel {
            host,
            app: Rc::new(RefCell::new(Some(app))),
        })
    }

    fn set_shown(&self, panel: &DomPanel, shown: bool) {
        if let Ok(Some(el)) = panel.host.query_selector(".notification") {
            let _ = el.class_list().toggle_with_force("show", shown);
        }
    }

    fn remove(&self, panel: &DomPanel) {
        if let Some(app) = panel.app.borrow_mut().take() {
            app.destroy();
        }
        panel.host.remove();
    }
}

thread_local! {
    static CENTER: NotificationCenter<DomToasts, BrowserTimers> =
        NotificationCenter::new(DomToasts, BrowserTimers);
}

/// Shows a notification on the page.
pub fn notify(message: &str, severity: Severity) {
    log::debug!("Notification ({}): {}", severity.as_str(), message);
    CENTER.with(|center| {
        center.show(message, severity);
    });
}

/// Zero-sized handle to the page-wide notification center.
#[derive(Clone, Copy, Default)]
pub struct PageNotifier;

impl Notifier for PageNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        notify(message, severity);
    }
}
