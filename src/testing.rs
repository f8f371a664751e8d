//! In-memory stand-ins for the browser capabilities.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::notification::{Notifier, Severity, ToastSurface};
use crate::platform::{SectionSpan, Storage, Viewport};
use crate::timing::Timers;

struct Scheduled {
    due: u32,
    seq: u64,
    callback: Box<dyn FnOnce()>,
    cancelled: Rc<Cell<bool>>,
}

#[derive(Default)]
struct Clock {
    now: u32,
    seq: u64,
    queue: Vec<Scheduled>,
}

/// A clock that only moves when told to.
#[derive(Clone, Default)]
pub struct ManualTimers {
    clock: Rc<RefCell<Clock>>,
}

pub struct ManualHandle {
    cancelled: Rc<Cell<bool>>,
    detached: bool,
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        if !self.detached {
            self.cancelled.set(true);
        }
    }
}

impl ManualTimers {
    pub fn now(&self) -> u32 {
        self.clock.borrow().now
    }

    pub fn advance(&self, millis: u32) {
        let target = self.clock.borrow().now + millis;
        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                clock.queue.retain(|s| !s.cancelled.get());
                let earliest = clock
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.due <= target)
                    .min_by_key(|(_, s)| (s.due, s.seq))
                    .map(|(i, _)| i);
                earliest.map(|i| {
                    let scheduled = clock.queue.remove(i);
                    clock.now = scheduled.due;
                    scheduled
                })
            };
            match next {
                Some(scheduled) => (scheduled.callback)(),
                None => break,
            }
        }
        self.clock.borrow_mut().now = target;
    }
}

impl Timers for ManualTimers {
    type Handle = ManualHandle;

    fn after(&self, millis: u32, callback: Box<dyn FnOnce()>) -> ManualHandle {
        let cancelled = Rc::new(Cell::new(false));
        let mut clock = self.clock.borrow_mut();
        clock.seq += 1;
        let scheduled = Scheduled {
            due: clock.now + millis,
            seq: clock.seq,
            callback,
            cancelled: cancelled.clone(),
        };
        clock.queue.push(scheduled);
        ManualHandle {
            cancelled,
            detached: false,
        }
    }

    fn detach(&self, mut handle: ManualHandle) {
        handle.detached = true;
    }
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn with(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage.set(key, value);
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

/// Storage that is not available at all (private mode, blocked cookies).
pub struct NoStorage;

impl Storage for NoStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) {}
}

#[derive(Default)]
pub struct FakeViewport {
    pub scroll_y: Cell<f64>,
    pub sections: Vec<SectionSpan>,
    pub scrolled_to: RefCell<Vec<f64>>,
}

impl FakeViewport {
    pub fn with_sections(sections: &[(&str, f64, f64)]) -> Self {
        Self {
            sections: sections
                .iter()
                .map(|(id, top, height)| SectionSpan {
                    id: id.to_string(),
                    top: *top,
                    height: *height,
                })
                .collect(),
            ..Self::default()
        }
    }
}

impl Viewport for FakeViewport {
    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn scroll_to(&self, y: f64) {
        self.scroll_y.set(y);
        self.scrolled_to.borrow_mut().push(y);
    }

    fn sections(&self) -> Vec<SectionSpan> {
        self.sections.clone()
    }

    fn element_top(&self, id: &str) -> Option<f64> {
        self.sections.iter().find(|s| s.id == id).map(|s| s.top)
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Rc<RefCell<Vec<(String, Severity)>>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.sent.borrow_mut().push((message.to_string(), severity));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FakePanel {
    pub id: usize,
    pub message: String,
    pub severity: Severity,
    pub shown: bool,
}

/// Records panels the way the document would hold them.
#[derive(Default)]
pub struct FakeToasts {
    pub panels: RefCell<Vec<FakePanel>>,
    pub dismissers: RefCell<HashMap<usize, Rc<dyn Fn()>>>,
    next: Cell<usize>,
}

impl FakeToasts {
    pub fn click_close(&self, id: usize) {
        let dismiss = self.dismissers.borrow().get(&id).cloned();
        if let Some(dismiss) = dismiss {
            dismiss();
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.panels.borrow().iter().map(|p| p.message.clone()).collect()
    }
}

impl ToastSurface for FakeToasts {
    type Panel = usize;

    fn clear_all(&self) {
        self.panels.borrow_mut().clear();
    }

    fn mount(&self, message: &str, severity: Severity, dismiss: Rc<dyn Fn()>) -> Option<usize> {
        let id = self.next.get();
        self.next.set(id + 1);
        self.panels.borrow_mut().push(FakePanel {
            id,
            message: message.to_string(),
            severity,
            shown: false,
        });
        self.dismissers.borrow_mut().insert(id, dismiss);
        Some(id)
    }

    fn set_shown(&self, panel: &usize, shown: bool) {
        if let Some(p) = self.panels.borrow_mut().iter_mut().find(|p| p.id == *panel) {
            p.shown = shown;
        }
    }

    fn remove(&self, panel: &usize) {
        self.panels.borrow_mut().retain(|p| p.id != *panel);
    }
}
