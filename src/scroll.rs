//! Eased window scrolling driven by `requestAnimationFrame`.
//!
//! Starting a new scroll cancels the one in flight, so two animations never
//! fight over the scroll position.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{window, Element, MouseEvent};

use crate::config::{SCROLL_DURATION_MS, SCROLL_TARGET_OFFSET};
use crate::platform::{document, keep, listen, BrowserViewport, Viewport};

/// Quadratic ease-in-out: `t` elapsed, `b` start, `c` change, `d` duration.
pub fn ease_in_out_quad(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let mut t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t * t + b;
    }
    t -= 1.0;
    -c / 2.0 * (t * (t - 2.0) - 1.0) + b
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub position: f64,
    pub finished: bool,
}

#[derive(Clone, Debug)]
pub struct ScrollAnimation {
    from: f64,
    distance: f64,
    duration: f64,
    started_at: Option<f64>,
}

impl ScrollAnimation {
    pub fn new(from: f64, to: f64, duration: f64) -> Self {
        Self {
            from,
            distance: to - from,
            duration,
            started_at: None,
        }
    }

    pub fn target(&self) -> f64 {
        self.from + self.distance
    }

    /// The first sample pins the start time.
    pub fn sample(&mut self, now: f64) -> Frame {
        let started_at = *self.started_at.get_or_insert(now);
        let elapsed = (now - started_at).max(0.0);
        if elapsed >= self.duration || self.duration <= 0.0 {
            return Frame {
                position: self.target(),
                finished: true,
            };
        }
        Frame {
            position: ease_in_out_quad(elapsed, self.from, self.distance, self.duration),
            finished: false,
        }
    }

    /// Samples one frame and applies it to the viewport.
    pub fn step(&mut self, now: f64, viewport: &impl Viewport) -> bool {
        let frame = self.sample(now);
        viewport.scroll_to(frame.position);
        frame.finished
    }
}

thread_local! {
    static GENERATION: Cell<u64> = Cell::new(0);
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(callback: &FrameCallback) {
    if let (Some(window), Some(closure)) = (window(), callback.borrow().as_ref()) {
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    }
}

/// Scrolls the window to `target` over `duration` ms.
pub fn smooth_scroll_to(target: f64, duration: f64) {
    let generation = GENERATION.with(|g| {
        g.set(g.get() + 1);
        g.get()
    });
    let viewport = BrowserViewport;
    let mut animation = ScrollAnimation::new(viewport.scroll_y(), target, duration);

    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = callback.clone();
    *callback.borrow_mut() = Some(Closure::new(move |now: f64| {
        let superseded = GENERATION.with(|g| g.get()) != generation;
        if superseded || animation.step(now, &viewport) {
            // Break the self-reference so the closure is freed.
            next.borrow_mut().take();
            return;
        }
        request_frame(&next);
    }));
    request_frame(&callback);
}

/// Scroll position that puts the section just below the fixed header.
pub fn section_offset(top: f64) -> f64 {
    top - SCROLL_TARGET_OFFSET
}

pub fn scroll_to_section(id: &str) -> bool {
    match BrowserViewport.element_top(id) {
        Some(top) => {
            smooth_scroll_to(section_offset(top), SCROLL_DURATION_MS);
            true
        }
        None => false,
    }
}

/// Catches in-page anchors the navigation controller does not own.
pub fn init() {
    let Some(document) = document() else {
        return;
    };
    keep(listen(&document, "click", |event: MouseEvent| {
        if event.default_prevented() {
            return;
        }
        let Some(anchor) = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest("a[href^=\"#\"]").ok().flatten())
        else {
            return;
        };
        let href = anchor.get_attribute("href").unwrap_or_default();
        let id = href.trim_start_matches('#');
        if id.is_empty() {
            return;
        }
        if BrowserViewport.element_top(id).is_some() {
            event.prevent_default();
            scroll_to_section(id);
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeViewport;

    #[test]
    fn test_ease_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_quad(0.0, 0.0, 800.0, 800.0), 0.0);
        assert_eq!(ease_in_out_quad(400.0, 0.0, 800.0, 800.0), 400.0);
        assert_eq!(ease_in_out_quad(800.0, 0.0, 800.0, 800.0), 800.0);
        // Slow at the start, symmetric around the middle.
        assert!(ease_in_out_quad(100.0, 0.0, 800.0, 800.0) < 100.0);
        let early = ease_in_out_quad(200.0, 0.0, 800.0, 800.0);
        let late = ease_in_out_quad(600.0, 0.0, 800.0, 800.0);
        assert!((early + late - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_scroll_is_monotonic_and_lands_on_target() {
        let viewport = FakeViewport::default();
        let mut animation = ScrollAnimation::new(0.0, 800.0, 800.0);

        let mut now = 1_000.0;
        while !animation.step(now, &viewport) {
            now += 16.7;
        }

        let positions = viewport.scrolled_to.borrow();
        assert!(positions.len() > 40);
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*positions.last().unwrap(), 800.0);
    }

    #[test]
    fn test_late_frame_does_not_overshoot() {
        let mut animation = ScrollAnimation::new(0.0, 800.0, 800.0);
        animation.sample(0.0);
        let frame = animation.sample(950.0);
        assert_eq!(frame, Frame { position: 800.0, finished: true });
    }

    #[test]
    fn test_scroll_upwards() {
        let mut animation = ScrollAnimation::new(1_200.0, 300.0, 800.0);
        assert_eq!(animation.sample(0.0).position, 1_200.0);
        let mid = animation.sample(400.0).position;
        assert!((mid - 750.0).abs() < 1e-9);
        assert_eq!(animation.sample(800.0).position, 300.0);
    }

    #[test]
    fn test_section_offset() {
        assert_eq!(section_offset(500.0), 420.0);
    }
}
