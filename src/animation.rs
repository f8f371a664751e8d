use std::rc::Rc;

use web_sys::{Element, MouseEvent};

use crate::config::{
    REVEAL_ROOT_MARGIN, REVEAL_SELECTOR, REVEAL_THRESHOLD, STAGGER_GRID_CLASSES, TILT_SELECTOR,
    TILT_THROTTLE_MS,
};
use crate::platform::{keep, listen, observe_intersections, query_all, set_style, ObserverOptions};
use crate::timing::{throttle, BrowserTimers};

pub const HIDDEN: [(&str, &str); 2] = [("opacity", "0"), ("transform", "translateY(30px)")];

pub const REVEALED: [(&str, &str); 3] = [
    ("opacity", "1"),
    ("transform", "translateY(0)"),
    ("transition", "opacity 0.6s ease, transform 0.6s ease"),
];

pub const NEUTRAL_TILT: &str = "perspective(1000px) rotateX(0) rotateY(0) translateZ(0)";
const SKILL_LIFT: &str = "translateY(-4px) scale(1.05)";
const SKILL_REST: &str = "translateY(0) scale(1)";

/// `transition-delay` for the `index`-th child of a staggered grid.
pub fn stagger_delay(index: usize) -> String {
    format!("{:.1}s", index as f64 * 0.1)
}

pub fn is_stagger_grid(has_class: impl Fn(&str) -> bool) -> bool {
    STAGGER_GRID_CLASSES.iter().any(|class| has_class(class))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tilt {
    pub rotate_x: f64,
    pub rotate_y: f64,
}

impl Tilt {
    /// `x`/`y` are the pointer offsets from the card's top-left corner.
    pub fn from_pointer(width: f64, height: f64, x: f64, y: f64) -> Self {
        Self {
            rotate_x: (height / 2.0 - y) / 25.0,
            rotate_y: (x - width / 2.0) / 25.0,
        }
    }

    pub fn transform(&self) -> String {
        format!(
            "perspective(1000px) rotateX({}deg) rotateY({}deg) translateZ(10px)",
            self.rotate_x, self.rotate_y
        )
    }
}

fn reveal(el: &Element) {
    for (property, value) in REVEALED {
        set_style(el, property, value);
    }
    if is_stagger_grid(|class| el.class_list().contains(class)) {
        let children = el.children();
        for i in 0..children.length() {
            if let Some(child) = children.item(i) {
                set_style(&child, "transition-delay", &stagger_delay(i as usize));
            }
        }
    }
}

fn init_tilt(card: &Element) {
    let target = card.clone();
    let tilt = Rc::new(throttle(BrowserTimers, TILT_THROTTLE_MS, move |event: MouseEvent| {
        let rect = target.get_bounding_client_rect();
        let x = event.client_x() as f64 - rect.left();
        let y = event.client_y() as f64 - rect.top();
        let tilt = Tilt::from_pointer(rect.width(), rect.height(), x, y);
        set_style(&target, "transform", &tilt.transform());
    }));
    keep(listen(card, "mousemove", move |event: MouseEvent| {
        tilt.call(event);
    }));

    let target = card.clone();
    keep(listen(card, "mouseleave", move |_: MouseEvent| {
        set_style(&target, "transform", NEUTRAL_TILT);
    }));
}

fn init_hover_effects() {
    for tag in query_all(".skill-tag") {
        let target = tag.clone();
        keep(listen(&tag, "mouseenter", move |_: MouseEvent| {
            set_style(&target, "transform", SKILL_LIFT);
        }));
        let target = tag.clone();
        keep(listen(&tag, "mouseleave", move |_: MouseEvent| {
            set_style(&target, "transform", SKILL_REST);
        }));
    }

    for card in query_all(TILT_SELECTOR) {
        init_tilt(&card);
    }
}

pub fn init() {
    let elements = query_all(REVEAL_SELECTOR);
    for el in &elements {
        for (property, value) in HIDDEN {
            set_style(el, property, value);
        }
    }

    let options = ObserverOptions {
        threshold: REVEAL_THRESHOLD,
        root_margin: REVEAL_ROOT_MARGIN,
    };
    match observe_intersections(&elements, options, |el, observer| {
        reveal(&el);
        observer.unobserve(&el);
    }) {
        Some(subscription) => keep(subscription),
        None => {
            // Without an observer nothing would ever fade in.
            for el in &elements {
                reveal(el);
            }
        }
    }
    log::debug!("Watching {} elements for entrance animation", elements.len());

    init_hover_effects();
}
