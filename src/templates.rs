use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, MouseEvent};

use crate::notification::{notify, Severity};
use crate::platform::{keep, listen, query_all};

pub const COMING_SOON: &str = "This template is coming soon! I'll notify you when it's available.";

/// Expanded flags, one per template card.
#[derive(Debug, Default)]
pub struct TemplateCards {
    expanded: Vec<bool>,
}

impl TemplateCards {
    pub fn new(count: usize) -> Self {
        Self {
            expanded: vec![false; count],
        }
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.get(index).copied().unwrap_or(false)
    }

    /// Clicks on a nested link or button leave the card alone.
    pub fn click(&mut self, index: usize, on_control: bool) -> Option<bool> {
        if on_control {
            return None;
        }
        let expanded = self.expanded.get_mut(index)?;
        *expanded = !*expanded;
        Some(*expanded)
    }
}

fn clicked_control(event: &MouseEvent) -> bool {
    let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return false;
    };
    ["a", "button"]
        .iter()
        .any(|selector| target.closest(selector).ok().flatten().is_some())
}

pub fn init() {
    for button in query_all(".cta-button.disabled") {
        keep(listen(&button, "click", |event: MouseEvent| {
            event.prevent_default();
            notify(COMING_SOON, Severity::Info);
        }));
    }

    let cards = query_all(".template-card");
    let state = Rc::new(RefCell::new(TemplateCards::new(cards.len())));
    for (index, card) in cards.iter().enumerate() {
        let state = state.clone();
        let target = card.clone();
        keep(listen(card, "click", move |event: MouseEvent| {
            let toggled = state.borrow_mut().click(index, clicked_control(&event));
            if let Some(expanded) = toggled {
                let _ = target.class_list().toggle_with_force("expanded", expanded);
            }
        }));
    }
}
