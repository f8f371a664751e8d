use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlSelectElement};

use crate::config::SERVICE_SELECT_SELECTOR;
use crate::platform::{document, keep, listen, query, set_style};

const PRICE_RANGES: [(&str, &str); 6] = [
    ("landing-page", "$300 - $500"),
    ("portfolio-site", "$800 - $1200"),
    ("educational-site", "$400 - $600"),
    ("website-fix", "$50 - $100 per hour"),
    ("template", "$19 per template"),
    ("consultation", "Starting at $50 per hour"),
];

pub const DISCLAIMER: &str = "Final price may vary based on project requirements";

pub fn price_for(service: &str) -> Option<&'static str> {
    PRICE_RANGES
        .iter()
        .find(|(key, _)| *key == service)
        .map(|(_, price)| *price)
}

#[derive(Debug, Default)]
pub struct PricingCalculator {
    estimate: Option<&'static str>,
}

impl PricingCalculator {
    /// Starts from whatever the select already shows.
    pub fn from_selection(service: &str) -> Self {
        Self {
            estimate: price_for(service),
        }
    }

    /// Unknown services hide the estimate.
    pub fn select(&mut self, service: &str) -> Option<&'static str> {
        self.estimate = price_for(service);
        self.estimate
    }

    pub fn estimate(&self) -> Option<&'static str> {
        self.estimate
    }

    pub fn is_visible(&self) -> bool {
        self.estimate.is_some()
    }
}

/// The estimate block after the select, created on first use.
fn display_for(select: &Element) -> Option<Element> {
    let parent = select.parent_element()?;
    if let Ok(Some(existing)) = parent.query_selector(".budget-estimate") {
        return Some(existing);
    }
    create_display(&parent)
}

fn create_display(parent: &Element) -> Option<Element> {
    let display = document()?.create_element("div").ok()?;
    display.set_class_name("budget-estimate");
    set_style(&display, "margin-top", "1rem");
    set_style(&display, "padding", "1rem");
    set_style(&display, "background", "var(--border-light)");
    set_style(&display, "border-radius", "var(--radius)");
    set_style(&display, "display", "none");
    parent.append_child(&display).ok()?;
    Some(display)
}

fn render(calculator: &PricingCalculator, display: &Element) {
    match calculator.estimate() {
        Some(price) => {
            display.set_inner_html(&format!(
                "<strong>Estimated Budget:</strong> {}<br><small>{}</small>",
                price, DISCLAIMER
            ));
            set_style(display, "display", "block");
        }
        None => set_style(display, "display", "none"),
    }
}

pub fn init() {
    let Some(select) = query(SERVICE_SELECT_SELECTOR) else {
        log::debug!("No service select, skipping pricing calculator");
        return;
    };
    let Some(display) = display_for(&select) else {
        return;
    };
    let current = select
        .dyn_ref::<HtmlSelectElement>()
        .map(|s| s.value())
        .unwrap_or_default();
    let calculator = PricingCalculator::from_selection(&current);
    render(&calculator, &display);
    let calculator = Rc::new(RefCell::new(calculator));

    let target = select.clone();
    keep(listen(&select, "change", move |_: Event| {
        let Some(value) = target.dyn_ref::<HtmlSelectElement>().map(|s| s.value()) else {
            return;
        };
        let mut calculator = calculator.borrow_mut();
        calculator.select(&value);
        render(&calculator, &display);
    }));
}
