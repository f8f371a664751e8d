//! Contact form validation and submission.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;
use std::rc::Rc;

use gloo_net::http::Request;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, Event, FocusEvent, HtmlButtonElement, HtmlFormElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, SubmitEvent,
};

use crate::config::CONTACT_FORM_SELECTOR;
use crate::notification::{Notifier, PageNotifier, Severity};
use crate::platform::{document, keep, listen, query, set_style};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

pub const SENDING_LABEL: &str = "Sending...";
pub const SUCCESS_MESSAGE: &str = "Message sent successfully! I'll get back to you soon.";
pub const FAILURE_MESSAGE: &str =
    "Sorry, there was an error sending your message. Please try again or email me directly.";
const ERROR_COLOR: &str = "#ef4444";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub required: bool,
    pub kind: FieldKind,
    /// Whether the control contributes to the submitted body.
    pub included: bool,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form endpoint answered {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("network error: {0}")]
    Network(String),
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Browser form-data rules: disabled controls, buttons and unchecked
/// checkboxes or radios are left out.
pub fn is_submitted(input_type: &str, checked: bool, disabled: bool) -> bool {
    if disabled {
        return false;
    }
    match input_type {
        "checkbox" | "radio" => checked,
        "submit" | "button" | "reset" | "image" | "file" => false,
        _ => true,
    }
}

/// Selector for the inline error shown under the field called `name`.
pub fn error_selector(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!(".field-error[data-field=\"{}\"]", escaped)
}

pub fn validate(field: &Field) -> Result<(), FieldError> {
    let value = field.value.trim();
    if value.is_empty() {
        return if field.required {
            Err(FieldError::Required)
        } else {
            Ok(())
        };
    }
    if field.kind == FieldKind::Email && !is_valid_email(value) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

/// State of the submit button while a request is in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitControl {
    pub label: String,
    pub disabled: bool,
    original: Option<String>,
}

impl SubmitControl {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
            original: None,
        }
    }

    pub fn begin(&mut self) {
        if self.original.is_none() {
            self.original = Some(std::mem::replace(&mut self.label, SENDING_LABEL.to_string()));
        }
        self.disabled = true;
    }

    pub fn restore(&mut self) {
        if let Some(original) = self.original.take() {
            self.label = original;
        }
        self.disabled = false;
    }
}

#[derive(Debug)]
pub struct ContactForm {
    action: String,
    fields: Vec<Field>,
    errors: BTreeMap<String, FieldError>,
    pub submit: SubmitControl,
}

impl ContactForm {
    pub fn new(action: impl Into<String>, submit_label: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            fields: Vec::new(),
            errors: BTreeMap::new(),
            submit: SubmitControl::new(submit_label),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn set_fields(&mut self, fields: Vec<Field>) {
        self.fields = fields;
    }

    /// The control that speaks for `name`. In a radio group that is the
    /// checked one, if any.
    fn named(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .max_by_key(|f| f.included)
    }

    /// Names of the required fields, each once, in document order.
    pub fn required_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for field in self.fields.iter().filter(|f| f.required) {
            if !names.contains(&field.name) {
                names.push(field.name.clone());
            }
        }
        names
    }

    pub fn error(&self, name: &str) -> Option<FieldError> {
        self.errors.get(name).copied()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn clear_error(&mut self, name: &str) {
        self.errors.remove(name);
    }

    pub fn validate_field(&mut self, name: &str) -> Result<(), FieldError> {
        self.errors.remove(name);
        let Some(field) = self.named(name) else {
            return Ok(());
        };
        let result = validate(field);
        if let Err(error) = result {
            self.errors.insert(name.to_string(), error);
        }
        result
    }

    /// Checks every required field, recording an error for each failure.
    pub fn validate_all(&mut self) -> bool {
        let mut valid = true;
        for name in self.required_names() {
            if self.validate_field(&name).is_err() {
                valid = false;
            }
        }
        valid
    }

    /// `application/x-www-form-urlencoded` body of the named fields.
    pub fn encoded_body(&self) -> String {
        self.fields
            .iter()
            .filter(|f| f.included && !f.name.is_empty())
            .map(|f| {
                format!(
                    "{}={}",
                    urlencoding::encode(&f.name),
                    urlencoding::encode(&f.value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
        self.errors.clear();
    }
}

pub trait FormEndpoint {
    fn post(&self, action: &str, body: String) -> impl Future<Output = Result<(), SubmitError>>;
}

/// What the submission flow needs to reflect back onto the page.
pub trait FormView {
    fn render_submit(&self, control: &SubmitControl);
    fn reset_fields(&self);
}

/// Sends the form and reports the outcome. The button is always restored.
pub async fn submit<E, V, N>(
    form: Rc<RefCell<ContactForm>>,
    endpoint: &E,
    view: &V,
    notifier: &N,
) -> Result<(), SubmitError>
where
    E: FormEndpoint,
    V: FormView,
    N: Notifier,
{
    let (action, body) = {
        let mut form = form.borrow_mut();
        form.submit.begin();
        view.render_submit(&form.submit);
        (form.action.clone(), form.encoded_body())
    };

    let result = endpoint.post(&action, body).await;

    let mut form = form.borrow_mut();
    match &result {
        Ok(()) => {
            notifier.notify(SUCCESS_MESSAGE, Severity::Success);
            form.reset();
            view.reset_fields();
        }
        Err(e) => {
            log::error!("Form submission error: {}", e);
            notifier.notify(FAILURE_MESSAGE, Severity::Error);
        }
    }
    form.submit.restore();
    view.render_submit(&form.submit);
    result
}

#[derive(Deserialize)]
struct FormspreeErrors {
    #[serde(default)]
    errors: Vec<FormspreeError>,
}

#[derive(Deserialize)]
struct FormspreeError {
    message: String,
}

fn rejection_detail(body: &str) -> String {
    match serde_json::from_str::<FormspreeErrors>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.trim().to_string(),
    }
}

pub struct Formspree;

impl FormEndpoint for Formspree {
    async fn post(&self, action: &str, body: String) -> Result<(), SubmitError> {
        let response = Request::post(action)
            .header("Accept", "application/json")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        if response.ok() {
            return Ok(());
        }
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(SubmitError::Rejected {
            status,
            detail: rejection_detail(&text),
        })
    }
}

fn read_field(el: &Element) -> Field {
    let (input_type, value, included) = if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        let input_type = input.type_().to_ascii_lowercase();
        let included = is_submitted(&input_type, input.checked(), input.disabled());
        let value = match input_type.as_str() {
            "checkbox" | "radio" if !input.checked() => String::new(),
            _ => input.value(),
        };
        (input_type, value, included)
    } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        (String::new(), area.value(), !area.disabled())
    } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
        (String::new(), select.value(), !select.disabled())
    } else {
        (String::new(), String::new(), false)
    };
    let disabled = el.has_attribute("disabled");
    Field {
        name: el.get_attribute("name").unwrap_or_default(),
        value,
        // Disabled controls are exempt from validation.
        required: el.has_attribute("required") && !disabled,
        kind: if input_type == "email" { FieldKind::Email } else { FieldKind::Text },
        included,
    }
}

fn clear_field_error(el: &Element) {
    set_style(el, "border-color", "");
    let name = el.get_attribute("name").unwrap_or_default();
    if let Some(parent) = el.parent_element() {
        if let Ok(Some(existing)) = parent.query_selector(&error_selector(&name)) {
            existing.remove();
        }
    }
}

fn show_field_error(el: &Element, error: FieldError) {
    clear_field_error(el);
    set_style(el, "border-color", ERROR_COLOR);
    let (Some(parent), Some(document)) = (el.parent_element(), document()) else {
        return;
    };
    let Ok(node) = document.create_element("div") else {
        return;
    };
    node.set_class_name("field-error");
    let _ = node.set_attribute("data-field", &el.get_attribute("name").unwrap_or_default());
    set_style(&node, "color", ERROR_COLOR);
    set_style(&node, "font-size", "0.875rem");
    set_style(&node, "margin-top", "0.25rem");
    node.set_text_content(Some(&error.to_string()));
    let _ = parent.append_child(&node);
}

fn render_field(el: &Element, error: Option<FieldError>) {
    match error {
        Some(error) => show_field_error(el, error),
        None => clear_field_error(el),
    }
}

struct DomForm {
    form: HtmlFormElement,
    button: Option<HtmlButtonElement>,
}

impl FormView for DomForm {
    fn render_submit(&self, control: &SubmitControl) {
        if let Some(button) = &self.button {
            button.set_text_content(Some(&control.label));
            button.set_disabled(control.disabled);
        }
    }

    fn reset_fields(&self) {
        self.form.reset();
    }
}

fn form_inputs(form: &Element) -> Vec<Element> {
    let Ok(list) = form.query_selector_all("input, textarea, select") else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn init() {
    let Some(form_el) = query(CONTACT_FORM_SELECTOR) else {
        log::debug!("No contact form, skipping form controller");
        return;
    };
    let Ok(form) = form_el.clone().dyn_into::<HtmlFormElement>() else {
        return;
    };
    let button = form_el
        .query_selector("button[type=\"submit\"]")
        .ok()
        .flatten()
        .and_then(|b| b.dyn_into::<HtmlButtonElement>().ok());
    let label = button
        .as_ref()
        .and_then(|b| b.text_content())
        .unwrap_or_default();

    let state = Rc::new(RefCell::new(ContactForm::new(form.action(), label)));
    let view = Rc::new(DomForm { form, button });
    let inputs = Rc::new(form_inputs(&form_el));

    for input in inputs.iter() {
        let target = input.clone();
        let blur_state = state.clone();
        let blur_inputs = inputs.clone();
        keep(listen(input, "blur", move |_: FocusEvent| {
            let name = target.get_attribute("name").unwrap_or_default();
            let mut form = blur_state.borrow_mut();
            form.set_fields(blur_inputs.iter().map(read_field).collect());
            let _ = form.validate_field(&name);
            render_field(&target, form.error(&name));
        }));

        let target = input.clone();
        let input_state = state.clone();
        keep(listen(input, "input", move |_: Event| {
            let name = target.get_attribute("name").unwrap_or_default();
            input_state.borrow_mut().clear_error(&name);
            clear_field_error(&target);
        }));
    }

    keep(listen(&form_el, "submit", move |event: SubmitEvent| {
        event.prevent_default();
        if state.borrow().submit.disabled {
            return;
        }

        let valid = {
            let mut form = state.borrow_mut();
            form.set_fields(inputs.iter().map(read_field).collect());
            let valid = form.validate_all();
            let checked = form.required_names();
            for input in inputs.iter() {
                let name = input.get_attribute("name").unwrap_or_default();
                if checked.contains(&name) {
                    render_field(input, form.error(&name));
                }
            }
            valid
        };
        if !valid {
            log::debug!("Contact form has invalid fields, not submitting");
            return;
        }

        let state = state.clone();
        let view = view.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if submit(state, &Formspree, view.as_ref(), &PageNotifier).await.is_ok() {
                log::info!("Contact form submitted");
            }
        });
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingNotifier;
    use futures::executor::block_on;
    use std::cell::Cell;

    fn field(name: &str, value: &str, required: bool, kind: FieldKind) -> Field {
        Field {
            name: name.into(),
            value: value.into(),
            required,
            kind,
            included: true,
        }
    }

    fn replace(form: &mut ContactForm, field: Field) {
        let mut fields = form.fields().to_vec();
        if let Some(existing) = fields.iter_mut().find(|f| f.name == field.name) {
            *existing = field;
        }
        form.set_fields(fields);
    }

    fn contact_form() -> ContactForm {
        let mut form = ContactForm::new("https://formspree.io/f/abc", "Send Message");
        form.set_fields(vec![
            field("name", "Ada Lovelace", true, FieldKind::Text),
            field("email", "ada@example.com", true, FieldKind::Email),
            field("message", "Hello & welcome", true, FieldKind::Text),
            field("service", "", false, FieldKind::Text),
        ]);
        form
    }

    struct StubEndpoint {
        outcome: Option<u16>,
        bodies: RefCell<Vec<String>>,
    }

    impl StubEndpoint {
        fn answering(status: u16) -> Self {
            Self {
                outcome: Some(status),
                bodies: RefCell::new(Vec::new()),
            }
        }

        fn offline() -> Self {
            Self {
                outcome: None,
                bodies: RefCell::new(Vec::new()),
            }
        }
    }

    impl FormEndpoint for StubEndpoint {
        async fn post(&self, _action: &str, body: String) -> Result<(), SubmitError> {
            self.bodies.borrow_mut().push(body);
            match self.outcome {
                Some(status) if (200..300).contains(&status) => Ok(()),
                Some(status) => Err(SubmitError::Rejected {
                    status,
                    detail: "nope".into(),
                }),
                None => Err(SubmitError::Network("offline".into())),
            }
        }
    }

    #[derive(Default)]
    struct RecordingView {
        renders: RefCell<Vec<SubmitControl>>,
        resets: Cell<usize>,
    }

    impl FormView for RecordingView {
        fn render_submit(&self, control: &SubmitControl) {
            self.renders.borrow_mut().push(control.clone());
        }

        fn reset_fields(&self) {
            self.resets.set(self.resets.get() + 1);
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("@b.co"));
    }

    #[test]
    fn test_empty_required_email_reports_required() {
        let empty = field("email", "   ", true, FieldKind::Email);
        assert_eq!(validate(&empty), Err(FieldError::Required));
        assert_eq!(FieldError::Required.to_string(), "This field is required");

        let bad = field("email", "a@b", true, FieldKind::Email);
        assert_eq!(validate(&bad), Err(FieldError::InvalidEmail));
        assert_eq!(
            FieldError::InvalidEmail.to_string(),
            "Please enter a valid email address"
        );
    }

    #[test]
    fn test_optional_invalid_email_still_checked_on_blur() {
        let optional = field("cc", "nope", false, FieldKind::Email);
        assert_eq!(validate(&optional), Err(FieldError::InvalidEmail));
        let blank = field("cc", "", false, FieldKind::Email);
        assert_eq!(validate(&blank), Ok(()));
    }

    #[test]
    fn test_one_error_per_field() {
        let mut form = contact_form();
        replace(&mut form, field("email", "", true, FieldKind::Email));
        assert!(form.validate_field("email").is_err());
        assert!(form.validate_field("email").is_err());
        assert_eq!(form.error_count(), 1);

        replace(&mut form, field("email", "x", true, FieldKind::Email));
        assert_eq!(form.validate_field("email"), Err(FieldError::InvalidEmail));
        assert_eq!(form.error_count(), 1);

        form.clear_error("email");
        assert_eq!(form.error("email"), None);
    }

    #[test]
    fn test_validate_all_only_blocks_on_required() {
        let mut form = contact_form();
        assert!(form.validate_all());

        replace(&mut form, field("name", "", true, FieldKind::Text));
        replace(&mut form, field("email", "a@b", true, FieldKind::Email));
        assert!(!form.validate_all());
        assert_eq!(form.error("name"), Some(FieldError::Required));
        assert_eq!(form.error("email"), Some(FieldError::InvalidEmail));
        assert_eq!(form.error("message"), None);
    }

    #[test]
    fn test_encoded_body() {
        let form = contact_form();
        assert_eq!(
            form.encoded_body(),
            "name=Ada%20Lovelace&email=ada%40example.com&message=Hello%20%26%20welcome&service="
        );
    }

    #[test]
    fn test_unsubmitted_controls_stay_out_of_body() {
        assert!(is_submitted("text", false, false));
        assert!(is_submitted("checkbox", true, false));
        assert!(!is_submitted("checkbox", false, false));
        assert!(!is_submitted("radio", false, false));
        assert!(!is_submitted("submit", false, false));
        assert!(!is_submitted("email", false, true));

        let mut form = ContactForm::new("https://formspree.io/f/abc", "Send");
        form.set_fields(vec![
            field("name", "Ada", true, FieldKind::Text),
            Field {
                included: false,
                ..field("newsletter", "", false, FieldKind::Text)
            },
            Field {
                included: false,
                ..field("plan", "", false, FieldKind::Text)
            },
            field("plan", "pro", false, FieldKind::Text),
        ]);
        assert_eq!(form.encoded_body(), "name=Ada&plan=pro");
    }

    #[test]
    fn test_required_radio_group_uses_checked_option() {
        let mut form = ContactForm::new("https://formspree.io/f/abc", "Send");
        let unchecked = Field {
            included: false,
            ..field("budget", "", true, FieldKind::Text)
        };
        form.set_fields(vec![unchecked.clone(), unchecked.clone()]);
        assert_eq!(form.required_names(), vec!["budget".to_string()]);
        assert!(!form.validate_all());
        assert_eq!(form.error("budget"), Some(FieldError::Required));

        form.set_fields(vec![unchecked, field("budget", "small", true, FieldKind::Text)]);
        assert!(form.validate_all());
    }

    #[test]
    fn test_error_selector_is_per_field() {
        assert_eq!(error_selector("name"), ".field-error[data-field=\"name\"]");
        assert_ne!(error_selector("name"), error_selector("email"));
        assert_eq!(
            error_selector("a\"b"),
            ".field-error[data-field=\"a\\\"b\"]"
        );
    }

    #[test]
    fn test_only_required_fields_are_rendered_on_submit() {
        let mut form = contact_form();
        replace(&mut form, field("name", "", true, FieldKind::Text));
        assert!(!form.validate_all());
        let checked = form.required_names();
        assert_eq!(checked, vec!["name", "email", "message"]);
        assert!(!checked.contains(&"service".to_string()));
        assert_eq!(form.error("name"), Some(FieldError::Required));
        assert_eq!(form.error("email"), None);
    }

    #[test]
    fn test_failed_submission_restores_button() {
        let form = Rc::new(RefCell::new(contact_form()));
        let endpoint = StubEndpoint::answering(422);
        let view = RecordingView::default();
        let notifier = RecordingNotifier::default();

        let result = block_on(submit(form.clone(), &endpoint, &view, &notifier));
        assert!(matches!(result, Err(SubmitError::Rejected { status: 422, .. })));

        let renders = view.renders.borrow();
        assert_eq!(renders[0].label, SENDING_LABEL);
        assert!(renders[0].disabled);
        assert_eq!(renders.last().unwrap().label, "Send Message");
        assert!(!renders.last().unwrap().disabled);
        assert_eq!(form.borrow().submit, SubmitControl::new("Send Message"));

        assert_eq!(
            *notifier.sent.borrow(),
            vec![(FAILURE_MESSAGE.to_string(), Severity::Error)]
        );
        assert_eq!(view.resets.get(), 0);
        assert_eq!(form.borrow().fields()[0].value, "Ada Lovelace");
    }

    #[test]
    fn test_network_failure_is_reported() {
        let form = Rc::new(RefCell::new(contact_form()));
        let notifier = RecordingNotifier::default();
        let view = RecordingView::default();

        let result = block_on(submit(form.clone(), &StubEndpoint::offline(), &view, &notifier));
        assert!(matches!(result, Err(SubmitError::Network(_))));
        assert_eq!(notifier.sent.borrow()[0].1, Severity::Error);
        assert!(!form.borrow().submit.disabled);
    }

    #[test]
    fn test_successful_submission_clears_fields() {
        let form = Rc::new(RefCell::new(contact_form()));
        let endpoint = StubEndpoint::answering(200);
        let view = RecordingView::default();
        let notifier = RecordingNotifier::default();

        block_on(submit(form.clone(), &endpoint, &view, &notifier)).unwrap();

        assert!(form.borrow().fields().iter().all(|f| f.value.is_empty()));
        assert_eq!(view.resets.get(), 1);
        assert_eq!(notifier.sent.borrow()[0], (SUCCESS_MESSAGE.to_string(), Severity::Success));
        assert_eq!(endpoint.bodies.borrow().len(), 1);
        assert!(endpoint.bodies.borrow()[0].starts_with("name=Ada%20Lovelace"));
        assert_eq!(form.borrow().submit.label, "Send Message");
    }

    #[test]
    fn test_rejection_detail_reads_formspree_errors() {
        let body = r#"{"errors":[{"field":"email","message":"should be an email"}]}"#;
        assert_eq!(rejection_detail(body), "should be an email");
        assert_eq!(rejection_detail("Bad Gateway\n"), "Bad Gateway");
    }
}
