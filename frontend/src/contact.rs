use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Event, FormData, HtmlButtonElement, HtmlFormElement, HtmlInputElement, Node,
};

use crate::config::SiteConfig;
use crate::dom::{self, listen};
use crate::error::SiteResult;
use crate::schedule::{BrowserScheduler, Scheduler, TaskHandle};

pub const SUCCESS_MESSAGE: &str = "Takk for din henvendelse! Vi tar kontakt med deg innen 24 timer.";
pub const SENDING_LABEL: &str = "Sender...";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+47)?[0-9]{8}$").expect("phone pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Vennligst fyll ut alle obligatoriske felt.")]
    MissingFields,
    #[error("Vennligst oppgi en gyldig e-postadresse.")]
    InvalidEmail,
    #[error("Vennligst oppgi et gyldig telefonnummer (8 siffer).")]
    InvalidPhone,
}

/// Field values of one submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactSubmission {
    /// Builds a submission from a field lookup; absent fields read as empty.
    pub fn from_lookup(mut field: impl FnMut(&str) -> Option<String>) -> Self {
        let mut get = |name: &str| field(name).unwrap_or_default();
        Self {
            name: get("name"),
            email: get("email"),
            phone: get("phone"),
            message: get("message"),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [&self.name, &self.email, &self.phone, &self.message];
        if required.iter().any(|value| value.is_empty()) {
            return Err(ValidationError::MissingFields);
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        let phone: String = self.phone.chars().filter(|c| !c.is_whitespace()).collect();
        if !PHONE_RE.is_match(&phone) {
            return Err(ValidationError::InvalidPhone);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn class(&self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            MessageKind::Success => {
                r#"<path d="M22 11.08V12a10 10 0 1 1-5.93-9.14"></path><polyline points="22,4 12,14.01 9,11.01"></polyline>"#
            }
            MessageKind::Error => {
                r#"<circle cx="12" cy="12" r="10"></circle><line x1="12" y1="8" x2="12" y2="12"></line><line x1="12" y1="16" x2="12.01" y2="16"></line>"#
            }
        }
    }

    pub fn icon_markup(&self) -> String {
        format!(
            r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">{}</svg>"#,
            self.icon()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl FormMessage {
    pub fn success() -> Self {
        Self {
            kind: MessageKind::Success,
            text: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn error(err: &ValidationError) -> Self {
        Self {
            kind: MessageKind::Error,
            text: err.to_string(),
        }
    }
}

/// The page surfaces the contact form controller reads and drives.
pub trait ContactView {
    fn honeypot_filled(&self) -> bool;
    fn submission(&self) -> ContactSubmission;
    /// Inserts a message; the slot is always empty when this is called.
    fn show_message(&self, message: &FormMessage);
    fn remove_message(&self);
    /// Disables the submit control and shows the sending label, or restores it.
    fn set_busy(&self, busy: bool);
    fn reset(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Honeypot was filled; nothing shown, nothing changed.
    Spam,
    /// A submission is already in flight.
    Busy,
    Rejected(ValidationError),
    Submitting,
}

#[derive(Debug, Clone, Copy)]
pub struct FormTimings {
    pub submit_delay_ms: u32,
    pub success_dismiss_ms: u32,
}

impl From<&SiteConfig> for FormTimings {
    fn from(config: &SiteConfig) -> Self {
        Self {
            submit_delay_ms: config.submit_delay_ms,
            success_dismiss_ms: config.success_dismiss_ms,
        }
    }
}

#[derive(Default)]
struct FormState {
    phase: FormPhase,
    dismissal: Option<TaskHandle>,
}

/// Idle -> Validating -> (Rejected | Submitting) -> Idle.
///
/// The acknowledgment after `submit_delay_ms` is simulated; there is no transport.
pub struct ContactForm<V, S> {
    view: Rc<V>,
    scheduler: Rc<S>,
    timings: FormTimings,
    state: Rc<RefCell<FormState>>,
}

impl<V, S> Clone for ContactForm<V, S> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            scheduler: self.scheduler.clone(),
            timings: self.timings,
            state: self.state.clone(),
        }
    }
}

impl<V: ContactView + 'static, S: Scheduler + 'static> ContactForm<V, S> {
    pub fn new(view: Rc<V>, scheduler: Rc<S>, timings: FormTimings) -> Self {
        Self {
            view,
            scheduler,
            timings,
            state: Rc::new(RefCell::new(FormState::default())),
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.state.borrow().phase
    }

    pub fn submit(&self) -> SubmitOutcome {
        if self.view.honeypot_filled() {
            info!("Bot detected");
            return SubmitOutcome::Spam;
        }
        if self.phase() == FormPhase::Submitting {
            return SubmitOutcome::Busy;
        }

        self.clear_message();
        if let Err(err) = self.view.submission().validate() {
            self.show(FormMessage::error(&err));
            return SubmitOutcome::Rejected(err);
        }

        self.state.borrow_mut().phase = FormPhase::Submitting;
        self.view.set_busy(true);
        let form = self.clone();
        self.scheduler
            .schedule(self.timings.submit_delay_ms, move || form.acknowledge());
        SubmitOutcome::Submitting
    }

    fn acknowledge(&self) {
        self.show(FormMessage::success());
        self.view.reset();
        self.view.set_busy(false);
        self.state.borrow_mut().phase = FormPhase::Idle;
        debug!("Contact form acknowledged");
    }

    fn clear_message(&self) {
        if let Some(pending) = self.state.borrow_mut().dismissal.take() {
            pending.cancel();
        }
        self.view.remove_message();
    }

    fn show(&self, message: FormMessage) {
        self.clear_message();
        self.view.show_message(&message);
        if message.kind == MessageKind::Success {
            let form = self.clone();
            let handle = self
                .scheduler
                .schedule(self.timings.success_dismiss_ms, move || {
                    form.state.borrow_mut().dismissal = None;
                    form.view.remove_message();
                });
            self.state.borrow_mut().dismissal = Some(handle);
        }
    }
}

pub struct DomContactView {
    document: Document,
    form: HtmlFormElement,
    submit: Option<HtmlButtonElement>,
    honeypot: Option<HtmlInputElement>,
    original_label: RefCell<Option<String>>,
}

impl ContactView for DomContactView {
    fn honeypot_filled(&self) -> bool {
        self.honeypot
            .as_ref()
            .map_or(false, |field| !field.value().is_empty())
    }

    fn submission(&self) -> ContactSubmission {
        match FormData::new_with_form(&self.form) {
            Ok(data) => ContactSubmission::from_lookup(|name| data.get(name).as_string()),
            Err(_) => ContactSubmission::default(),
        }
    }

    fn show_message(&self, message: &FormMessage) {
        let Ok(el) = self.document.create_element("div") else {
            return;
        };
        el.set_class_name(&format!("form-message {}", message.kind.class()));
        el.set_inner_html(&message.kind.icon_markup());
        if let Ok(span) = self.document.create_element("span") {
            span.set_text_content(Some(&message.text));
            let _ = el.append_child(&span);
        }

        let parent = self.submit.as_ref().and_then(|submit| submit.parent_node());
        match (parent, &self.submit) {
            (Some(parent), Some(submit)) => {
                let before: &Node = submit;
                let _ = parent.insert_before(&el, Some(before));
            }
            _ => {
                let _ = self.form.append_child(&el);
            }
        }
    }

    fn remove_message(&self) {
        if let Ok(existing) = dom::query_all(&self.document, ".form-message") {
            existing.iter().for_each(|el| el.remove());
        }
    }

    fn set_busy(&self, busy: bool) {
        let Some(submit) = &self.submit else {
            return;
        };
        if busy {
            *self.original_label.borrow_mut() = Some(submit.inner_html());
            submit.set_inner_html(SENDING_LABEL);
        } else if let Some(label) = self.original_label.borrow_mut().take() {
            submit.set_inner_html(&label);
        }
        submit.set_disabled(busy);
    }

    fn reset(&self) {
        self.form.reset();
    }
}

/// Intercepts `#contact-form` submissions.
pub fn init(config: &SiteConfig) -> SiteResult<()> {
    let document = dom::document()?;
    let Some(form) = document
        .get_element_by_id("contact-form")
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
    else {
        return Ok(());
    };

    let view = DomContactView {
        submit: form
            .query_selector(r#"button[type="submit"]"#)?
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok()),
        honeypot: document
            .get_element_by_id("website")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok()),
        document,
        form: form.clone(),
        original_label: RefCell::new(None),
    };
    let controller = ContactForm::new(Rc::new(view), Rc::new(BrowserScheduler), config.into());

    listen(&form, "submit", move |e: Event| {
        e.prevent_default();
        let outcome = controller.submit();
        debug!("Contact form submit: {:?}", outcome);
    })?;
    debug!("Contact form wired");
    Ok(())
}
