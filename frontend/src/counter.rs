use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Window};

use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteResult;
use crate::observe::observe_once;

pub const COUNTER_SELECTOR: &str = ".stat-number";

/// Final value and suffixes parsed from a counter's display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterTarget {
    pub value: u64,
    pub plus: bool,
    pub percent: bool,
}

impl CounterTarget {
    /// Keeps only the digits of `text`; `None` if there are none.
    pub fn parse(text: &str) -> Option<Self> {
        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        Some(Self {
            value: digits.parse().ok()?,
            plus: text.contains('+'),
            percent: text.contains('%'),
        })
    }

    pub fn render(&self, value: u64) -> String {
        let mut display = value.to_string();
        if self.plus {
            display.push('+');
        }
        if self.percent {
            display.push('%');
        }
        display
    }

    /// Cubic ease-out from 0 to `value`; exact once `elapsed >= duration`.
    pub fn value_at(&self, elapsed: f64, duration: f64) -> u64 {
        if duration <= 0.0 || elapsed >= duration {
            return self.value;
        }
        let progress = (elapsed / duration).max(0.0);
        let eased = 1.0 - (1.0 - progress).powi(3);
        ((self.value as f64) * eased).floor() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub text: String,
    pub done: bool,
}

/// Count-up driven by animation-frame timestamps; the first frame is t = 0.
#[derive(Debug)]
pub struct CounterAnimation {
    target: CounterTarget,
    duration: f64,
    start: Option<f64>,
}

impl CounterAnimation {
    pub fn new(target: CounterTarget, duration: f64) -> Self {
        Self {
            target,
            duration,
            start: None,
        }
    }

    pub fn frame(&mut self, timestamp: f64) -> Frame {
        let start = *self.start.get_or_insert(timestamp);
        let elapsed = timestamp - start;
        Frame {
            text: self.target.render(self.target.value_at(elapsed, self.duration)),
            done: elapsed >= self.duration,
        }
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Re-renders `element` every animation frame until the count-up completes.
fn run(window: Window, element: Element, mut animation: CounterAnimation) {
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = callback.clone();
    let raf_window = window.clone();
    *callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        let frame = animation.frame(timestamp);
        element.set_text_content(Some(&frame.text));
        if frame.done {
            // Releases this closure once the final frame is drawn
            let _ = next.borrow_mut().take();
            return;
        }
        let pending = next.borrow();
        if let Some(cb) = pending.as_ref() {
            let _ = raf_window.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }));

    let first = callback.borrow();
    if let Some(cb) = first.as_ref() {
        let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

pub fn init(config: &SiteConfig) -> SiteResult<()> {
    let window = dom::window()?;
    let counters = dom::query_all(&dom::document()?, COUNTER_SELECTOR)?;
    let duration = config.counter_duration_ms;
    observe_once("counter", counters, &config.counters, move |element: &Element| {
        let text = element.text_content().unwrap_or_default();
        if let Some(target) = CounterTarget::parse(&text) {
            run(
                window.clone(),
                element.clone(),
                CounterAnimation::new(target, duration),
            );
        }
    })
}
