use std::cell::Cell;

use log::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{ScrollBehavior, ScrollToOptions, Window};

use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteResult;

/// A class that is present iff the scroll offset is strictly past `limit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    limit: f64,
}

impl Threshold {
    pub fn new(limit: f64) -> Self {
        Self { limit }
    }

    pub fn passed(&self, offset: f64) -> bool {
        offset > self.limit
    }
}

/// Tracks one threshold and reports only state changes, so the handler
/// touches the class list at most once per crossing.
#[derive(Debug)]
pub struct ScrollClass {
    threshold: Threshold,
    last: Cell<Option<bool>>,
}

impl ScrollClass {
    pub fn new(threshold: Threshold) -> Self {
        Self {
            threshold,
            last: Cell::new(None),
        }
    }

    /// Returns the new class state when it differs from the last one applied.
    pub fn update(&self, offset: f64) -> Option<bool> {
        let now = self.threshold.passed(offset);
        if self.last.replace(Some(now)) == Some(now) {
            None
        } else {
            Some(now)
        }
    }
}

pub fn smooth_scroll_to(window: &Window, top: f64) {
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

/// Toggles `scrolled` on `#header` as the page scrolls.
pub fn init_header(config: &SiteConfig) -> SiteResult<()> {
    let window = dom::window()?;
    let Some(header) = dom::document()?.get_element_by_id("header") else {
        return Ok(());
    };

    let reactor = ScrollClass::new(Threshold::new(config.header_scroll_threshold));
    let apply = {
        let window = window.clone();
        move || {
            let offset = window.scroll_y().unwrap_or(0.0);
            if let Some(scrolled) = reactor.update(offset) {
                let _ = header.class_list().toggle_with_force("scrolled", scrolled);
            }
        }
    };
    apply();

    let callback = Closure::<dyn Fn()>::new(apply);
    window.add_event_listener_with_callback("scroll", callback.as_ref().unchecked_ref())?;
    callback.forget();
    debug!("Header scroll reactor attached");
    Ok(())
}
