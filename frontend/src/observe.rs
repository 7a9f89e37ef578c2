use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::{Array, Reflect};
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::config::ObserverConfig;
use crate::dom;
use crate::error::SiteResult;

/// Browsers round the reported ratio at threshold crossings.
const RATIO_TOLERANCE: f64 = 1e-3;

/// One visibility sample for an observed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visibility {
    pub intersecting: bool,
    pub ratio: f64,
}

impl Visibility {
    pub fn qualifies(&self, threshold: f64) -> bool {
        self.intersecting && self.ratio + RATIO_TOLERANCE >= threshold
    }
}

struct Registration<T> {
    target: T,
    consumed: bool,
}

/// Fixed set of targets, each fired at most once.
///
/// The consumed flag is checked and set under one borrow before the action
/// runs, so repeated notifications for the same target are inert.
pub struct OneShotRegistry<T> {
    threshold: f64,
    registrations: RefCell<Vec<Registration<T>>>,
    action: Box<dyn Fn(&T)>,
}

impl<T: PartialEq> OneShotRegistry<T> {
    pub fn new(threshold: f64, action: impl Fn(&T) + 'static) -> Self {
        Self {
            threshold,
            registrations: RefCell::new(Vec::new()),
            action: Box::new(action),
        }
    }

    pub fn register(&self, target: T) {
        self.registrations.borrow_mut().push(Registration {
            target,
            consumed: false,
        });
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.registrations
            .borrow()
            .iter()
            .filter(|r| !r.consumed)
            .count()
    }

    /// Runs the action if `target` is registered, unconsumed and visible
    /// enough. Returns whether it fired; the caller should stop observing.
    pub fn notify(&self, target: &T, sample: Visibility) -> bool {
        if !sample.qualifies(self.threshold) {
            return false;
        }
        let claimed = {
            let mut registrations = self.registrations.borrow_mut();
            match registrations
                .iter_mut()
                .find(|r| !r.consumed && &r.target == target)
            {
                Some(registration) => {
                    registration.consumed = true;
                    true
                }
                None => false,
            }
        };
        if claimed {
            (self.action)(target);
        }
        claimed
    }
}

pub fn observer_supported(window: &web_sys::Window) -> bool {
    Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

/// Observes `targets` and runs `action` once per target on first qualifying
/// visibility. Without IntersectionObserver nothing runs.
pub fn observe_once(
    name: &str,
    targets: Vec<Element>,
    options: &ObserverConfig,
    action: impl Fn(&Element) + 'static,
) -> SiteResult<()> {
    if targets.is_empty() {
        return Ok(());
    }
    let window = dom::window()?;
    if !observer_supported(&window) {
        warn!("IntersectionObserver unavailable, skipping {}", name);
        return Ok(());
    }

    let registry = Rc::new(OneShotRegistry::new(options.threshold, action));
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new({
        let registry = registry.clone();
        move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let target = entry.target();
                let sample = Visibility {
                    intersecting: entry.is_intersecting(),
                    ratio: entry.intersection_ratio(),
                };
                if registry.notify(&target, sample) {
                    observer.unobserve(&target);
                }
            }
        }
    });

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(options.threshold));
    init.set_root_margin(&options.root_margin);
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    callback.forget();

    let count = targets.len();
    for target in targets {
        observer.observe(&target);
        registry.register(target);
    }
    debug!("Observing {} {} targets", count, name);
    Ok(())
}
