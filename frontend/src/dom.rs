//! Thin helpers over `web_sys` shared by the page components.

use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement, Window};

use crate::error::{SiteError, SiteResult};

pub fn window() -> SiteResult<Window> {
    web_sys::window().ok_or(SiteError::MissingGlobal("window"))
}

pub fn document() -> SiteResult<Document> {
    window()?
        .document()
        .ok_or(SiteError::MissingGlobal("document"))
}

pub fn body() -> SiteResult<HtmlElement> {
    document()?.body().ok_or(SiteError::MissingGlobal("body"))
}

/// Every element matching `selector`, in document order.
pub fn query_all(document: &Document, selector: &str) -> SiteResult<Vec<Element>> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

/// Attaches a listener for the lifetime of the page.
pub fn listen<E, F>(target: &EventTarget, event: &str, handler: F) -> SiteResult<()>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
