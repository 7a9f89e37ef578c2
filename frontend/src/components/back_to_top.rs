use log::debug;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use yew::prelude::*;

use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteResult;
use crate::scroll::{smooth_scroll_to, Threshold};

#[derive(Properties, PartialEq)]
pub struct BackToTopProps {
    pub threshold: f64,
}

#[function_component(BackToTop)]
pub fn back_to_top(props: &BackToTopProps) -> Html {
    let visible = use_state_eq(|| false);

    {
        let visible = visible.clone();
        let threshold = Threshold::new(props.threshold);
        use_effect_with_deps(
            move |_| {
                let destructor: Box<dyn FnOnce()> = if let Some(window) = web_sys::window() {
                    let callback = Closure::<dyn Fn()>::new({
                        let window = window.clone();
                        let visible = visible.clone();
                        move || {
                            if let Ok(offset) = window.scroll_y() {
                                visible.set(threshold.passed(offset));
                            }
                        }
                    });
                    let _ = window.add_event_listener_with_callback(
                        "scroll",
                        callback.as_ref().unchecked_ref(),
                    );
                    // Pages restored mid-scroll
                    if let Ok(offset) = window.scroll_y() {
                        visible.set(threshold.passed(offset));
                    }
                    Box::new(move || {
                        let _ = window.remove_event_listener_with_callback(
                            "scroll",
                            callback.as_ref().unchecked_ref(),
                        );
                    })
                } else {
                    Box::new(|| ())
                };
                destructor
            },
            (),
        );
    }

    let onclick = Callback::from(|_: MouseEvent| {
        if let Some(window) = web_sys::window() {
            smooth_scroll_to(&window, 0.0);
        }
    });

    html! {
        <button
            class={classes!("back-to-top", (*visible).then(|| "visible"))}
            aria-label="Tilbake til toppen"
            {onclick}
        >
            <svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">
                <polyline points="18,15 12,9 6,15"></polyline>
            </svg>
        </button>
    }
}

/// Appends a host to `<body>` and renders the button into it.
pub fn mount(config: &SiteConfig) -> SiteResult<()> {
    let host = dom::document()?.create_element("div")?;
    host.set_class_name("back-to-top-host");
    dom::body()?.append_child(&host)?;

    yew::Renderer::<BackToTop>::with_root_and_props(
        host,
        BackToTopProps {
            threshold: config.back_to_top_threshold,
        },
    )
    .render();
    debug!("Back-to-top button mounted");
    Ok(())
}
