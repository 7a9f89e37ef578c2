use log::{error, info, Level};

mod config;
mod contact;
mod counter;
mod dom;
mod error;
mod filter;
mod nav;
mod observe;
mod page;
mod schedule;
mod scroll;
mod viewport;
mod components {
    pub mod back_to_top;
}

use config::SiteConfig;
use error::SiteResult;

/// Wires one independent page behavior; a failure is logged and the rest continue.
fn wire(name: &str, result: SiteResult<()>) {
    if let Err(e) = result {
        error!("Failed to initialize {}: {}", name, e);
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    let _ = console_log::init_with_level(Level::Info);

    let config = match dom::document() {
        Ok(document) => SiteConfig::load(&document),
        Err(e) => {
            error!("Page script loaded without a document: {}", e);
            return;
        }
    };

    wire("header", scroll::init_header(&config));
    wire("mobile menu", nav::init_menu());
    wire("anchor scrolling", nav::init_anchor_scrolling());
    wire("contact form", contact::init(&config));
    wire("project filter", filter::init(&config));
    wire("reveal animations", viewport::init_reveal(&config));
    wire("lazy images", viewport::init_lazy_images(&config));
    wire("back-to-top", components::back_to_top::mount(&config));
    wire("counters", counter::init(&config));
    wire("phone tracking", page::track_phone_clicks());
    wire("footer year", page::stamp_current_year());

    info!("JBP Malerservice AS - Website initialized");
}
