use web_sys::Element;

use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteResult;
use crate::observe::{observe_once, observer_supported};

pub const REVEAL_SELECTOR: &str =
    ".service-card, .value-card, .project-card, .testimonial-card, .price-table, .package-card, .faq-item";
pub const LAZY_IMAGE_SELECTOR: &str = "img[data-src]";

const STAGED_SOURCE: &str = "data-src";

/// Marks reveal targets and adds `animate-in` on first sight.
pub fn init_reveal(config: &SiteConfig) -> SiteResult<()> {
    // Marked targets stay hidden until revealed, so never mark without an observer
    if !observer_supported(&dom::window()?) {
        return Ok(());
    }
    let targets = dom::query_all(&dom::document()?, REVEAL_SELECTOR)?;
    for target in &targets {
        let _ = target.class_list().add_1("animate-element");
    }
    observe_once("reveal", targets, &config.reveal, |target: &Element| {
        let _ = target.class_list().add_1("animate-in");
    })
}

/// Moves a staged `data-src` into `src`. A second call finds nothing staged.
pub fn load_staged_source(img: &Element) {
    if let Some(src) = img.get_attribute(STAGED_SOURCE) {
        let _ = img.set_attribute("src", &src);
        let _ = img.remove_attribute(STAGED_SOURCE);
    }
}

pub fn init_lazy_images(config: &SiteConfig) -> SiteResult<()> {
    let images = dom::query_all(&dom::document()?, LAZY_IMAGE_SELECTOR)?;
    observe_once("lazy image", images, &config.lazy_images, load_staged_source)
}
