use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, MouseEvent};

use crate::config::SiteConfig;
use crate::dom::{self, listen};
use crate::error::SiteResult;
use crate::schedule::{BrowserScheduler, Scheduler, TaskHandle};

pub trait FilterButton {
    fn tag(&self) -> Option<String>;
    fn set_active(&self, active: bool);
}

/// A project card; "settled" is its resting, fully opaque position.
pub trait ProjectCard {
    fn category(&self) -> Option<String>;
    fn set_displayed(&self, displayed: bool);
    fn set_settled(&self, settled: bool);
}

#[derive(Debug, Clone, Copy)]
pub struct FilterTimings {
    pub reveal_delay_ms: u32,
    pub hide_delay_ms: u32,
}

/// Single-select category filter over a fixed set of cards.
///
/// Re-selecting cancels the previous selection's pending transitions, so the
/// last selection always wins.
pub struct ProjectFilter<B, C, S> {
    buttons: Vec<B>,
    cards: Vec<Rc<C>>,
    scheduler: Rc<S>,
    all_tag: String,
    timings: FilterTimings,
    pending: RefCell<Vec<TaskHandle>>,
}

impl<B, C, S> ProjectFilter<B, C, S>
where
    B: FilterButton,
    C: ProjectCard + 'static,
    S: Scheduler,
{
    pub fn new(buttons: Vec<B>, cards: Vec<C>, scheduler: Rc<S>, config: &SiteConfig) -> Self {
        Self {
            buttons,
            cards: cards.into_iter().map(Rc::new).collect(),
            scheduler,
            all_tag: config.filter_all_tag.clone(),
            timings: FilterTimings {
                reveal_delay_ms: config.filter_reveal_delay_ms,
                hide_delay_ms: config.filter_hide_delay_ms,
            },
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn matches(&self, tag: &str, category: Option<&str>) -> bool {
        tag == self.all_tag || category == Some(tag)
    }

    /// Activates the button at `index` and transitions every card.
    pub fn select(&self, index: usize) {
        let Some(tag) = self.buttons.get(index).and_then(|b| b.tag()) else {
            warn!("Filter button {} has no data-filter tag", index);
            return;
        };
        for (i, button) in self.buttons.iter().enumerate() {
            button.set_active(i == index);
        }

        let mut pending = self.pending.borrow_mut();
        pending.drain(..).for_each(|task| task.cancel());

        for card in &self.cards {
            let card_ref = card.clone();
            if self.matches(&tag, card.category().as_deref()) {
                card.set_displayed(true);
                let settle = move || card_ref.set_settled(true);
                pending.push(self.scheduler.schedule(self.timings.reveal_delay_ms, settle));
            } else {
                card.set_settled(false);
                let hide = move || card_ref.set_displayed(false);
                pending.push(self.scheduler.schedule(self.timings.hide_delay_ms, hide));
            }
        }
        debug!("Filtered projects by `{}`", tag);
    }
}

impl FilterButton for Element {
    fn tag(&self) -> Option<String> {
        self.get_attribute("data-filter")
    }

    fn set_active(&self, active: bool) {
        let _ = self.class_list().toggle_with_force("active", active);
    }
}

impl ProjectCard for HtmlElement {
    fn category(&self) -> Option<String> {
        self.get_attribute("data-category")
    }

    fn set_displayed(&self, displayed: bool) {
        let value = if displayed { "block" } else { "none" };
        let _ = self.style().set_property("display", value);
    }

    fn set_settled(&self, settled: bool) {
        let (opacity, transform) = if settled {
            ("1", "translateY(0)")
        } else {
            ("0", "translateY(20px)")
        };
        let style = self.style();
        let _ = style.set_property("opacity", opacity);
        let _ = style.set_property("transform", transform);
    }
}

/// Wires `.filter-btn` buttons to `.project-card` cards.
pub fn init(config: &SiteConfig) -> SiteResult<()> {
    let document = dom::document()?;
    let buttons = dom::query_all(&document, ".filter-btn")?;
    let cards: Vec<HtmlElement> = dom::query_all(&document, ".project-card")?
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
        .collect();
    if buttons.is_empty() || cards.is_empty() {
        return Ok(());
    }

    let filter = Rc::new(ProjectFilter::new(
        buttons.clone(),
        cards,
        Rc::new(BrowserScheduler),
        config,
    ));
    for (index, button) in buttons.iter().enumerate() {
        let filter = filter.clone();
        listen(button, "click", move |_: MouseEvent| filter.select(index))?;
    }
    debug!("Project filter wired ({} buttons)", buttons.len());
    Ok(())
}
