use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, KeyboardEvent, MouseEvent, Node};

use crate::dom::{self, listen};
use crate::error::{SiteError, SiteResult};
use crate::scroll::smooth_scroll_to;

/// Class state of the three surfaces driven by the mobile menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSurfaces {
    pub button_active: bool,
    pub panel_active: bool,
    pub body_menu_open: bool,
}

impl MenuSurfaces {
    fn mirror(open: bool) -> Self {
        Self {
            button_active: open,
            panel_active: open,
            body_menu_open: open,
        }
    }
}

/// Open/closed state of the mobile menu.
///
/// Every transition returns the full surface state, applied in one pass.
/// Close triggers return `None` when the menu is already closed.
#[derive(Debug, Default)]
pub struct NavMenu {
    open: bool,
}

impl NavMenu {
    pub fn new(open: bool) -> Self {
        Self { open }
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn surfaces(&self) -> MenuSurfaces {
        MenuSurfaces::mirror(self.open)
    }

    pub fn toggle(&mut self) -> MenuSurfaces {
        self.open = !self.open;
        self.surfaces()
    }

    fn close(&mut self) -> Option<MenuSurfaces> {
        self.open.then(|| self.toggle())
    }

    pub fn link_clicked(&mut self) -> Option<MenuSurfaces> {
        self.close()
    }

    pub fn document_clicked(
        &mut self,
        inside_button: bool,
        inside_panel: bool,
    ) -> Option<MenuSurfaces> {
        if inside_button || inside_panel {
            return None;
        }
        self.close()
    }

    pub fn key_pressed(&mut self, key: &str) -> Option<MenuSurfaces> {
        if key != "Escape" {
            return None;
        }
        self.close()
    }
}

/// Returns the selector for an in-page anchor, or `None` for a bare `#`.
pub fn anchor_selector(href: &str) -> Option<&str> {
    (href.starts_with('#') && href.len() > 1).then_some(href)
}

/// Document offset that puts `target_top` just below a fixed header.
pub fn anchor_scroll_offset(target_top: f64, page_offset: f64, header_height: f64) -> f64 {
    target_top + page_offset - header_height
}

struct MenuElements {
    button: Element,
    panel: Element,
    body: HtmlElement,
}

impl MenuElements {
    fn apply(&self, surfaces: MenuSurfaces) {
        let _ = self
            .button
            .class_list()
            .toggle_with_force("active", surfaces.button_active);
        let _ = self
            .panel
            .class_list()
            .toggle_with_force("active", surfaces.panel_active);
        let _ = self
            .body
            .class_list()
            .toggle_with_force("menu-open", surfaces.body_menu_open);
    }

    fn contains(container: &Element, target: Option<&Node>) -> bool {
        target.map_or(false, |node| container.contains(Some(node)))
    }
}

/// Wires `#mobile-menu-btn`, `#nav-menu` and `.nav-link`.
pub fn init_menu() -> SiteResult<()> {
    let document = dom::document()?;
    let Some(button) = document.get_element_by_id("mobile-menu-btn") else {
        return Ok(());
    };
    let panel = document
        .get_element_by_id("nav-menu")
        .ok_or(SiteError::MissingElement("#nav-menu"))?;

    let menu = Rc::new(RefCell::new(NavMenu::new(panel.class_list().contains("active"))));
    let elements = Rc::new(MenuElements {
        button: button.clone(),
        panel,
        body: document.body().ok_or(SiteError::MissingGlobal("body"))?,
    });

    {
        let menu = menu.clone();
        let elements = elements.clone();
        listen(&button, "click", move |_: MouseEvent| {
            let surfaces = menu.borrow_mut().toggle();
            elements.apply(surfaces);
        })?;
    }

    for link in dom::query_all(&document, ".nav-link")? {
        let menu = menu.clone();
        let elements = elements.clone();
        listen(&link, "click", move |_: MouseEvent| {
            if let Some(surfaces) = menu.borrow_mut().link_clicked() {
                elements.apply(surfaces);
            }
        })?;
    }

    {
        let menu = menu.clone();
        let elements = elements.clone();
        listen(&document, "click", move |e: MouseEvent| {
            let target = e.target().and_then(|t| t.dyn_into::<Node>().ok());
            let inside_button = MenuElements::contains(&elements.button, target.as_ref());
            let inside_panel = MenuElements::contains(&elements.panel, target.as_ref());
            // The toggle button's own handler has already run for this click
            let surfaces = menu
                .borrow_mut()
                .document_clicked(inside_button, inside_panel);
            if let Some(surfaces) = surfaces {
                elements.apply(surfaces);
            }
        })?;
    }

    listen(&document, "keydown", move |e: KeyboardEvent| {
        if let Some(surfaces) = menu.borrow_mut().key_pressed(&e.key()) {
            elements.apply(surfaces);
        }
    })?;

    debug!("Mobile menu wired");
    Ok(())
}

/// Smooth-scrolls in-page anchors to just below the header.
pub fn init_anchor_scrolling() -> SiteResult<()> {
    let window = dom::window()?;
    let document = dom::document()?;
    let header = document
        .get_element_by_id("header")
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());

    for anchor in dom::query_all(&document, r##"a[href^="#"]"##)? {
        let window = window.clone();
        let document = document.clone();
        let header = header.clone();
        let href = anchor.get_attribute("href").unwrap_or_default();
        listen(&anchor, "click", move |e: MouseEvent| {
            let Some(selector) = anchor_selector(&href) else {
                return;
            };
            // Ids that are not valid selectors fall through to the browser
            let Ok(Some(target)) = document.query_selector(selector) else {
                return;
            };
            e.prevent_default();
            let header_height = header.as_ref().map_or(0, |h| h.offset_height());
            let top = anchor_scroll_offset(
                target.get_bounding_client_rect().top(),
                window.page_y_offset().unwrap_or(0.0),
                f64::from(header_height),
            );
            smooth_scroll_to(&window, top);
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_an_involution() {
        let mut menu = NavMenu::default();
        let before = menu.surfaces();
        let opened = menu.toggle();
        assert_eq!(opened, MenuSurfaces::mirror(true));
        assert_eq!(menu.toggle(), before);
        assert!(!menu.is_open());
    }

    #[test]
    fn close_triggers_are_noops_when_closed() {
        let mut menu = NavMenu::new(false);
        assert_eq!(menu.link_clicked(), None);
        assert_eq!(menu.document_clicked(false, false), None);
        assert_eq!(menu.key_pressed("Escape"), None);
        assert!(!menu.is_open());
    }

    #[test]
    fn outside_click_closes() {
        let mut menu = NavMenu::new(true);
        assert_eq!(menu.document_clicked(true, false), None);
        assert_eq!(menu.document_clicked(false, true), None);
        assert_eq!(
            menu.document_clicked(false, false),
            Some(MenuSurfaces::mirror(false))
        );
    }

    #[test]
    fn only_escape_closes() {
        let mut menu = NavMenu::new(true);
        assert_eq!(menu.key_pressed("Enter"), None);
        assert!(menu.is_open());
        assert_eq!(menu.key_pressed("Escape"), Some(MenuSurfaces::mirror(false)));
    }

    #[test]
    fn link_click_closes_open_menu() {
        let mut menu = NavMenu::new(true);
        assert!(menu.link_clicked().is_some());
        assert!(!menu.is_open());
    }

    #[test]
    fn anchors() {
        assert_eq!(anchor_selector("#"), None);
        assert_eq!(anchor_selector("#kontakt"), Some("#kontakt"));
        assert_eq!(anchor_selector("/tjenester"), None);
        assert_eq!(anchor_scroll_offset(250.0, 1000.0, 80.0), 1170.0);
    }
}
