use chrono::{Datelike, Local};
use log::info;
use web_sys::MouseEvent;

use crate::dom::{self, listen};
use crate::error::SiteResult;

pub fn stamp_current_year() -> SiteResult<()> {
    let year = Local::now().year().to_string();
    for el in dom::query_all(&dom::document()?, ".current-year")? {
        el.set_text_content(Some(&year));
    }
    Ok(())
}

pub fn track_phone_clicks() -> SiteResult<()> {
    for link in dom::query_all(&dom::document()?, r#"a[href^="tel:"]"#)? {
        listen(&link, "click", |_: MouseEvent| info!("Phone click tracked"))?;
    }
    Ok(())
}
