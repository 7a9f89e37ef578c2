use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures while wiring a component to the page.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("browser global `{0}` is not available")]
    MissingGlobal(&'static str),
    #[error("required element `{0}` is missing from the page")]
    MissingElement(&'static str),
    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        SiteError::Js(format!("{:?}", value))
    }
}

pub type SiteResult<T> = Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_missing_piece() {
        assert_eq!(
            SiteError::MissingElement("#header").to_string(),
            "required element `#header` is missing from the page"
        );
        assert_eq!(
            SiteError::MissingGlobal("window").to_string(),
            "browser global `window` is not available"
        );
    }
}
