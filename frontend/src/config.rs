use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Id of the optional `<script type="application/json">` block with overrides.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

/// Thresholds, delays and observer options for every page behavior.
///
/// Defaults match the stylesheet's transition timings. A page can override any
/// subset through a JSON block, e.g. `{"counter_duration_ms": 1200}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub header_scroll_threshold: f64,
    pub back_to_top_threshold: f64,
    pub submit_delay_ms: u32,
    pub success_dismiss_ms: u32,
    pub filter_reveal_delay_ms: u32,
    pub filter_hide_delay_ms: u32,
    pub filter_all_tag: String,
    pub counter_duration_ms: f64,
    pub reveal: ObserverConfig,
    pub lazy_images: ObserverConfig,
    pub counters: ObserverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverConfig {
    pub threshold: f64,
    pub root_margin: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            header_scroll_threshold: 100.0,
            back_to_top_threshold: 500.0,
            submit_delay_ms: 1_500,
            success_dismiss_ms: 5_000,
            filter_reveal_delay_ms: 50,
            filter_hide_delay_ms: 300,
            filter_all_tag: "all".to_string(),
            counter_duration_ms: 2_000.0,
            reveal: ObserverConfig {
                threshold: 0.1,
                root_margin: "0px 0px -50px 0px".to_string(),
            },
            lazy_images: ObserverConfig {
                threshold: 0.0,
                root_margin: "100px 0px".to_string(),
            },
            counters: ObserverConfig {
                threshold: 0.5,
                root_margin: "0px".to_string(),
            },
        }
    }
}

impl SiteConfig {
    /// Parses overrides, falling back to defaults when the JSON is malformed.
    pub fn from_json(raw: &str) -> Self {
        match Self::with_overrides(raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring malformed site config: {}", e);
                Self::default()
            }
        }
    }

    /// Overrides are laid over the defaults key by key, nested sections included.
    fn with_overrides(raw: &str) -> serde_json::Result<Self> {
        let overrides: Value = serde_json::from_str(raw)?;
        let mut merged = serde_json::to_value(Self::default())?;
        merge(&mut merged, overrides);
        serde_json::from_value(merged)
    }

    pub fn load(document: &web_sys::Document) -> Self {
        document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| Self::from_json(&raw))
            .unwrap_or_default()
    }
}

fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = SiteConfig::from_json(
            r#"{"counter_duration_ms": 1200, "reveal": {"threshold": 0.25}}"#,
        );
        assert_eq!(config.counter_duration_ms, 1200.0);
        assert_eq!(config.reveal.threshold, 0.25);
        assert_eq!(config.reveal.root_margin, "0px 0px -50px 0px");
        assert_eq!(config.header_scroll_threshold, 100.0);
        assert_eq!(config.submit_delay_ms, 1_500);
    }

    #[test]
    fn nested_override_keeps_section_defaults() {
        let config = SiteConfig::from_json(
            r#"{"lazy_images": {"threshold": 0.2}, "counters": {"root_margin": "10px"}}"#,
        );
        assert_eq!(config.lazy_images.threshold, 0.2);
        assert_eq!(config.lazy_images.root_margin, "100px 0px");
        assert_eq!(config.counters.threshold, 0.5);
        assert_eq!(config.counters.root_margin, "10px");
        assert_eq!(config.reveal, SiteConfig::default().reveal);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = SiteConfig::from_json(r#"{"theme": "dark", "submit_delay_ms": 800}"#);
        assert_eq!(config.submit_delay_ms, 800);
        assert_eq!(config.success_dismiss_ms, 5_000);
    }

    #[test]
    fn wrong_type_falls_back() {
        let config = SiteConfig::from_json(r#"{"reveal": {"threshold": "high"}}"#);
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn malformed_json_falls_back() {
        assert_eq!(SiteConfig::from_json("{not json"), SiteConfig::default());
    }

    #[test]
    fn defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.back_to_top_threshold, 500.0);
        assert_eq!(config.success_dismiss_ms, 5_000);
        assert_eq!(config.lazy_images.root_margin, "100px 0px");
        assert_eq!(config.counters.threshold, 0.5);
        assert_eq!(config.filter_all_tag, "all");
    }
}
