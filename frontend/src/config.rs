use exchange_shared::{DomainRequirement, ValidationRules, DEFAULT_API_BASE};
use serde::Deserialize;

use crate::error::WidgetError;

/// Id of the optional `<script type="application/json">` element holding the widget config
pub const CONFIG_ELEMENT_ID: &str = "exchange-widget-config";

const DEFAULT_ANCHOR_SELECTOR: &str =
    ".UICalendarPortlet .calendarWorkingWorkspace .uiActionBar .btnRight .separatorLine";

/// When the widget looks for the toolbar anchor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachMode {
    /// Right away, and once more on window load if the anchor was missing
    #[default]
    Load,
    /// Right away, then on every DOM mutation until the anchor shows up
    Observe,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    pub api_base: String,
    pub anchor_selector: String,
    pub attach: AttachMode,
    pub domain_field: DomainRequirement,
    pub require_password: bool,
    pub sync_now_button: bool,
    pub alert_on_save_failure: bool,
    pub connected_icon: String,
    pub disconnected_icon: String,
    pub icon_size: u32,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            anchor_selector: DEFAULT_ANCHOR_SELECTOR.to_string(),
            attach: AttachMode::Load,
            domain_field: DomainRequirement::Required,
            require_password: true,
            sync_now_button: false,
            alert_on_save_failure: false,
            connected_icon: "/exchange-resources/skin/images/exchange.png".to_string(),
            disconnected_icon: "/exchange-resources/skin/images/exchange-disabled.png".to_string(),
            icon_size: 24,
        }
    }
}

impl WidgetConfig {
    pub fn from_json(raw: &str) -> Result<Self, WidgetError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads the config element from the host page, falling back to defaults.
    pub fn load() -> Self {
        let raw = gloo::utils::document()
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|element| element.text_content());

        match raw {
            Some(raw) if !raw.trim().is_empty() => Self::from_json(&raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn rules(&self) -> ValidationRules {
        ValidationRules {
            domain: self.domain_field,
            require_password: self.require_password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = WidgetConfig::from_json(r#"{"domainField":"hidden","syncNowButton":true}"#)
            .expect("should parse config");

        assert_eq!(config.domain_field, DomainRequirement::Hidden);
        assert!(config.sync_now_button);
        assert_eq!(config.api_base, "/portal/rest/exchange");
        assert_eq!(config.attach, AttachMode::Load);
        assert!(config.require_password);
        assert_eq!(config.icon_size, 24);
    }

    #[test]
    fn test_observe_mode_and_rules() {
        let config = WidgetConfig::from_json(
            r#"{"attach":"observe","domainField":"optional","requirePassword":false}"#,
        )
        .expect("should parse config");

        assert_eq!(config.attach, AttachMode::Observe);
        assert_eq!(
            config.rules(),
            ValidationRules {
                domain: DomainRequirement::Optional,
                require_password: false,
            }
        );
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(matches!(
            WidgetConfig::from_json("{not json"),
            Err(WidgetError::JsonParse(_))
        ));
    }
}
