//! Required-field rules for the connection settings form.
//!
//! Server URL and username are always required. Whether the domain and the
//! password are required depends on the deployment, so those two rules are
//! carried by [`ValidationRules`] instead of the derive.

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

use crate::models::{ConnectionSettings, SettingsField};

/// How the Exchange domain is presented and validated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainRequirement {
    /// No domain input; settings are written without a domain
    Hidden,
    /// Domain input shown, empty value allowed
    Optional,
    /// Domain input shown and must be filled in
    #[default]
    Required,
}

impl DomainRequirement {
    pub fn is_visible(self) -> bool {
        !matches!(self, DomainRequirement::Hidden)
    }
}

/// Fields left empty on submit, in form order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {0}")]
pub struct MissingFields(pub FieldSet);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(pub BTreeSet<SettingsField>);

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.0.iter().map(|field| field.key()).collect();
        write!(f, "{}", keys.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub domain: DomainRequirement,
    pub require_password: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            domain: DomainRequirement::Required,
            require_password: true,
        }
    }
}

impl ValidationRules {
    pub fn is_required(&self, field: SettingsField) -> bool {
        match field {
            SettingsField::ServerName | SettingsField::Username => true,
            SettingsField::DomainName => self.domain == DomainRequirement::Required,
            SettingsField::Password => self.require_password,
        }
    }

    /// Every required field that is empty in `settings`.
    pub fn missing_fields(&self, settings: &ConnectionSettings) -> BTreeSet<SettingsField> {
        let mut missing = BTreeSet::new();

        if let Err(errors) = settings.validate() {
            missing.extend(
                errors
                    .field_errors()
                    .keys()
                    .filter_map(|name| SettingsField::from_struct_field(name)),
            );
        }

        if self.is_required(SettingsField::DomainName) && is_blank(&settings.domain_name) {
            missing.insert(SettingsField::DomainName);
        }
        if self.is_required(SettingsField::Password) && is_blank(&settings.password) {
            missing.insert(SettingsField::Password);
        }

        missing
    }

    pub fn check(&self, settings: &ConnectionSettings) -> Result<(), MissingFields> {
        let missing = self.missing_fields(settings);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MissingFields(FieldSet(missing)))
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ConnectionSettings {
        ConnectionSettings {
            server_name: "https://mail/EWS/Exchange.asmx".to_string(),
            domain_name: Some("CORP".to_string()),
            username: "root".to_string(),
            password: Some("gtn".to_string()),
        }
    }

    #[test]
    fn test_filled_settings_pass() {
        let rules = ValidationRules::default();
        assert!(rules.check(&filled()).is_ok());
    }

    #[test]
    fn test_each_empty_field_is_reported_alone() {
        let rules = ValidationRules::default();

        for field in SettingsField::ALL {
            let mut settings = filled();
            match field {
                SettingsField::ServerName => settings.server_name.clear(),
                SettingsField::DomainName => settings.domain_name = Some(String::new()),
                SettingsField::Username => settings.username.clear(),
                SettingsField::Password => settings.password = None,
            }

            let missing = rules.missing_fields(&settings);
            assert_eq!(missing, BTreeSet::from([field]), "field {:?}", field);
        }
    }

    #[test]
    fn test_all_empty_reports_all() {
        let rules = ValidationRules::default();
        let err = rules
            .check(&ConnectionSettings::default())
            .expect_err("empty settings must fail");

        assert_eq!(err.0 .0.len(), 4);
        assert_eq!(
            err.to_string(),
            "missing required fields: serverName, domainName, username, password"
        );
    }

    #[test]
    fn test_optional_domain_and_password() {
        let rules = ValidationRules {
            domain: DomainRequirement::Optional,
            require_password: false,
        };
        let settings = ConnectionSettings {
            domain_name: None,
            password: None,
            ..filled()
        };

        assert!(rules.check(&settings).is_ok());
    }

    #[test]
    fn test_hidden_domain_is_never_required() {
        let rules = ValidationRules {
            domain: DomainRequirement::Hidden,
            require_password: true,
        };
        let settings = ConnectionSettings {
            domain_name: None,
            ..filled()
        };

        assert!(!DomainRequirement::Hidden.is_visible());
        assert!(rules.check(&settings).is_ok());
    }

    #[test]
    fn test_domain_requirement_from_config_value() {
        let requirement: DomainRequirement =
            serde_json::from_str("\"optional\"").expect("should parse");
        assert_eq!(requirement, DomainRequirement::Optional);
    }
}
