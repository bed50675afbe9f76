use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Remote Exchange calendar folder and whether it is mirrored into the portal calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarFolder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub synchronized_folder: bool,
}

/// Connection settings the backend uses to reach the Exchange server.
///
/// The backend never returns the password; it is only sent when saving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSettings {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    pub server_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// The backend writes unset members as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Editable member of [`ConnectionSettings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingsField {
    ServerName,
    DomainName,
    Username,
    Password,
}

impl SettingsField {
    /// Form order
    pub const ALL: [SettingsField; 4] = [
        SettingsField::ServerName,
        SettingsField::DomainName,
        SettingsField::Username,
        SettingsField::Password,
    ];

    /// JSON member name, also used as the form input id.
    pub fn key(self) -> &'static str {
        match self {
            SettingsField::ServerName => "serverName",
            SettingsField::DomainName => "domainName",
            SettingsField::Username => "username",
            SettingsField::Password => "password",
        }
    }

    /// Maps a struct field name reported by `validator` back to the form field.
    pub fn from_struct_field(name: &str) -> Option<Self> {
        match name {
            "server_name" => Some(SettingsField::ServerName),
            "domain_name" => Some(SettingsField::DomainName),
            "username" => Some(SettingsField::Username),
            "password" => Some(SettingsField::Password),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_list_uses_camel_case() {
        let folders: Vec<CalendarFolder> = serde_json::from_str(
            r#"[{"id":"AAMkAD+/=","name":"Calendar","synchronizedFolder":true},
                {"id":"AAMkAE","name":"Holidays"}]"#,
        )
        .expect("should parse folder list");

        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].id, "AAMkAD+/=");
        assert!(folders[0].synchronized_folder);
        assert!(!folders[1].synchronized_folder);
    }

    #[test]
    fn test_settings_read_without_password_or_domain() {
        let settings: ConnectionSettings =
            serde_json::from_str(r#"{"serverName":"https://mail/EWS/Exchange.asmx","username":"root"}"#)
                .expect("should parse settings");

        assert_eq!(settings.server_name, "https://mail/EWS/Exchange.asmx");
        assert_eq!(settings.username, "root");
        assert_eq!(settings.domain_name, None);
        assert_eq!(settings.password, None);
    }

    #[test]
    fn test_settings_read_with_null_members() {
        let settings: ConnectionSettings = serde_json::from_str(
            r#"{"serverName":null,"domainName":null,"username":"root","password":null}"#,
        )
        .expect("should parse settings with nulls");

        assert_eq!(settings.server_name, "");
        assert_eq!(settings.domain_name, None);
        assert_eq!(settings.username, "root");
        assert_eq!(settings.password, None);
    }

    #[test]
    fn test_settings_write_omits_absent_members() {
        let settings = ConnectionSettings {
            server_name: "https://mail/EWS/Exchange.asmx".to_string(),
            domain_name: None,
            username: "root".to_string(),
            password: Some("gtn".to_string()),
        };

        let value = serde_json::to_value(&settings).expect("should serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "serverName": "https://mail/EWS/Exchange.asmx",
                "username": "root",
                "password": "gtn",
            })
        );
    }

    #[test]
    fn test_field_keys_round_trip_struct_names() {
        for (field, struct_name) in SettingsField::ALL
            .iter()
            .zip(["server_name", "domain_name", "username", "password"])
        {
            assert_eq!(SettingsField::from_struct_field(struct_name), Some(*field));
        }
        assert_eq!(SettingsField::from_struct_field("unknown"), None);
    }
}
