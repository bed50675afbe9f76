//! Types shared between the Exchange calendar widget and the REST backend it talks to.

pub mod api;
pub mod models;
pub mod validation;

pub use api::{Endpoint, DEFAULT_API_BASE, FOLDER_ID_PARAM};
pub use models::{CalendarFolder, ConnectionSettings, SettingsField};
pub use validation::{DomainRequirement, FieldSet, MissingFields, ValidationRules};
