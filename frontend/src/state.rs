//! Widget state machine.
//!
//! Every user event and every backend response is an [`Action`]. Applying an
//! action mutates [`WidgetState`] and returns the [`Command`]s to run next;
//! the component runs them and feeds each result back as another action.

use std::collections::BTreeSet;

use exchange_shared::{
    CalendarFolder, ConnectionSettings, DomainRequirement, FieldSet, MissingFields, SettingsField,
    ValidationRules,
};

use crate::config::WidgetConfig;
use crate::error::WidgetError;

pub const NOT_CONNECTED_MESSAGE: &str = "User seems not connected to Exchange";
pub const SETTINGS_READ_ERROR: &str = "Error getting settings from eXo Server.";
pub const SETTINGS_WRITE_ERROR: &str = "Unable to save Exchange settings.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionIcon {
    Connected,
    Disconnected,
}

/// Anchor bounds in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorRect {
    pub right: f64,
    pub bottom: f64,
}

/// Popup offsets in document coordinates (CSS `top` / `right`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupPosition {
    pub top: f64,
    pub right: f64,
}

impl PopupPosition {
    /// Directly under the anchor, right edges aligned.
    pub fn below(anchor: AnchorRect, scroll_y: f64, viewport_width: f64) -> Self {
        Self {
            top: anchor.bottom + scroll_y,
            right: (viewport_width - anchor.right).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    List,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListContent {
    Loading,
    NotConnected,
    Folders(Vec<CalendarFolder>),
}

/// Why a folder list was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
    /// Startup probe, only drives the button icon
    IconOnly,
    /// Popup render, tagged with the generation it was issued for
    Popup(u64),
}

/// Values currently typed into the settings form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsDraft {
    pub server_name: String,
    pub domain_name: String,
    pub username: String,
    pub password: String,
}

impl SettingsDraft {
    pub fn value(&self, field: SettingsField) -> &str {
        match field {
            SettingsField::ServerName => &self.server_name,
            SettingsField::DomainName => &self.domain_name,
            SettingsField::Username => &self.username,
            SettingsField::Password => &self.password,
        }
    }

    fn set(&mut self, field: SettingsField, value: String) {
        match field {
            SettingsField::ServerName => self.server_name = value,
            SettingsField::DomainName => self.domain_name = value,
            SettingsField::Username => self.username = value,
            SettingsField::Password => self.password = value,
        }
    }

    /// The password is write-only and never pre-filled.
    fn fill_from(&mut self, settings: ConnectionSettings) {
        self.server_name = settings.server_name;
        self.domain_name = settings.domain_name.unwrap_or_default();
        self.username = settings.username;
    }

    fn to_settings(&self, rules: &ValidationRules) -> ConnectionSettings {
        let domain_name = match rules.domain {
            DomainRequirement::Hidden => None,
            DomainRequirement::Optional => non_empty(&self.domain_name),
            DomainRequirement::Required => Some(self.domain_name.clone()),
        };
        let password = if rules.require_password {
            Some(self.password.clone())
        } else {
            non_empty(&self.password)
        };

        ConnectionSettings {
            server_name: self.server_name.clone(),
            domain_name,
            username: self.username.clone(),
            password,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Work the component must run on behalf of the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchCalendars(FetchPurpose),
    FetchSettings,
    SaveSettings(ConnectionSettings),
    SetFolderSync { folder_id: String, enabled: bool },
    SyncNow,
    Alert(String),
}

impl Command {
    /// Loggable name; settings commands carry the password.
    pub fn name(&self) -> &'static str {
        match self {
            Command::FetchCalendars(FetchPurpose::IconOnly) => "fetch-calendars(icon)",
            Command::FetchCalendars(FetchPurpose::Popup(_)) => "fetch-calendars(popup)",
            Command::FetchSettings => "fetch-settings",
            Command::SaveSettings(_) => "save-settings",
            Command::SetFolderSync { enabled: true, .. } => "sync-folder",
            Command::SetFolderSync { enabled: false, .. } => "unsync-folder",
            Command::SyncNow => "sync-now",
            Command::Alert(_) => "alert",
        }
    }
}

#[derive(Debug)]
pub enum Action {
    Initialized,
    /// Toggle button clicked; position is `None` when re-opened programmatically
    ButtonClicked(Option<PopupPosition>),
    CalendarsLoaded {
        purpose: FetchPurpose,
        result: Result<Vec<CalendarFolder>, WidgetError>,
    },
    MaskClicked {
        inside_popup: bool,
    },
    FolderToggled {
        folder_id: String,
        checked: bool,
    },
    FolderSyncFinished {
        folder_id: String,
        enabled: bool,
        result: Result<(), WidgetError>,
    },
    SyncNowClicked,
    SyncNowFinished(Result<(), WidgetError>),
    EditClicked,
    SettingsLoaded(Result<Option<ConnectionSettings>, WidgetError>),
    FieldEdited(SettingsField, String),
    SaveClicked,
    SettingsSaved(Result<(), WidgetError>),
    CancelClicked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
    rules: ValidationRules,
    sync_now_enabled: bool,
    alert_on_save_failure: bool,
    generation: u64,

    pub icon: ConnectionIcon,
    pub popup_visible: bool,
    pub mask_visible: bool,
    pub position: Option<PopupPosition>,
    pub panel: Panel,
    pub list: ListContent,
    /// Edit trigger disabled while the form is open
    pub edit_locked: bool,
    pub draft: SettingsDraft,
    pub invalid_fields: BTreeSet<SettingsField>,
    /// Inline error shown in the edit panel
    pub notice: Option<String>,
    pub saving: bool,
}

impl WidgetState {
    pub fn new(config: &WidgetConfig) -> Self {
        Self {
            rules: config.rules(),
            sync_now_enabled: config.sync_now_button,
            alert_on_save_failure: config.alert_on_save_failure,
            generation: 0,
            icon: ConnectionIcon::Disconnected,
            popup_visible: false,
            mask_visible: false,
            position: None,
            panel: Panel::List,
            list: ListContent::Loading,
            edit_locked: false,
            draft: SettingsDraft::default(),
            invalid_fields: BTreeSet::new(),
            notice: None,
            saving: false,
        }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn shows_sync_now(&self) -> bool {
        self.sync_now_enabled && matches!(&self.list, ListContent::Folders(folders) if !folders.is_empty())
    }

    pub fn apply(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::Initialized => vec![Command::FetchCalendars(FetchPurpose::IconOnly)],

            Action::ButtonClicked(position) => self.open_list(position),

            Action::CalendarsLoaded { purpose, result } => {
                self.calendars_loaded(purpose, result);
                Vec::new()
            }

            Action::MaskClicked { inside_popup } => {
                if !inside_popup {
                    self.mask_visible = false;
                    self.popup_visible = false;
                }
                Vec::new()
            }

            Action::FolderToggled { folder_id, checked } => self.folder_toggled(folder_id, checked),

            Action::FolderSyncFinished {
                folder_id,
                enabled,
                result,
            } => {
                match result {
                    Ok(()) => tracing::debug!("Folder {} sync set to {}", folder_id, enabled),
                    Err(e) => tracing::warn!(
                        "Failed to set sync of folder {} to {}: {}",
                        folder_id,
                        enabled,
                        e
                    ),
                }
                Vec::new()
            }

            Action::SyncNowClicked => {
                if self.shows_sync_now() {
                    vec![Command::SyncNow]
                } else {
                    Vec::new()
                }
            }

            Action::SyncNowFinished(result) => {
                if let Err(e) = result {
                    tracing::warn!("Manual synchronization failed: {}", e);
                }
                Vec::new()
            }

            Action::EditClicked => {
                if self.edit_locked {
                    return Vec::new();
                }
                self.draft = SettingsDraft::default();
                self.invalid_fields.clear();
                self.notice = None;
                self.saving = false;
                self.edit_locked = true;
                self.panel = Panel::Edit;
                vec![Command::FetchSettings]
            }

            Action::SettingsLoaded(result) => {
                self.settings_loaded(result);
                Vec::new()
            }

            Action::FieldEdited(field, value) => {
                self.draft.set(field, value);
                Vec::new()
            }

            Action::SaveClicked => self.save(),

            Action::SettingsSaved(result) if !self.awaiting_save() => {
                tracing::debug!("Ignoring save result after leaving the form: {:?}", result);
                Vec::new()
            }

            Action::SettingsSaved(Ok(())) => {
                self.saving = false;
                self.popup_visible = false;
                self.open_list(None)
            }

            Action::SettingsSaved(Err(e)) => {
                tracing::warn!("Failed to save Exchange settings: {}", e);
                self.saving = false;
                let message = e.user_message(SETTINGS_WRITE_ERROR);
                self.notice = Some(message.clone());
                if self.alert_on_save_failure {
                    vec![Command::Alert(message)]
                } else {
                    Vec::new()
                }
            }

            Action::CancelClicked => {
                self.saving = false;
                self.popup_visible = false;
                self.open_list(None)
            }
        }
    }

    fn awaiting_save(&self) -> bool {
        self.saving && self.panel == Panel::Edit
    }

    fn open_list(&mut self, position: Option<PopupPosition>) -> Vec<Command> {
        if position.is_some() {
            self.position = position;
        }
        self.edit_locked = false;
        self.panel = Panel::List;
        self.list = ListContent::Loading;
        self.notice = None;
        self.popup_visible = true;
        self.mask_visible = true;
        self.generation += 1;
        vec![Command::FetchCalendars(FetchPurpose::Popup(self.generation))]
    }

    fn calendars_loaded(
        &mut self,
        purpose: FetchPurpose,
        result: Result<Vec<CalendarFolder>, WidgetError>,
    ) {
        if let FetchPurpose::Popup(generation) = purpose {
            if generation != self.generation {
                tracing::debug!(
                    "Dropping folder list for generation {} (current {})",
                    generation,
                    self.generation
                );
                return;
            }
        }

        let folders = result.unwrap_or_else(|e| {
            tracing::warn!("Failed to list Exchange calendars: {}", e);
            Vec::new()
        });

        self.icon = if folders.is_empty() {
            ConnectionIcon::Disconnected
        } else {
            ConnectionIcon::Connected
        };

        if let FetchPurpose::Popup(_) = purpose {
            self.list = if folders.is_empty() {
                ListContent::NotConnected
            } else {
                ListContent::Folders(folders)
            };
        }
    }

    fn folder_toggled(&mut self, folder_id: String, checked: bool) -> Vec<Command> {
        if folder_id.is_empty() {
            tracing::warn!("Ignoring sync toggle for a folder without id");
            return Vec::new();
        }
        if let ListContent::Folders(folders) = &mut self.list {
            if let Some(folder) = folders.iter_mut().find(|f| f.id == folder_id) {
                folder.synchronized_folder = checked;
            }
        }
        vec![Command::SetFolderSync {
            folder_id,
            enabled: checked,
        }]
    }

    fn settings_loaded(&mut self, result: Result<Option<ConnectionSettings>, WidgetError>) {
        if self.panel != Panel::Edit {
            return;
        }
        match result {
            Ok(Some(settings)) => self.draft.fill_from(settings),
            Ok(None) => self.notice = Some(SETTINGS_READ_ERROR.to_string()),
            Err(e) => {
                tracing::warn!("Failed to read Exchange settings: {}", e);
                self.notice = Some(SETTINGS_READ_ERROR.to_string());
            }
        }
    }

    fn save(&mut self) -> Vec<Command> {
        if self.saving {
            return Vec::new();
        }
        let settings = self.draft.to_settings(&self.rules);
        if let Err(MissingFields(FieldSet(missing))) = self.rules.check(&settings) {
            tracing::debug!("Settings not saved, missing required fields");
            self.invalid_fields = missing;
            return Vec::new();
        }
        self.invalid_fields.clear();
        self.saving = true;
        self.notice = None;
        vec![Command::SaveSettings(settings)]
    }
}
