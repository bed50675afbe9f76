// ============================================================================
// Exchange integration REST endpoints
// ============================================================================

/// Mount point of the Exchange integration REST service on the portal
pub const DEFAULT_API_BASE: &str = "/portal/rest/exchange";

/// Query parameter carrying the folder id for sync/unsync
pub const FOLDER_ID_PARAM: &str = "folderId";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// GET: folders with their sync state
    Calendars,
    /// GET reads, POST writes the connection settings
    Settings,
    /// GET with `folderId`: start mirroring a folder
    Sync,
    /// GET with `folderId`: stop mirroring a folder
    Unsync,
    /// GET: run a synchronization pass right away
    SyncNow,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Calendars => "/calendars",
            Endpoint::Settings => "/settings",
            Endpoint::Sync => "/sync",
            Endpoint::Unsync => "/unsync",
            Endpoint::SyncNow => "/syncNow",
        }
    }

    pub fn url(self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path())
    }

    /// Endpoint toggling sync for a single folder
    pub fn folder_sync(enabled: bool) -> Self {
        if enabled {
            Endpoint::Sync
        } else {
            Endpoint::Unsync
        }
    }
}
