use exchange_shared::{CalendarFolder, ConnectionSettings, Endpoint, FOLDER_ID_PARAM};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;

use crate::error::WidgetError;

/// Client for the Exchange integration REST service
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeApi {
    base: String,
}

impl ExchangeApi {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn url(&self, endpoint: Endpoint) -> String {
        endpoint.url(&self.base)
    }

    /// Folders with their sync state. The backend answers an empty body when
    /// it cannot reach Exchange, which comes back as an empty list.
    pub async fn list_calendars(&self) -> Result<Vec<CalendarFolder>, WidgetError> {
        let response = Request::get(&self.url(Endpoint::Calendars)).send().await?;

        let folders: Option<Vec<CalendarFolder>> = read_optional_json(response).await?;
        Ok(folders.unwrap_or_default())
    }

    pub async fn get_settings(&self) -> Result<Option<ConnectionSettings>, WidgetError> {
        let response = Request::get(&self.url(Endpoint::Settings)).send().await?;

        read_optional_json(response).await
    }

    pub async fn save_settings(&self, settings: &ConnectionSettings) -> Result<(), WidgetError> {
        let response = Request::post(&self.url(Endpoint::Settings))
            .json(settings)?
            .send()
            .await?;

        ensure_success(&response)
    }

    pub async fn set_folder_sync(&self, folder_id: &str, enabled: bool) -> Result<(), WidgetError> {
        let response = Request::get(&self.url(Endpoint::folder_sync(enabled)))
            .query([(FOLDER_ID_PARAM, folder_id)])
            .send()
            .await?;

        ensure_success(&response)
    }

    pub async fn sync_now(&self) -> Result<(), WidgetError> {
        let response = Request::get(&self.url(Endpoint::SyncNow)).send().await?;

        ensure_success(&response)
    }
}

fn ensure_success(response: &Response) -> Result<(), WidgetError> {
    if response.ok() {
        Ok(())
    } else {
        Err(WidgetError::Http {
            status: response.status(),
            status_text: response.status_text(),
        })
    }
}

async fn read_optional_json<T: DeserializeOwned>(
    response: Response,
) -> Result<Option<T>, WidgetError> {
    ensure_success(&response)?;
    let body = response.text().await?;
    parse_optional_json(&body)
}

/// Empty body and `null` both mean "nothing to show".
fn parse_optional_json<T: DeserializeOwned>(body: &str) -> Result<Option<T>, WidgetError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str::<Option<T>>(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_absent() {
        let parsed: Option<Vec<CalendarFolder>> = parse_optional_json("  \n").expect("empty is ok");
        assert_eq!(parsed, None);

        let parsed: Option<ConnectionSettings> = parse_optional_json("null").expect("null is ok");
        assert_eq!(parsed, None);
    }

    #[test]
    fn test_folder_body_is_parsed() {
        let parsed: Option<Vec<CalendarFolder>> =
            parse_optional_json(r#"[{"id":"f1","name":"Calendar","synchronizedFolder":false}]"#)
                .expect("should parse");

        let folders = parsed.expect("should be present");
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].name, "Calendar");
    }

    #[test]
    fn test_garbage_body_is_an_error() {
        let parsed: Result<Option<Vec<CalendarFolder>>, _> = parse_optional_json("<html>");
        assert!(matches!(parsed, Err(WidgetError::JsonParse(_))));
    }
}
