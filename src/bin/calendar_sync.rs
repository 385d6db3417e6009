//! Week 16: register the training review meeting on the team calendar.
//!
//! Refreshes the access token from the credentials file, checks whether an
//! event with the same name already sits in the given time window, and
//! inserts it only when missing. All timestamps are JST (+09:00).

use std::error::Error;
use std::fs;
use std::path::Path;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use deskwork::dates;
use deskwork::logging;

const CALENDAR_API_URL: &str = "http://localhost:8901";
const CREDENTIALS_PATH: &str = "./config/calendar_credentials.json";

const EVENT_SUMMARY: &str = "Training review meeting";
const EVENT_LOCATION: &str = "Room G1-205";
const EVENT_DATE: &str = "2026-03-02";
const EVENT_START: &str = "10:00";
const EVENT_END: &str = "11:00";

#[derive(Debug, Error)]
enum CalendarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credentials file is not valid JSON: {0}")]
    BadCredentials(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("calendar API returned HTTP {status} for {endpoint}")]
    Api { status: u16, endpoint: String },

    #[error(transparent)]
    Date(#[from] dates::DateError),
}

#[derive(Debug, Deserialize)]
struct Credentials {
    client_id: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct EventList {
    items: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    id: String,
    summary: String,
}

#[derive(Debug, Deserialize)]
struct InsertedEvent {
    id: String,
}

/// Client for the team calendar API.
struct CalendarClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl CalendarClient {
    async fn connect(base_url: &str, credentials_path: &Path) -> Result<Self, CalendarError> {
        let raw = fs::read_to_string(credentials_path)?;
        let credentials: Credentials = serde_json::from_str(&raw)?;
        debug!("refreshing token for client {}", credentials.client_id);

        let http = Client::new();
        let endpoint = format!("{base_url}/oauth/token");
        let response = http
            .post(&endpoint)
            .json(&serde_json::json!({
                "client_id": credentials.client_id,
                "refresh_token": credentials.refresh_token,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CalendarError::Api {
                status: response.status().as_u16(),
                endpoint,
            });
        }

        let token: TokenResponse = response.json().await?;
        info!("calendar token refreshed");
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            access_token: token.access_token,
        })
    }

    /// Look for an event called `summary` between `time_min` and
    /// `time_max` (RFC 3339). Returns its id, or None when the slot is
    /// still free.
    async fn find_event(
        &self,
        summary: &str,
        time_min: &str,
        time_max: &str,
    ) -> Result<Option<String>, CalendarError> {
        let endpoint = format!("{}/events", self.base_url);
        let response = self
            .http
            .get(&endpoint)
            .bearer_auth(&self.access_token)
            .query(&[("timeMin", time_min), ("timeMax", time_max)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CalendarError::Api {
                status: response.status().as_u16(),
                endpoint,
            });
        }

        let list: EventList = response.json().await?;
        let found = list
            .items
            .into_iter()
            .find(|event| event.summary == summary)
            .map(|event| event.id);
        debug!("lookup for {summary:?}: {found:?}");
        Ok(found)
    }

    /// Insert a new event and return its id.
    async fn insert_event(
        &self,
        summary: &str,
        location: &str,
        start: &str,
        end: &str,
    ) -> Result<String, CalendarError> {
        let endpoint = format!("{}/events", self.base_url);
        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({
                "summary": summary,
                "location": location,
                "start": {"dateTime": start},
                "end": {"dateTime": end},
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CalendarError::Api {
                status: response.status().as_u16(),
                endpoint,
            });
        }

        let inserted: InsertedEvent = response.json().await?;
        info!("inserted event {summary:?} as {}", inserted.id);
        Ok(inserted.id)
    }

    /// Insert the event unless one with the same name already fills the
    /// window. Returns the event id either way.
    async fn register_once(
        &self,
        summary: &str,
        location: &str,
        start: &str,
        end: &str,
    ) -> Result<(String, bool), CalendarError> {
        if let Some(existing) = self.find_event(summary, start, end).await? {
            info!("event {summary:?} already registered as {existing}");
            return Ok((existing, false));
        }
        let id = self.insert_event(summary, location, start, end).await?;
        Ok((id, true))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    let start = dates::convert_isoformat(EVENT_DATE, EVENT_START)?;
    let end = dates::convert_isoformat(EVENT_DATE, EVENT_END)?;

    let client = CalendarClient::connect(CALENDAR_API_URL, Path::new(CREDENTIALS_PATH)).await?;
    let (id, inserted) = client
        .register_once(EVENT_SUMMARY, EVENT_LOCATION, &start, &end)
        .await?;

    if inserted {
        println!("Registered {EVENT_SUMMARY:?} ({start} - {end}) as {id}");
    } else {
        println!("{EVENT_SUMMARY:?} was already on the calendar as {id}");
    }
    Ok(())
}
