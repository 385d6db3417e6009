//! Week 20: drive a browser through its automation endpoint and collect
//! bookmarks.
//!
//! Talks the WebDriver protocol over HTTP to a locally running driver:
//! opens a session, visits each page in its own tab, records the page
//! title and URL, saves the collected bookmarks as JSON and quits.

use std::error::Error;
use std::fs;
use std::path::Path;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use deskwork::logging;

const DRIVER_URL: &str = "http://localhost:9515";
const OUTPUT_DIR: &str = "./output";
const OUTPUT_JSON: &str = "bookmarks.json";

const PAGES_TO_VISIT: [&str; 3] = [
    "https://www.rust-lang.org/",
    "https://docs.rs/",
    "https://crates.io/",
];

#[derive(Debug, Error)]
enum DriverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("driver returned HTTP {status} for {endpoint}")]
    Api { status: u16, endpoint: String },
}

#[derive(Debug, Deserialize)]
struct SessionValue {
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    value: SessionValue,
}

#[derive(Debug, Deserialize)]
struct StringResponse {
    value: String,
}

#[derive(Debug, Deserialize)]
struct WindowValue {
    handle: String,
}

#[derive(Debug, Deserialize)]
struct WindowResponse {
    value: WindowValue,
}

/// One saved bookmark.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct Bookmark {
    title: String,
    url: String,
}

/// A WebDriver session against a locally running driver.
#[derive(Debug)]
struct BrowserSession {
    http: Client,
    base_url: String,
    session_id: String,
}

impl BrowserSession {
    /// Open a fresh session.
    async fn start(base_url: &str) -> Result<Self, DriverError> {
        let http = Client::new();
        let endpoint = format!("{base_url}/session");
        let response = http
            .post(&endpoint)
            .json(&serde_json::json!({"capabilities": {}}))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DriverError::Api {
                status: response.status().as_u16(),
                endpoint,
            });
        }

        let session: SessionResponse = response.json().await?;
        info!("browser session {} started", session.value.session_id);
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            session_id: session.value.session_id,
        })
    }

    fn endpoint(&self, tail: &str) -> String {
        format!("{}/session/{}/{tail}", self.base_url, self.session_id)
    }

    async fn post(
        &self,
        tail: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, DriverError> {
        let endpoint = self.endpoint(tail);
        let response = self.http.post(&endpoint).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(DriverError::Api {
                status: response.status().as_u16(),
                endpoint,
            });
        }
        Ok(response)
    }

    async fn get_string(&self, tail: &str) -> Result<String, DriverError> {
        let endpoint = self.endpoint(tail);
        let response = self.http.get(&endpoint).send().await?;
        if !response.status().is_success() {
            return Err(DriverError::Api {
                status: response.status().as_u16(),
                endpoint,
            });
        }
        let parsed: StringResponse = response.json().await?;
        Ok(parsed.value)
    }

    /// Load `url` in the current tab.
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        debug!("navigating to {url}");
        self.post("url", serde_json::json!({"url": url})).await?;
        Ok(())
    }

    /// Title of the current page.
    async fn title(&self) -> Result<String, DriverError> {
        self.get_string("title").await
    }

    /// URL the browser actually landed on.
    async fn current_url(&self) -> Result<String, DriverError> {
        self.get_string("url").await
    }

    /// Open a new tab and switch to it.
    async fn open_tab(&self) -> Result<String, DriverError> {
        let response = self
            .post("window/new", serde_json::json!({"type": "tab"}))
            .await?;
        let window: WindowResponse = response.json().await?;

        self.post("window", serde_json::json!({"handle": window.value.handle}))
            .await?;
        debug!("switched to tab {}", window.value.handle);
        Ok(window.value.handle)
    }

    /// End the session and close the browser.
    async fn quit(self) -> Result<(), DriverError> {
        let endpoint = format!("{}/session/{}", self.base_url, self.session_id);
        let response = self.http.delete(&endpoint).send().await?;
        if !response.status().is_success() {
            return Err(DriverError::Api {
                status: response.status().as_u16(),
                endpoint,
            });
        }
        info!("browser session {} closed", self.session_id);
        Ok(())
    }

    /// Visit each page in its own tab and record title + landing URL.
    async fn collect_bookmarks(&self, pages: &[&str]) -> Result<Vec<Bookmark>, DriverError> {
        let mut bookmarks = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            // the session starts with one tab already open
            if index > 0 {
                self.open_tab().await?;
            }
            self.navigate(page).await?;
            bookmarks.push(Bookmark {
                title: self.title().await?,
                url: self.current_url().await?,
            });
        }
        info!("collected {} bookmarks", bookmarks.len());
        Ok(bookmarks)
    }
}

fn save_bookmarks(output_json: &Path, bookmarks: &[Bookmark]) -> Result<(), DriverError> {
    if let Some(parent) = output_json.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(bookmarks)?;
    fs::write(output_json, json)?;
    info!("bookmarks written: {}", output_json.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    let session = BrowserSession::start(DRIVER_URL).await?;
    let bookmarks = session.collect_bookmarks(&PAGES_TO_VISIT).await?;
    session.quit().await?;

    for bookmark in &bookmarks {
        println!("{} -> {}", bookmark.title, bookmark.url);
    }

    let output_path = Path::new(OUTPUT_DIR).join(OUTPUT_JSON);
    save_bookmarks(&output_path, &bookmarks)?;
    println!("Saved {} bookmarks to {}", bookmarks.len(), output_path.display());
    Ok(())
}
