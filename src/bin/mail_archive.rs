//! Week 15: pull today's mail attachments into a dated work directory.
//!
//! A thin client for the course mail gateway: refresh the access token
//! from the credentials file, search messages carrying attachments, and
//! download every attachment into `YYYYMMDD_work_dir/`. The directory is
//! snapshotted afterwards.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use deskwork::logging;
use deskwork::snapshot;

const MAIL_API_URL: &str = "http://localhost:8900";
const CREDENTIALS_PATH: &str = "./config/mail_credentials.json";
const SNAPSHOT_DIR: &str = "./snapshots";
const SEARCH_QUERY: &str = "has:attachment";

#[derive(Debug, Error)]
enum MailError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credentials file is not valid JSON: {0}")]
    BadCredentials(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail API returned HTTP {status} for {endpoint}")]
    Api { status: u16, endpoint: String },
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
struct SearchResponse {
    messages: Vec<MessageSummary>,
}

#[derive(Debug, Deserialize)]
struct MessageSummary {
    id: String,
    #[serde(default)]
    attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
struct Attachment {
    id: String,
    filename: String,
}

/// Thin wrapper around the mail gateway API.
#[derive(Debug)]
struct MailClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl MailClient {
    /// Read the credentials file and trade the refresh token for an
    /// access token.
    async fn connect(base_url: &str, credentials_path: &Path) -> Result<Self, MailError> {
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
            return Err(MailError::Api {
                status: response.status().as_u16(),
                endpoint,
            });
        }

        let token: TokenResponse = response.json().await?;
        info!("mail token refreshed");
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            access_token: token.access_token,
        })
    }

    /// Search messages; the gateway understands the usual query strings.
    async fn search(&self, query: &str) -> Result<Vec<MessageSummary>, MailError> {
        let endpoint = format!("{}/messages", self.base_url);
        let response = self
            .http
            .get(&endpoint)
            .bearer_auth(&self.access_token)
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailError::Api {
                status: response.status().as_u16(),
                endpoint,
            });
        }

        let found: SearchResponse = response.json().await?;
        info!("search {query:?} matched {} messages", found.messages.len());
        Ok(found.messages)
    }

    /// Fetch one attachment's bytes.
    async fn fetch_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<Vec<u8>, MailError> {
        let endpoint = format!(
            "{}/messages/{message_id}/attachments/{attachment_id}",
            self.base_url
        );
        let response = self
            .http
            .get(&endpoint)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailError::Api {
                status: response.status().as_u16(),
                endpoint,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Download every attachment of every matching message into `dir`.
    /// Returns the number of files written; individual failures are
    /// logged and skipped.
    async fn download_attachments(&self, query: &str, dir: &Path) -> Result<usize, MailError> {
        let messages = self.search(query).await?;
        fs::create_dir_all(dir)?;

        let jobs = messages.iter().flat_map(|message| {
            message
                .attachments
                .iter()
                .map(move |attachment| self.fetch_job(message, attachment, dir))
        });
        let results = join_all(jobs).await;

        let saved = results.iter().filter(|ok| **ok).count();
        info!("downloaded {saved} attachments into {}", dir.display());
        Ok(saved)
    }

    async fn fetch_job(&self, message: &MessageSummary, attachment: &Attachment, dir: &Path) -> bool {
        match self.fetch_attachment(&message.id, &attachment.id).await {
            Ok(bytes) => {
                let target = dir.join(&attachment.filename);
                match fs::write(&target, bytes) {
                    Ok(()) => {
                        debug!("saved {}", target.display());
                        true
                    }
                    Err(e) => {
                        error!("could not write {}: {e}", target.display());
                        false
                    }
                }
            }
            Err(e) => {
                warn!("attachment {} of {} skipped: {e}", attachment.id, message.id);
                false
            }
        }
    }
}

/// `YYYYMMDD_work_dir` for today, created if needed.
fn make_work_dir(parent: &Path) -> Result<PathBuf, std::io::Error> {
    let name = Local::now().format("%Y%m%d_work_dir").to_string();
    let dir = parent.join(name);
    fs::create_dir_all(&dir)?;
    info!("work directory ready: {}", dir.display());
    Ok(dir)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    let client = MailClient::connect(MAIL_API_URL, Path::new(CREDENTIALS_PATH)).await?;
    let work_dir = make_work_dir(Path::new("."))?;

    let saved = client.download_attachments(SEARCH_QUERY, &work_dir).await?;
    println!("Downloaded {saved} attachments into {}", work_dir.display());

    let snapshot_dir = snapshot::make_snapshot(&work_dir, Path::new(SNAPSHOT_DIR))?;
    println!("Snapshot written: {}", snapshot_dir.display());
    Ok(())
}
