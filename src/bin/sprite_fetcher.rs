//! Week 17: scrape a character sprite off the gallery page.
//!
//! Fetches the gallery HTML, finds the `<img>` whose alt text matches the
//! wanted character, resolves its relative `src` against the page URL and
//! downloads the image to `output/gotcha_<name>.png`.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use deskwork::logging;

const GALLERY_URL: &str = "https://gallery.example.com/sprites/";
const CHARACTER_NAME: &str = "pikachu";
const OUTPUT_DIR: &str = "./output";

#[derive(Debug, Error)]
enum FetchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bad URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("gallery returned HTTP {0}")]
    BadStatus(u16),

    #[error("no sprite found for {0:?}")]
    SpriteNotFound(String),

    #[error("matching <img> has no src attribute")]
    MissingSrc,
}

/// Find the `src` of the first `<img>` whose alt text equals `name`
/// (case-insensitive), resolved against `page_url`.
fn find_sprite_url(html: &str, page_url: &Url, name: &str) -> Result<Url, FetchError> {
    let document = Html::parse_document(html);
    let images = Selector::parse("img").expect("fixed selector parses");

    let wanted = name.to_lowercase();
    for image in document.select(&images) {
        let Some(alt) = image.value().attr("alt") else {
            continue;
        };
        if alt.to_lowercase() != wanted {
            continue;
        }
        let src = image.value().attr("src").ok_or(FetchError::MissingSrc)?;
        let resolved = page_url.join(src)?;
        debug!("sprite for {name:?}: {resolved}");
        return Ok(resolved);
    }
    Err(FetchError::SpriteNotFound(name.to_string()))
}

/// Fetch the gallery page, locate the sprite and save it. Returns the
/// path of the written file.
async fn fetch_sprite(
    gallery_url: &str,
    name: &str,
    output_dir: &Path,
) -> Result<PathBuf, FetchError> {
    let client = Client::new();
    let page_url = Url::parse(gallery_url)?;

    let page = client.get(page_url.clone()).send().await?;
    if !page.status().is_success() {
        return Err(FetchError::BadStatus(page.status().as_u16()));
    }
    let html = page.text().await?;
    info!("gallery page fetched ({} bytes)", html.len());

    let sprite_url = find_sprite_url(&html, &page_url, name)?;

    let image = client.get(sprite_url.clone()).send().await?;
    if !image.status().is_success() {
        return Err(FetchError::BadStatus(image.status().as_u16()));
    }
    let bytes = image.bytes().await?;

    fs::create_dir_all(output_dir)?;
    let target = output_dir.join(format!("gotcha_{}.png", name.to_lowercase()));
    fs::write(&target, &bytes)?;
    info!("sprite saved: {} ({} bytes)", target.display(), bytes.len());
    Ok(target)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    let saved = fetch_sprite(GALLERY_URL, CHARACTER_NAME, Path::new(OUTPUT_DIR)).await?;
    println!("Gotcha! Saved {}", saved.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GALLERY_HTML: &str = r#"
        <html><body>
          <h1>Sprite gallery</h1>
          <img src="sprites/001.png" alt="Bulbasaur">
          <img alt="broken, no src">
          <img src="sprites/025.png" alt="Pikachu">
        </body></html>
    "#;

    #[test]
    fn test_find_sprite_matches_alt_case_insensitive() {
        let base = Url::parse("https://gallery.example.com/page/").unwrap();
        let found = find_sprite_url(GALLERY_HTML, &base, "pikachu").unwrap();
        assert_eq!(
            found.as_str(),
            "https://gallery.example.com/page/sprites/025.png"
        );
    }

    #[test]
    fn test_find_sprite_unknown_name_is_error() {
        let base = Url::parse("https://gallery.example.com/").unwrap();
        let err = find_sprite_url(GALLERY_HTML, &base, "mew").unwrap_err();
        assert!(matches!(err, FetchError::SpriteNotFound(name) if name == "mew"));
    }

    #[test]
    fn test_img_without_src_is_error() {
        let base = Url::parse("https://gallery.example.com/").unwrap();
        let err = find_sprite_url(r#"<img alt="Mew">"#, &base, "mew").unwrap_err();
        assert!(matches!(err, FetchError::MissingSrc));
    }

    #[tokio::test]
    async fn test_fetch_sprite_end_to_end() {
        let server = MockServer::start().await;
        let page = format!(
            r#"<html><body><img src="/sprites/025.png" alt="Pikachu"></body></html>"#
        );
        Mock::given(method("GET"))
            .and(path("/gallery/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sprites/025.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let gallery = format!("{}/gallery/", server.uri());
        let saved = fetch_sprite(&gallery, "Pikachu", dir.path()).await.unwrap();

        assert_eq!(saved.file_name().unwrap(), "gotcha_pikachu.png");
        assert_eq!(fs::read(&saved).unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn test_fetch_sprite_surfaces_page_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let gallery = format!("{}/gallery/", server.uri());
        let err = fetch_sprite(&gallery, "Pikachu", dir.path()).await.unwrap_err();

        assert!(matches!(err, FetchError::BadStatus(404)));
    }
}
