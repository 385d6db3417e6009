//! Week 18: compose a business card image.
//!
//! Builds a 1074x614 card: white base, a colored band along the top, rule
//! lines marking the text area, and the company logo pasted (resized,
//! alpha-blended) into the top-right corner. Saved as PNG.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{GenericImageView, Rgb, RgbImage, RgbaImage};
use thiserror::Error;
use tracing::{debug, info};

use deskwork::logging;

const LOGO_PNG: &str = "./input/company_logo.png";
const OUTPUT_DIR: &str = "./output";
const OUTPUT_PNG: &str = "business_card.png";

// Standard Japanese business card at 300 dpi.
const CARD_WIDTH: u32 = 1074;
const CARD_HEIGHT: u32 = 614;

const BAND_HEIGHT: u32 = 80;
const BAND_COLOR: Rgb<u8> = Rgb([0x1f, 0x4e, 0x79]);
const RULE_COLOR: Rgb<u8> = Rgb([0xb0, 0xb0, 0xb0]);
const BACKGROUND: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);

const LOGO_SIZE: u32 = 160;
const LOGO_MARGIN: u32 = 24;

#[derive(Debug, Error)]
enum CardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("logo image not found: {0}")]
    LogoNotFound(PathBuf),
}

/// Fill a rectangle, clipped to the image bounds.
fn fill_rect(card: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = (x + width).min(card.width());
    let y_end = (y + height).min(card.height());
    for py in y..y_end {
        for px in x..x_end {
            card.put_pixel(px, py, color);
        }
    }
}

/// A 2px horizontal rule across the card.
fn draw_rule(card: &mut RgbImage, y: u32) {
    let width = card.width();
    fill_rect(card, 0, y, width, 2, RULE_COLOR);
}

/// Paste `overlay` onto `card` at (x, y), blending by the overlay's alpha.
fn paste_with_alpha(card: &mut RgbImage, overlay: &RgbaImage, x: u32, y: u32) {
    for (ox, oy, pixel) in overlay.enumerate_pixels() {
        let px = x + ox;
        let py = y + oy;
        if px >= card.width() || py >= card.height() {
            continue;
        }
        let alpha = pixel[3] as u32;
        if alpha == 0 {
            continue;
        }
        let below = card.get_pixel(px, py);
        let blended = Rgb([
            ((pixel[0] as u32 * alpha + below[0] as u32 * (255 - alpha)) / 255) as u8,
            ((pixel[1] as u32 * alpha + below[1] as u32 * (255 - alpha)) / 255) as u8,
            ((pixel[2] as u32 * alpha + below[2] as u32 * (255 - alpha)) / 255) as u8,
        ]);
        card.put_pixel(px, py, blended);
    }
}

/// The blank card: white base, colored band, rule lines.
fn make_base_card() -> RgbImage {
    let mut card = RgbImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, BACKGROUND);
    fill_rect(&mut card, 0, 0, CARD_WIDTH, BAND_HEIGHT, BAND_COLOR);
    draw_rule(&mut card, 300);
    draw_rule(&mut card, 420);
    card
}

/// Load the logo, resize to a LOGO_SIZE square and paste it into the
/// top-right corner.
fn paste_logo(card: &mut RgbImage, logo_png: &Path) -> Result<(), CardError> {
    if !logo_png.exists() {
        return Err(CardError::LogoNotFound(logo_png.to_path_buf()));
    }

    let logo = image::open(logo_png)?;
    debug!("logo loaded: {}x{}", logo.width(), logo.height());

    let resized = logo
        .resize(LOGO_SIZE, LOGO_SIZE, FilterType::Lanczos3)
        .to_rgba8();
    let x = CARD_WIDTH - resized.width() - LOGO_MARGIN;
    let y = LOGO_MARGIN;
    paste_with_alpha(card, &resized, x, y);
    Ok(())
}

fn make_card(logo_png: &Path, output_png: &Path) -> Result<(), CardError> {
    let mut card = make_base_card();
    paste_logo(&mut card, logo_png)?;

    if let Some(parent) = output_png.parent() {
        fs::create_dir_all(parent)?;
    }
    card.save(output_png)?;
    info!("card written: {}", output_png.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();

    let output_path = Path::new(OUTPUT_DIR).join(OUTPUT_PNG);
    make_card(Path::new(LOGO_PNG), &output_path)?;
    println!("Business card written: {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn write_test_logo(dir: &Path) -> PathBuf {
        // 4x4 solid red square, fully opaque
        let logo = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let path = dir.join("logo.png");
        logo.save(&path).unwrap();
        path
    }

    #[test]
    fn test_base_card_layout() {
        let card = make_base_card();
        assert_eq!(card.dimensions(), (CARD_WIDTH, CARD_HEIGHT));
        // inside the band
        assert_eq!(*card.get_pixel(10, 10), BAND_COLOR);
        // just below the band
        assert_eq!(*card.get_pixel(10, BAND_HEIGHT), BACKGROUND);
        // on a rule line
        assert_eq!(*card.get_pixel(500, 300), RULE_COLOR);
    }

    #[test]
    fn test_fill_rect_clips_to_bounds() {
        let mut card = RgbImage::from_pixel(10, 10, BACKGROUND);
        fill_rect(&mut card, 8, 8, 100, 100, BAND_COLOR);
        assert_eq!(*card.get_pixel(9, 9), BAND_COLOR);
        assert_eq!(*card.get_pixel(7, 7), BACKGROUND);
    }

    #[test]
    fn test_paste_blends_alpha() {
        let mut card = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        // half-transparent white over black lands mid-gray
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 128]));
        paste_with_alpha(&mut card, &overlay, 1, 1);

        let blended = card.get_pixel(1, 1);
        assert!(blended[0] > 120 && blended[0] < 135);
        // untouched corner stays black
        assert_eq!(*card.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_transparent_pixels_leave_base_untouched() {
        let mut card = RgbImage::from_pixel(4, 4, BACKGROUND);
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 0]));
        paste_with_alpha(&mut card, &overlay, 0, 0);
        assert_eq!(*card.get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn test_make_card_writes_png_with_logo() {
        let dir = tempdir().unwrap();
        let logo = write_test_logo(dir.path());
        let out = dir.path().join("card.png");

        make_card(&logo, &out).unwrap();

        let card = image::open(&out).unwrap().to_rgb8();
        assert_eq!(card.dimensions(), (CARD_WIDTH, CARD_HEIGHT));
        // the logo corner holds red, not the band color
        let inside_logo = card.get_pixel(CARD_WIDTH - LOGO_MARGIN - 2, LOGO_MARGIN + 2);
        assert_eq!(*inside_logo, Rgb([255, 0, 0]));
    }

    #[test]
    fn test_missing_logo_is_error() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("card.png");
        let err = make_card(&dir.path().join("nope.png"), &out).unwrap_err();
        assert!(matches!(err, CardError::LogoNotFound(_)));
    }
}
