use egui::ColorImage;
use std::sync::mpsc::Sender;

/// Decode an encoded image (jpeg/png/webp) into an egui image
pub fn decode_image(bytes: &[u8]) -> Result<ColorImage, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels = rgba.as_flat_samples();
    Ok(ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()))
}

async fn fetch_image(url: &str) -> Result<ColorImage, String> {
    let response = crate::utils::http::client()
        .get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("status {}", response.status()));
    }
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    decode_image(&bytes)
}

/// Fetch a cover in the background. Failures arrive as `None` so the caller
/// can stop waiting for that url.
pub fn spawn_image_fetch(url: String, tx: Sender<(String, Option<ColorImage>)>) {
    crate::utils::async_helper::spawn_fire_and_forget(move || {
        Box::pin(async move {
            let image = match fetch_image(&url).await {
                Ok(image) => Some(image),
                Err(e) => {
                    log::debug!("[Artwork] Failed to load {}: {}", url, e);
                    None
                }
            };
            let _ = tx.send((url, image));
            Ok::<(), String>(())
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_is_decoded_to_rgba() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_image(&png).unwrap();
        assert_eq!(decoded.size, [3, 2]);
        assert_eq!(decoded.pixels[0], egui::Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_image(b"not an image").is_err());
    }
}
