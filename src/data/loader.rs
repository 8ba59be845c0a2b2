use crate::data::image::{Pixel, StackImage};
use image::{Rgb, RgbImage};
use std::path::Path;

/// Color written for cells that never received a pixel (warp gaps).
pub const SENTINEL_COLOR: Pixel = Pixel {
    r: 255,
    g: 192,
    b: 203,
};

pub fn load_image<P: AsRef<Path>>(path: P, id: u32) -> crate::Result<StackImage> {
    let path = path.as_ref();
    let rgb = image::open(path)?.to_rgb8();

    let mut img = StackImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let Rgb([r, g, b]) = *rgb.get_pixel(x, y);
        Pixel::new(r, g, b)
    });
    img.id = id;
    img.filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    log::info!(
        "Image {} loaded ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img)
}

pub fn write_image<P: AsRef<Path>>(path: P, image: &StackImage) -> crate::Result<()> {
    let path = path.as_ref();
    let rgb = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image
            .get_pixel(x as i32, y as i32)
            .unwrap_or(SENTINEL_COLOR);
        Rgb([p.r, p.g, p.b])
    });
    rgb.save(path)?;
    log::info!("Image {} saved", path.display());
    Ok(())
}

pub fn validate_image_size(img: &StackImage, min_size: u32) -> crate::Result<()> {
    if img.width() < min_size || img.height() < min_size {
        return Err(anyhow::anyhow!(
            "Image too small: {}x{}, minimum: {}x{}",
            img.width(),
            img.height(),
            min_size,
            min_size
        ));
    }
    Ok(())
}
