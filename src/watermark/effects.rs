//! Pixel effects stage.
//!
//! Runs on the straight-alpha working bitmap before any vector drawing:
//! brightness, contrast, grayscale and blur compose in that order, then the
//! sharpen convolution, then additive noise. Alpha is never modified.

use super::model::EffectSettings;
use image::RgbaImage;

/// Apply every enabled effect in place.
pub fn apply_effects(img: &mut RgbaImage, effects: &EffectSettings, noise_seed: u32) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }

    apply_color_filters(img, effects.brightness, effects.contrast, effects.grayscale);

    if effects.blur.enabled && effects.blur.radius > 0.0 {
        *img = image::imageops::blur(img, effects.blur.radius);
    }

    if effects.sharpen.enabled && effects.sharpen.amount > 0.0 {
        *img = sharpen(img, effects.sharpen.amount);
    }

    if effects.noise.enabled && effects.noise.amount > 0.0 {
        add_noise(img, effects.noise.amount, noise_seed);
    }
}

/// Brightness, contrast and grayscale, each clamped before the next.
pub fn apply_color_filters(img: &mut RgbaImage, brightness: f32, contrast: f32, grayscale: f32) {
    let grayscale = grayscale.clamp(0.0, 1.0);
    if brightness == 1.0 && contrast == 1.0 && grayscale == 0.0 {
        return;
    }

    let inv = 1.0 - grayscale;
    // Luminance matrix blended towards identity by (1 - amount)
    let m = [
        [0.2126 + 0.7874 * inv, 0.7152 - 0.7152 * inv, 0.0722 - 0.0722 * inv],
        [0.2126 - 0.2126 * inv, 0.7152 + 0.2848 * inv, 0.0722 - 0.0722 * inv],
        [0.2126 - 0.2126 * inv, 0.7152 - 0.7152 * inv, 0.0722 + 0.9278 * inv],
    ];

    for pixel in img.pixels_mut() {
        let mut c = [0.0f32; 3];
        for i in 0..3 {
            let v = (pixel[i] as f32 * brightness).clamp(0.0, 255.0);
            c[i] = ((v - 127.5) * contrast + 127.5).clamp(0.0, 255.0);
        }
        if grayscale > 0.0 {
            let src = c;
            for (i, row) in m.iter().enumerate() {
                c[i] = (row[0] * src[0] + row[1] * src[1] + row[2] * src[2]).clamp(0.0, 255.0);
            }
        }
        for i in 0..3 {
            pixel[i] = c[i].round() as u8;
        }
    }
}

/// 3x3 sharpen with kernel `[[0,-k,0],[-k,1+4k,-k],[0,-k,0]]`.
///
/// Neighbours outside the image contribute nothing.
pub fn sharpen(img: &RgbaImage, amount: f32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let center = 1.0 + 4.0 * amount;

    RgbaImage::from_fn(w, h, |x, y| {
        let here = img.get_pixel(x, y);
        let mut acc = [
            here[0] as f32 * center,
            here[1] as f32 * center,
            here[2] as f32 * center,
        ];

        let neighbours = [
            (x.checked_sub(1), Some(y)),
            (x.checked_add(1).filter(|&nx| nx < w), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), y.checked_add(1).filter(|&ny| ny < h)),
        ];
        for (nx, ny) in neighbours {
            if let (Some(nx), Some(ny)) = (nx, ny) {
                let n = img.get_pixel(nx, ny);
                for c in 0..3 {
                    acc[c] -= n[c] as f32 * amount;
                }
            }
        }

        image::Rgba([
            acc[0].round().clamp(0.0, 255.0) as u8,
            acc[1].round().clamp(0.0, 255.0) as u8,
            acc[2].round().clamp(0.0, 255.0) as u8,
            here[3],
        ])
    })
}

/// Uniform noise in `[-amount/2, amount/2]`, drawn independently per channel.
pub fn add_noise(img: &mut RgbaImage, amount: f32, seed: u32) {
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        for c in 0..3u32 {
            let n = (hash_f32(x, y, seed.wrapping_add(c.wrapping_mul(0x632B_E5AB))) - 0.5) * amount;
            let v = pixel[c as usize] as f32 + n;
            pixel[c as usize] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[inline]
fn hash_u32(mut x: u32) -> u32 {
    x = x.wrapping_mul(0x9E3779B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EBCA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2AE35);
    x ^= x >> 16;
    x
}

/// Hash to `[0, 1)`.
#[inline]
fn hash_f32(x: u32, y: u32, seed: u32) -> f32 {
    let h = hash_u32(
        x.wrapping_mul(374761393)
            .wrapping_add(y.wrapping_mul(668265263))
            .wrapping_add(seed),
    );
    (h & 0x00FF_FFFF) as f32 / 16_777_216.0
}
