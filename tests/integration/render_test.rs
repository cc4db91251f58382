// End-to-end composition: settings snapshot in, encoded image out

use super::support::{gradient_image, write_png, BoxGlyphs};
use firemark::imaging::{decode_image, OutputFormat};
use firemark::watermark::{
    bounding_box, compose, render_composite, Layer, LogoCache, LogoLayer, Position, RenderOptions,
    RenderResources, ResizeMode, ResizePolicy, Settings, TextLayer,
};

fn text_layer(content: &str) -> TextLayer {
    let mut text = TextLayer::new(1);
    text.content = content.to_string();
    text.font_size = 30.0;
    text.base.opacity = 1.0;
    text
}

#[test]
fn test_fit_resize_exact_ratio() {
    let logos = LogoCache::new();
    let resources = RenderResources::new(&BoxGlyphs, &logos);
    let mut settings = Settings::default();
    settings.output.format = OutputFormat::Png;
    settings.output.resize = ResizePolicy {
        mode: ResizeMode::Fit,
        width: 800,
        height: 600,
    };

    let out = render_composite(&gradient_image(1600, 1200), &settings, &resources, &RenderOptions::default()).unwrap();
    assert_eq!((out.width, out.height), (800, 600));
    assert_eq!(decode_image(&out.data).unwrap().dimensions(), (800, 600));
}

#[test]
fn test_fit_resize_width_constrained() {
    let logos = LogoCache::new();
    let resources = RenderResources::new(&BoxGlyphs, &logos);
    let mut settings = Settings::default();
    settings.output.format = OutputFormat::Jpeg;
    settings.output.quality = 0.8;
    settings.output.resize = ResizePolicy {
        mode: ResizeMode::Fit,
        width: 800,
        height: 600,
    };

    let out = render_composite(&gradient_image(2000, 1000), &settings, &resources, &RenderOptions::default()).unwrap();
    assert_eq!(out.content_type(), "image/jpeg");
    assert_eq!(decode_image(&out.data).unwrap().dimensions(), (800, 400));
}

#[test]
fn test_small_source_is_not_upscaled() {
    let logos = LogoCache::new();
    let resources = RenderResources::new(&BoxGlyphs, &logos);
    let mut settings = Settings::default();
    settings.output.format = OutputFormat::Png;
    settings.output.resize = ResizePolicy {
        mode: ResizeMode::Width,
        width: 1920,
        height: 1080,
    };

    let out = render_composite(&gradient_image(640, 480), &settings, &resources, &RenderOptions::default()).unwrap();
    assert_eq!((out.width, out.height), (640, 480));
}

#[test]
fn test_extreme_aspect_source_still_exports() {
    let logos = LogoCache::new();
    let resources = RenderResources::new(&BoxGlyphs, &logos);
    let mut settings = Settings::default();
    settings.output.format = OutputFormat::Png;
    settings.output.resize = ResizePolicy {
        mode: ResizeMode::Width,
        width: 800,
        height: 600,
    };

    let out = render_composite(&gradient_image(5000, 3), &settings, &resources, &RenderOptions::default()).unwrap();
    assert_eq!((out.width, out.height), (800, 1));
    assert_eq!(decode_image(&out.data).unwrap().dimensions(), (800, 1));
}

#[test]
fn test_full_snapshot_renders_identically_twice() {
    let dir = tempfile::tempdir().unwrap();
    let logo_path = write_png(dir.path(), "logo.png", 40, 20);
    let mut logos = LogoCache::new();
    logos.load(&logo_path).unwrap();

    let mut settings = Settings::default();
    settings.layers.push(Layer::Text(text_layer("© 2024\nFiremark")));
    settings
        .layers
        .push(Layer::Logo(LogoLayer::new(2, "logo.png", &logo_path)));
    settings.frame.enabled = true;
    settings.pattern.enabled = true;
    settings.tile.enabled = true;
    settings.effects_enabled = true;
    settings.effects.contrast = 1.2;
    settings.effects.grayscale = 0.5;
    settings.output.format = OutputFormat::Png;

    let resources = RenderResources::new(&BoxGlyphs, &logos);
    let source = gradient_image(320, 240);
    let options = RenderOptions::default();

    let first = render_composite(&source, &settings, &resources, &options).unwrap();
    let second = render_composite(&source, &settings, &resources, &options).unwrap();
    assert_eq!(first.data, second.data);
}

#[test]
fn test_seeded_noise_is_reproducible() {
    let logos = LogoCache::new();
    let resources = RenderResources::new(&BoxGlyphs, &logos);
    let mut settings = Settings::default();
    settings.effects_enabled = true;
    settings.effects.noise.enabled = true;

    let source = gradient_image(64, 64);
    let seeded = RenderOptions::default().with_noise_seed(42);
    let a = compose(&source, &settings, &resources, &seeded).unwrap();
    let b = compose(&source, &settings, &resources, &seeded).unwrap();
    let c = compose(&source, &settings, &resources, &RenderOptions::default().with_noise_seed(7)).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, source);
}

#[test]
fn test_anchored_text_is_drawn_inside_its_box() {
    let logos = LogoCache::new();
    let resources = RenderResources::new(&BoxGlyphs, &logos);
    let mut text = text_layer("MMMM");
    text.color = "#FF0000".to_string();
    text.base.position = Position::new(1.0, 1.0);
    let layer = Layer::Text(text);

    let mut settings = Settings::default();
    settings.layers.push(layer.clone());

    let source = image::RgbaImage::from_pixel(400, 300, image::Rgba([0, 0, 0, 255]));
    let out = compose(&source, &settings, &resources, &RenderOptions::default()).unwrap();

    let rect = bounding_box(&layer, 400.0, 300.0, &resources).unwrap();
    assert_eq!(rect.right(), 380.0);
    assert_eq!(rect.bottom(), 280.0);

    let (cx, cy) = rect.center();
    assert_eq!(out.get_pixel(cx as u32 - 10, cy as u32)[0], 255);
    assert_eq!(out.get_pixel(10, 10), &image::Rgba([0, 0, 0, 255]));
}
