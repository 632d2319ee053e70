//! Image enhancement tests.

use hardsub::{EnhanceOptions, FrameBuffer, enhance};
use image::{Rgba, RgbaImage};

/// A dark frame with a light horizontal stroke, like subtitle text.
fn subtitle_like_crop() -> FrameBuffer {
    let image = RgbaImage::from_fn(48, 16, |x, y| {
        if (6..10).contains(&y) && (8..40).contains(&x) {
            Rgba([230, 230, 210, 255])
        } else {
            Rgba([40, 50, 60, 255])
        }
    });
    FrameBuffer::new(image)
}

#[test]
fn keeps_dimensions() {
    let crop = subtitle_like_crop();
    let enhanced = enhance(&crop, &EnhanceOptions::default());
    assert_eq!((enhanced.width(), enhanced.height()), (48, 16));
}

#[test]
fn output_is_grayscale_with_original_alpha() {
    let mut crop = subtitle_like_crop();
    crop.as_image_mut().put_pixel(0, 0, Rgba([40, 50, 60, 17]));

    let enhanced = enhance(&crop, &EnhanceOptions::default());

    for pixel in enhanced.as_image().pixels() {
        let [red, green, blue, _] = pixel.0;
        assert_eq!(red, green);
        assert_eq!(green, blue);
    }
    assert_eq!(enhanced.as_image().get_pixel(0, 0).0[3], 17);
    assert_eq!(enhanced.as_image().get_pixel(1, 0).0[3], 255);
}

#[test]
fn extremes_are_preserved() {
    let options = EnhanceOptions::default();

    let white = enhance(&FrameBuffer::filled(8, 8, [255, 255, 255, 255]), &options);
    assert!(white.as_image().pixels().all(|pixel| pixel.0 == [255, 255, 255, 255]));

    let black = enhance(&FrameBuffer::filled(8, 8, [0, 0, 0, 255]), &options);
    assert!(black.as_image().pixels().all(|pixel| pixel.0 == [0, 0, 0, 255]));
}

#[test]
fn text_stands_out_from_background() {
    let enhanced = enhance(&subtitle_like_crop(), &EnhanceOptions::default());
    let text = enhanced.as_image().get_pixel(24, 8).0[0];
    let background = enhanced.as_image().get_pixel(2, 1).0[0];
    assert_eq!(background, 0);
    assert!(text > 200, "text luma was {text}");
}

#[test]
fn two_passes_differ_from_one() {
    let options = EnhanceOptions::default();
    let crop = FrameBuffer::filled(16, 16, [128, 128, 128, 255]);

    let once = enhance(&crop, &options);
    let twice = enhance(&once, &options);

    assert_ne!(once, twice);
}

#[test]
fn is_deterministic() {
    let options = EnhanceOptions::default();
    let crop = subtitle_like_crop();
    assert_eq!(enhance(&crop, &options), enhance(&crop, &options));
}

#[test]
fn blur_can_be_disabled() {
    let options = EnhanceOptions {
        blur_sigma: 0.0,
        ..EnhanceOptions::default()
    };
    let enhanced = enhance(&subtitle_like_crop(), &options);
    // Without blur the stroke edge stays sharp.
    assert_eq!(enhanced.as_image().get_pixel(24, 5).0[0], 0);
    assert!(enhanced.as_image().get_pixel(24, 6).0[0] > 200);
}

#[test]
fn dark_levels_are_crushed_to_black() {
    let options = EnhanceOptions {
        blur_sigma: 0.0,
        ..EnhanceOptions::default()
    };

    // Contrast 2 maps everything below a quarter of the range to zero.
    for level in [1, 30, 60] {
        let enhanced = enhance(&FrameBuffer::filled(2, 2, [level, level, level, 255]), &options);
        assert_eq!(enhanced.as_image().get_pixel(0, 0).0[0], 0, "level {level}");
    }
}

#[test]
fn gamma_brightens_midtones() {
    let linear = EnhanceOptions {
        blur_sigma: 0.0,
        gamma: 1.0,
        ..EnhanceOptions::default()
    };
    let brightened = EnhanceOptions {
        blur_sigma: 0.0,
        ..EnhanceOptions::default()
    };
    let crop = FrameBuffer::filled(2, 2, [110, 110, 110, 255]);

    let before = enhance(&crop, &linear).as_image().get_pixel(0, 0).0[0];
    let after = enhance(&crop, &brightened).as_image().get_pixel(0, 0).0[0];
    assert!(before > 0);
    assert!(after > before, "gamma 0.5 gave {after}, linear {before}");
}
