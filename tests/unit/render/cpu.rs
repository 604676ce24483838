use super::*;

fn px(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

fn stops() -> Vec<GradientStop> {
    vec![
        GradientStop { offset: 0.0, color: Rgba8::new(255, 0, 0, 255) },
        GradientStop { offset: 0.5, color: Rgba8::new(0, 255, 0, 255) },
        GradientStop { offset: 1.0, color: Rgba8::new(0, 0, 255, 255) },
    ]
}

#[test]
fn rejects_degenerate_sizes() {
    assert!(matches!(CpuSurface::new(0, 10), Err(ImprintError::SurfaceCreation(_))));
    assert!(matches!(CpuSurface::new(10, 0), Err(ImprintError::SurfaceCreation(_))));
    assert!(matches!(CpuSurface::new(70_000, 1), Err(ImprintError::SurfaceCreation(_))));
    let s = CpuSurface::new(16, 8).unwrap();
    assert_eq!((s.width(), s.height()), (16, 8));
}

#[test]
fn solid_fill_covers_rect_only() {
    let mut s = CpuSurface::new(16, 16).unwrap();
    let shape = RoundedRect::from_rect(Rect::new(0.0, 0.0, 8.0, 16.0), 0.0);
    s.fill_rounded_rect(shape, Rgba8::new(255, 0, 0, 255));
    let pixels = s.pixels_premul();
    assert_eq!(px(&pixels, 16, 2, 8), [255, 0, 0, 255]);
    assert_eq!(px(&pixels, 16, 12, 8), [0, 0, 0, 0]);
}

#[test]
fn restore_pops_clips_pushed_after_checkpoint() {
    let mut s = CpuSurface::new(16, 16).unwrap();
    let full = RoundedRect::from_rect(Rect::new(0.0, 0.0, 16.0, 16.0), 0.0);

    let cp = s.save();
    assert_eq!(cp, Checkpoint(0));
    s.clip_rounded_rect(RoundedRect::from_rect(Rect::new(0.0, 0.0, 4.0, 4.0), 0.0));
    let inner = s.save();
    assert_eq!(inner, Checkpoint(1));
    s.clip_rounded_rect(RoundedRect::from_rect(Rect::new(0.0, 0.0, 2.0, 2.0), 0.0));
    s.fill_rounded_rect(full, Rgba8::new(0, 0, 255, 255));

    s.restore_to(cp);
    s.fill_rounded_rect(
        RoundedRect::from_rect(Rect::new(8.0, 8.0, 16.0, 16.0), 0.0),
        Rgba8::new(0, 255, 0, 255),
    );

    let pixels = s.pixels_premul();
    assert_eq!(px(&pixels, 16, 1, 1), [0, 0, 255, 255]);
    assert_eq!(px(&pixels, 16, 3, 3), [0, 0, 0, 0]);
    assert_eq!(px(&pixels, 16, 12, 12), [0, 255, 0, 255]);
}

#[test]
fn gradient_runs_corner_to_corner() {
    let pixels = gradient_pixels(32, 32, Point::new(0.0, 0.0), Point::new(32.0, 32.0), &stops());
    let tl = px(&pixels, 32, 0, 0);
    let br = px(&pixels, 32, 31, 31);
    let mid = px(&pixels, 32, 16, 16);
    assert!(tl[0] > 240 && tl[2] < 15);
    assert!(br[2] > 240 && br[0] < 15);
    assert!(mid[1] > 200);
}

#[test]
fn stop_sampling_clamps_and_interpolates() {
    let s = stops();
    assert_eq!(sample_stops(&s, -1.0), Rgba8::new(255, 0, 0, 255));
    assert_eq!(sample_stops(&s, 2.0), Rgba8::new(0, 0, 255, 255));
    assert_eq!(sample_stops(&s, 0.25), Rgba8::new(128, 128, 0, 255));
    assert_eq!(sample_stops(&[], 0.5), Rgba8::default());
    let single = [GradientStop { offset: 0.3, color: Rgba8::WHITE }];
    assert_eq!(sample_stops(&single, 0.9), Rgba8::WHITE);
}

#[test]
fn image_draw_scales_region_into_destination() {
    let mut rgba = vec![0u8; 2 * 2 * 4];
    rgba[0..4].copy_from_slice(&[255, 0, 0, 255]);
    rgba[4..8].copy_from_slice(&[0, 255, 0, 255]);
    rgba[8..12].copy_from_slice(&[0, 0, 255, 255]);
    rgba[12..16].copy_from_slice(&[255, 255, 255, 255]);
    let image = DecodedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new(rgba),
    };

    let mut s = CpuSurface::new(8, 8).unwrap();
    s.draw_image(&image, Rect::new(1.0, 0.0, 2.0, 1.0), Rect::new(0.0, 0.0, 8.0, 8.0));
    let pixels = s.pixels_premul();
    let [r, g, b, a] = px(&pixels, 8, 4, 4);
    assert_eq!((g, a), (255, 255));
    assert!(r < 40 && b < 40, "got {r} {g} {b}");
    assert_eq!(px(&pixels, 8, 0, 7)[3], 255);
}

#[test]
fn encodes_every_format() {
    let mut s = CpuSurface::new(4, 3).unwrap();
    s.fill_rounded_rect(
        RoundedRect::from_rect(Rect::new(0.0, 0.0, 4.0, 3.0), 0.0),
        Rgba8::new(10, 20, 30, 255),
    );

    let png = s.encode(ImageFormat::Png, 100).unwrap();
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    let back = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (4, 3));
    assert_eq!(back.get_pixel(1, 1).0, [10, 20, 30, 255]);

    let jpeg = s.encode(ImageFormat::Jpeg, 80).unwrap();
    assert!(jpeg.starts_with(&[0xFF, 0xD8]));

    let webp = s.encode(ImageFormat::Webp, 80).unwrap();
    assert!(webp.starts_with(b"RIFF"));
}

#[test]
fn oversized_gradient_paints_the_visible_window() {
    let red = Rgba8::new(255, 0, 0, 255);
    let solid = [
        GradientStop { offset: 0.0, color: red },
        GradientStop { offset: 1.0, color: red },
    ];
    let mut s = CpuSurface::new(10, 10).unwrap();
    let rect = Rect::new(0.0, 0.0, 100_000.0, 100_000.0);
    s.fill_linear_gradient(rect, Point::new(0.0, 0.0), Point::new(100_000.0, 100_000.0), &solid);
    let pixels = s.pixels_premul();
    assert_eq!(px(&pixels, 10, 0, 0), [255, 0, 0, 255]);
    assert_eq!(px(&pixels, 10, 9, 9), [255, 0, 0, 255]);
}

#[test]
fn clipped_gradient_samples_in_frame_coordinates() {
    let two = [
        GradientStop { offset: 0.0, color: Rgba8::new(255, 0, 0, 255) },
        GradientStop { offset: 1.0, color: Rgba8::new(0, 0, 255, 255) },
    ];
    let mut s = CpuSurface::new(100, 4).unwrap();
    // Frame spans -100..100 horizontally, so the surface shows its right half.
    let rect = Rect::new(-100.0, 0.0, 100.0, 4.0);
    s.fill_linear_gradient(rect, Point::new(-100.0, 2.0), Point::new(100.0, 2.0), &two);
    let pixels = s.pixels_premul();
    let left = px(&pixels, 100, 0, 2);
    let right = px(&pixels, 100, 99, 2);
    assert!((120..=136).contains(&left[0]) && (120..=136).contains(&left[2]), "{left:?}");
    assert!(right[2] > 245 && right[0] < 10, "{right:?}");
}
