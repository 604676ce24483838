use std::path::PathBuf;
use std::rc::Rc;

use super::*;
use crate::compile::compiler::Compiler;
use crate::render::executor::{RenderEnv, execute};
use crate::render::recording::{RecordingSurface, SurfaceOp};
use crate::render::surface::{ImageFormat, Surface};
use crate::scene::model::{BoxSize, Element, Scene, StyledRun};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

fn dejavu() -> Vec<u8> {
    std::fs::read(data_dir().join("fonts/DejaVuSans.ttf")).unwrap()
}

fn run(scene: &Scene, prepare: impl FnOnce(&mut RenderCx<'_>)) -> ImprintResult<Vec<SurfaceOp>> {
    let env = Rc::new(RenderEnv::new(
        Box::new(RecordingSurface::new(scene.width, scene.height)),
        AssetLoader::new(data_dir()),
        scene.defaults.clone(),
    ));
    env.with_cx(prepare);
    let (commands, barrier) = Compiler::compile(scene)?.into_parts();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(execute(commands, &barrier, &env))?;

    let env = Rc::try_unwrap(env).unwrap();
    let json = env.into_surface().encode(ImageFormat::Png, 100)?;
    Ok(serde_json::from_slice(&json).unwrap())
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn red() -> Rgba8 {
    Rgba8::new(255, 0, 0, 255)
}

#[test]
fn gradient_runs_corner_to_corner_of_its_frame() {
    let mut g = LinearGradient::new(vec![(0.0, red()).into(), (1.0, Rgba8::BLACK).into()]);
    g.x = 10.0;
    g.y = 20.0;
    g.width = Length::Px(50.0);
    g.height = Length::Percent(40.0);
    let ops = run(&Scene::new(200, 100).with_child(g), |_| {}).unwrap();

    assert_eq!(
        ops,
        vec![SurfaceOp::Gradient {
            rect: Rect::new(10.0, 20.0, 60.0, 60.0),
            start: Point::new(10.0, 20.0),
            end: Point::new(60.0, 60.0),
            stops: 2,
        }]
    );
}

#[test]
fn gradient_without_stops_is_rejected() {
    let scene = Scene::new(10, 10).with_child(LinearGradient::new(Vec::new()));
    let err = run(&scene, |_| {}).unwrap_err();
    assert!(matches!(err, ImprintError::Validation(_)));
}

#[test]
fn hidden_container_clips_children_until_exit() {
    let inner = ClipRect {
        x: 5.0,
        y: 5.0,
        size: BoxSize {
            size: Some(10.0),
            ..BoxSize::default()
        },
        ..ClipRect::default()
    };
    let outer = Container {
        x: 10.0,
        y: 10.0,
        size: BoxSize::px(100.0, 50.0),
        border_radius: CornerRadius::all(8.0),
        shadow: Some(Shadow {
            sigma: 4.0,
            color: Rgba8::BLACK,
        }),
        overflow: Overflow::Hidden,
        background_color: Some(red()),
        children: vec![inner.into()],
    };
    let ops = run(&Scene::new(200, 100).with_child(outer), |_| {}).unwrap();

    let frame = Rect::new(10.0, 10.0, 110.0, 60.0);
    assert_eq!(
        ops,
        vec![
            SurfaceOp::Shadow {
                rect: frame,
                sigma: 4.0
            },
            SurfaceOp::Save {
                checkpoint: Checkpoint(0)
            },
            SurfaceOp::Clip {
                rect: frame,
                radius: 8.0
            },
            SurfaceOp::Fill {
                rect: frame,
                color: red()
            },
            SurfaceOp::Save {
                checkpoint: Checkpoint(1)
            },
            SurfaceOp::Clip {
                rect: Rect::new(15.0, 15.0, 25.0, 25.0),
                radius: 0.0
            },
            SurfaceOp::Restore {
                checkpoint: Checkpoint(1)
            },
            SurfaceOp::Restore {
                checkpoint: Checkpoint(0)
            },
        ]
    );
}

#[test]
fn visible_container_never_saves() {
    let c = Container {
        background_color: Some(red()),
        ..Container::default()
    };
    let ops = run(&Scene::new(20, 10).with_child(c), |_| {}).unwrap();
    assert_eq!(
        ops,
        vec![SurfaceOp::Fill {
            rect: Rect::new(0.0, 0.0, 20.0, 10.0),
            color: red()
        }]
    );
}

#[test]
fn picture_children_see_the_drawn_size() {
    let child = Container {
        size: BoxSize {
            width: Some(Length::Percent(50.0)),
            height: None,
            size: None,
        },
        background_color: Some(red()),
        ..Container::default()
    };
    let mut pic = Picture::new(png(4, 2));
    pic.x = 5.0;
    pic.y = 5.0;
    pic.children.push(child.into());
    let ops = run(&Scene::new(100, 100).with_child(pic), |_| {}).unwrap();

    assert_eq!(
        ops,
        vec![
            SurfaceOp::Image {
                src: Rect::new(0.0, 0.0, 4.0, 2.0),
                dst: Rect::new(5.0, 5.0, 9.0, 7.0),
            },
            SurfaceOp::Fill {
                rect: Rect::new(5.0, 5.0, 7.0, 7.0),
                color: red()
            },
        ]
    );
}

#[test]
fn picture_region_scales_into_declared_width() {
    let mut pic = Picture::new(png(4, 2));
    pic.region = Some([1.0, 0.0, 3.0, 2.0]);
    pic.width = Some(Length::Px(20.0));
    let ops = run(&Scene::new(100, 100).with_child(pic), |_| {}).unwrap();
    assert_eq!(
        ops,
        vec![SurfaceOp::Image {
            src: Rect::new(1.0, 0.0, 3.0, 2.0),
            dst: Rect::new(0.0, 0.0, 20.0, 2.0),
        }]
    );
}

#[test]
fn inverted_picture_region_is_rejected() {
    let mut pic = Picture::new("./nothing.png");
    pic.region = Some([3.0, 0.0, 1.0, 2.0]);
    let err = run(&Scene::new(10, 10).with_child(pic), |_| {}).unwrap_err();
    assert!(matches!(err, ImprintError::Validation(_)));
}

#[test]
fn missing_picture_is_fatal() {
    let scene = Scene::new(10, 10).with_child(Picture::new("./no-such-picture.png"));
    let err = run(&scene, |_| {}).unwrap_err();
    assert!(matches!(err, ImprintError::Load { .. }), "{err}");
}

#[test]
fn text_draws_at_its_offset_with_the_default_family() {
    let mut text = Text::new("Hello");
    text.x = 3.0;
    text.y = 4.0;
    let ops = run(&Scene::new(200, 50).with_child(text), |cx| {
        cx.fonts
            .register_font("DejaVu", FontStyle::Regular, dejavu(), true)
            .unwrap();
    })
    .unwrap();

    assert_eq!(
        ops,
        vec![SurfaceOp::Text {
            origin: Point::new(3.0, 4.0),
            glyphs: 5,
            lines: 1,
        }]
    );
}

#[test]
fn text_rejects_non_positive_size() {
    let mut text = Text::new("x");
    text.font_size = Some(0.0);
    let err = run(&Scene::new(10, 10).with_child(text), |_| {}).unwrap_err();
    assert!(matches!(err, ImprintError::Validation(_)));
}

#[test]
fn paragraph_wraps_to_its_width() {
    let mut p = Paragraph::new(vec![
        "one two ".into(),
        StyledRun::bold("three").into(),
        " four five six".into(),
    ]);
    p.font_family = vec!["DejaVu".to_owned()];
    p.width = Some(Length::Px(60.0));
    let ops = run(&Scene::new(200, 200).with_child(p), |cx| {
        cx.fonts
            .register_font("DejaVu", FontStyle::Regular, dejavu(), false)
            .unwrap();
    })
    .unwrap();

    let [SurfaceOp::Text { lines, glyphs, .. }] = ops.as_slice() else {
        panic!("expected one text op, got {ops:?}");
    };
    assert!(*lines > 1);
    assert!(*glyphs >= "onetwothreefourfivesix".len());
}

#[test]
fn paragraph_with_unknown_family_fails() {
    let mut p = Paragraph::new(vec!["hi".into()]);
    p.font_family = vec!["Nope".to_owned()];
    let err = run(&Scene::new(10, 10).with_child(p), |_| {}).unwrap_err();
    assert!(matches!(err, ImprintError::UnknownFontFamily(f) if f == "Nope"));
}

#[test]
fn paragraph_without_any_family_fails() {
    let p = Paragraph::new(vec!["hi".into()]);
    let err = run(&Scene::new(10, 10).with_child(p), |_| {}).unwrap_err();
    assert!(matches!(err, ImprintError::UnknownFontFamily(_)));
}

#[test]
fn load_font_registers_and_swallows_failures() {
    let mut para = Paragraph::new(vec!["after load".into()]);
    para.font_family = vec!["Deja".to_owned()];
    let children: Vec<Element> = vec![
        LoadFont::new("Broken", "./fonts/missing.ttf").into(),
        LoadFont::new("Garbage", "./fonts/LICENSE-DejaVu.txt").into(),
        LoadFont::new("Deja", "./fonts/DejaVuSans.ttf").into(),
        LoadFont::new("Deja", "./fonts/DejaVuSans-Bold.ttf").into(),
        para.into(),
    ];
    let mut scene = Scene::new(200, 50);
    scene.children = children;

    let ops = run(&scene, |_| {}).unwrap();
    assert!(matches!(ops.as_slice(), [SurfaceOp::Text { glyphs, .. }] if *glyphs > 0));
}
