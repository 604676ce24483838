use super::*;

const CARD: &str = r##"{
  "width": 480,
  "height": 854,
  "defaults": { "fontSize": 20, "fontFamily": "Roboto" },
  "children": [
    { "type": "load-font", "family": "Roboto", "src": "./Roboto-Regular.ttf", "default": true },
    { "type": "load-font", "family": "Roboto", "src": "./Roboto-Bold.ttf", "style": "bold" },
    {
      "type": "linear-gradient",
      "width": "100%",
      "height": "100%",
      "colors": [[0, "#6190E8"], [1, "#A7BFE8"]],
      "children": [
        {
          "type": "container",
          "x": 90, "y": 200, "width": 300, "height": 200,
          "backgroundColor": "#fff",
          "borderRadius": 16,
          "shadow": { "color": "rgba(0, 0, 0, 0.5)" },
          "overflow": "hidden",
          "children": [
            { "type": "text", "content": "Ask me anything", "fontSize": 24, "align": "center", "color": "#fff" }
          ]
        },
        {
          "type": "paragraph",
          "y": 822,
          "align": "center",
          "runs": ["Swipe up to ", { "text": "ask", "weight": "bold" }, { "text": " me", "slant": "italic" }]
        }
      ]
    }
  ]
}"##;

#[test]
fn parses_nested_scene() {
    let scene = Scene::from_json_str(CARD).unwrap();
    assert_eq!((scene.width, scene.height), (480, 854));
    assert_eq!(scene.defaults.font_family, vec!["Roboto".to_owned()]);
    assert_eq!(scene.defaults.font_size, 20.0);
    assert_eq!(scene.defaults.color, None);
    assert_eq!(scene.children.len(), 3);

    let Element::LoadFont(font) = &scene.children[0] else {
        panic!("expected load-font");
    };
    assert!(font.is_default);
    assert_eq!(font.style, FontStyle::Regular);

    let gradient = &scene.children[2];
    assert_eq!(gradient.name(), "LinearGradient");
    let Element::LinearGradient(g) = gradient else {
        panic!("expected gradient");
    };
    assert_eq!(g.colors.len(), 2);
    assert_eq!(g.colors[1].offset, 1.0);
    assert_eq!(g.colors[0].color, Rgba8::new(0x61, 0x90, 0xE8, 255));

    let Element::Container(c) = &gradient.children()[0] else {
        panic!("expected container");
    };
    assert_eq!(c.overflow, Overflow::Hidden);
    assert_eq!(c.border_radius, CornerRadius::all(16.0));
    assert_eq!(c.shadow.map(|s| s.sigma), Some(10.0));
    assert_eq!(c.shadow.map(|s| s.color.a), Some(128));
    assert_eq!(c.size.lengths(), (Length::Px(300.0), Length::Px(200.0)));

    let Element::Paragraph(p) = &gradient.children()[1] else {
        panic!("expected paragraph");
    };
    assert_eq!(p.align, Some(TextAlign::Center));
    assert_eq!(
        p.runs,
        vec![
            TextRun::from("Swipe up to "),
            StyledRun::bold("ask").into(),
            StyledRun::italic(" me").into(),
        ]
    );
}

#[test]
fn box_size_prefers_square_size() {
    let clip: ClipRect = serde_json::from_str(r#"{ "size": 40, "width": 10 }"#).unwrap();
    assert_eq!(clip.size.lengths(), (Length::Px(40.0), Length::Px(40.0)));
    let clip: ClipRect = serde_json::from_str(r#"{ "height": "50%" }"#).unwrap();
    assert_eq!(clip.size.lengths(), (Length::full(), Length::Percent(50.0)));
}

#[test]
fn picture_source_is_a_loader_string() {
    let pic: Picture = serde_json::from_str(r#"{ "src": "data:image/png;base64,AAAA", "region": [0, 0, 2, 2] }"#).unwrap();
    assert_eq!(pic.src, PictureSource::Uri("data:image/png;base64,AAAA".into()));
    assert_eq!(pic.region, Some([0.0, 0.0, 2.0, 2.0]));
    assert!(pic.children.is_empty());
}

#[test]
fn rejects_unknown_kinds_and_bad_values() {
    let err = Scene::from_json_str(r#"{ "width": 1, "height": 1, "children": [{ "type": "video" }] }"#)
        .unwrap_err();
    assert!(matches!(err, ImprintError::Validation(_)));

    assert!(serde_json::from_str::<Text>(r##"{ "content": "x", "color": "#12" }"##).is_err());
    assert!(serde_json::from_str::<Text>(r#"{ "content": "x", "width": "50" }"#).is_err());
    assert!(serde_json::from_str::<TextRun>(r#"{ "text": "x", "weight": "heavy" }"#).is_err());
}

#[test]
fn builders_default_sensibly() {
    let scene = Scene::new(10, 20)
        .with_child(Text::new("hi"))
        .with_child(Paragraph::new(vec!["a".into()]));
    assert_eq!(scene.children.len(), 2);
    let Element::Text(t) = &scene.children[0] else {
        panic!("expected text");
    };
    assert_eq!(t.width, Length::full());
    assert_eq!(t.font_size, None);
    assert_eq!(TextDefaults::default().line_height, 1.0);
}
