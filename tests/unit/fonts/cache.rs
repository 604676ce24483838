use super::*;

fn fixture(name: &str) -> Vec<u8> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data/fonts")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

#[test]
fn register_and_resolve_exact_style() {
    let mut cache = ResourceCache::new();
    cache
        .register_font("Sans", FontStyle::Regular, fixture("DejaVuSans.ttf"), false)
        .unwrap();
    cache
        .register_font("Sans", FontStyle::Bold, fixture("DejaVuSans-Bold.ttf"), false)
        .unwrap();

    let bold = cache.resolve_font(Some("Sans"), FontStyle::Bold, 24.0);
    assert!(!bold.is_builtin());
    assert_eq!(bold.size(), 24.0);
    assert_eq!(bold.typeface().unwrap().style(), FontStyle::Bold);

    let italic = cache.resolve_font(Some("Sans"), FontStyle::Italic, 24.0);
    assert_eq!(italic.typeface().unwrap().style(), FontStyle::Regular);
}

#[test]
fn garbage_bytes_fail_to_decode() {
    let mut cache = ResourceCache::new();
    let err = cache
        .register_font("Broken", FontStyle::Regular, b"not a font".to_vec(), true)
        .unwrap_err();
    assert!(matches!(err, ImprintError::FontDecode { ref family } if family == "Broken"));
    assert!(!cache.has_font("Broken", FontStyle::Regular));
    assert_eq!(cache.default_family(), None);
}

#[test]
fn first_default_family_wins() {
    let mut cache = ResourceCache::new();
    cache
        .register_font("A", FontStyle::Regular, fixture("DejaVuSans.ttf"), true)
        .unwrap();
    cache
        .register_font("B", FontStyle::Regular, fixture("DejaVuSans-Bold.ttf"), true)
        .unwrap();
    cache
        .register_font("A", FontStyle::Bold, fixture("DejaVuSans-Bold.ttf"), true)
        .unwrap();
    assert_eq!(cache.default_family(), Some("A"));

    let font = cache.resolve_font(None, FontStyle::Regular, 12.0);
    assert_eq!(font.typeface().unwrap().family(), "A");
}

#[test]
fn unknown_family_falls_back_without_error() {
    let mut cache = ResourceCache::new();
    let font = cache.resolve_font(Some("Unknown"), FontStyle::Regular, 16.0);
    assert!(font.is_builtin());
    assert_eq!(font.size(), 16.0);
    assert_eq!(font.style(), FontStyle::Regular);
}

#[test]
fn drawable_fonts_are_cached_per_size() {
    let mut cache = ResourceCache::new();
    cache
        .register_font("Sans", FontStyle::Regular, fixture("DejaVuSans.ttf"), false)
        .unwrap();
    let a = cache.resolve_font(Some("Sans"), FontStyle::Regular, 10.0);
    let b = cache.resolve_font(Some("Sans"), FontStyle::Regular, 10.0);
    let c = cache.resolve_font(Some("Sans"), FontStyle::Regular, 11.0);
    assert!(Arc::ptr_eq(a.typeface().unwrap().bytes(), b.typeface().unwrap().bytes()));
    assert_eq!(c.size(), 11.0);
}

#[test]
fn strict_lookup_rejects_unknown_family() {
    let mut cache = ResourceCache::new();
    cache
        .register_font("Sans", FontStyle::Bold, fixture("DejaVuSans-Bold.ttf"), false)
        .unwrap();
    cache
        .register_font("Sans", FontStyle::Regular, fixture("DejaVuSans.ttf"), false)
        .unwrap();

    let raw = cache.all_raw_bytes_for(&["Sans".to_owned()]).unwrap();
    let styles: Vec<FontStyle> = raw.iter().map(|r| r.style).collect();
    assert_eq!(styles, vec![FontStyle::Regular, FontStyle::Bold]);

    let err = cache
        .all_raw_bytes_for(&["Sans".to_owned(), "Missing".to_owned()])
        .unwrap_err();
    assert!(matches!(err, ImprintError::UnknownFontFamily(ref f) if f == "Missing"));
}

#[test]
fn duplicate_registration_keeps_first_bytes() {
    let mut cache = ResourceCache::new();
    let regular = fixture("DejaVuSans.ttf");
    let len = regular.len();
    cache
        .register_font("Sans", FontStyle::Regular, regular, false)
        .unwrap();
    cache
        .register_font("Sans", FontStyle::Regular, fixture("DejaVuSans-Bold.ttf"), false)
        .unwrap();
    let raw = cache.all_raw_bytes_for(&["Sans".to_owned()]).unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].bytes.len(), len);
}

#[test]
fn registering_a_family_replaces_an_earlier_fallback() {
    let mut cache = ResourceCache::new();
    let before = cache.resolve_font(Some("Sans"), FontStyle::Regular, 16.0);
    assert!(before.is_builtin());

    cache
        .register_font("Sans", FontStyle::Regular, fixture("DejaVuSans.ttf"), false)
        .unwrap();
    let after = cache.resolve_font(Some("Sans"), FontStyle::Regular, 16.0);
    assert!(!after.is_builtin());
    assert_eq!(after.typeface().unwrap().family(), "Sans");
}

#[test]
fn registering_a_style_replaces_the_nearest_style() {
    let mut cache = ResourceCache::new();
    cache
        .register_font("Sans", FontStyle::Regular, fixture("DejaVuSans.ttf"), false)
        .unwrap();
    let before = cache.resolve_font(Some("Sans"), FontStyle::Bold, 16.0);
    assert_eq!(before.typeface().unwrap().style(), FontStyle::Regular);

    cache
        .register_font("Sans", FontStyle::Bold, fixture("DejaVuSans-Bold.ttf"), false)
        .unwrap();
    let after = cache.resolve_font(Some("Sans"), FontStyle::Bold, 16.0);
    assert_eq!(after.typeface().unwrap().style(), FontStyle::Bold);
}
