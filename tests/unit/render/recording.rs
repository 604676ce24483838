use super::*;

#[test]
fn save_and_restore_track_depth() {
    let mut s = RecordingSurface::new(10, 10);
    let a = s.save();
    let b = s.save();
    assert_eq!((a, b), (Checkpoint(0), Checkpoint(1)));
    assert_eq!(s.depth(), 2);
    s.restore_to(a);
    assert_eq!(s.depth(), 0);
    assert_eq!(s.ops().len(), 3);
}

#[test]
fn encode_serializes_ops_unless_overridden() {
    let mut s = RecordingSurface::new(10, 10);
    s.fill_rounded_rect(RoundedRect::from_rect(Rect::new(0.0, 0.0, 1.0, 1.0), 0.0), Rgba8::BLACK);
    let json = s.encode(ImageFormat::Png, 100).unwrap();
    let v: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(v[0]["op"], "fill");

    let mut empty = RecordingSurface::new(1, 1).with_encoded_output(Vec::new());
    assert!(empty.encode(ImageFormat::Png, 100).unwrap().is_empty());
}
