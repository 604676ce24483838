use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ImprintError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ImprintError::render("x").to_string().contains("render error:"));
    assert!(ImprintError::encode("x").to_string().contains("encode error:"));
    assert!(
        ImprintError::surface("x")
            .to_string()
            .contains("surface creation error:")
    );
    assert!(
        ImprintError::load("./a.png", "missing")
            .to_string()
            .contains("failed to load './a.png': missing")
    );
}

#[test]
fn font_errors_name_the_family() {
    let err = ImprintError::UnknownFontFamily("Roboto".to_string());
    assert_eq!(err.to_string(), "unknown font family 'Roboto'");

    let err = ImprintError::FontDecode {
        family: "Broken".to_string(),
    };
    assert!(err.to_string().contains("Broken"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ImprintError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
