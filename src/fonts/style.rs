/// Weight and slant of a registered face.
///
/// Serialized in kebab-case (`"bold-italic"`, `"regular"`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    /// Weight 100.
    Thin,
    /// Weight 100, italic.
    ThinItalic,
    /// Weight 300.
    Light,
    /// Weight 300, italic.
    LightItalic,
    /// Weight 400.
    #[default]
    Regular,
    /// Weight 400, italic.
    #[serde(alias = "regular-italic")]
    Italic,
    /// Weight 500.
    Medium,
    /// Weight 500, italic.
    MediumItalic,
    /// Weight 700.
    Bold,
    /// Weight 700, italic.
    BoldItalic,
    /// Weight 900.
    Black,
    /// Weight 900, italic.
    BlackItalic,
}

impl FontStyle {
    /// Every style, lightest first.
    pub const ALL: [FontStyle; 12] = [
        FontStyle::Thin,
        FontStyle::ThinItalic,
        FontStyle::Light,
        FontStyle::LightItalic,
        FontStyle::Regular,
        FontStyle::Italic,
        FontStyle::Medium,
        FontStyle::MediumItalic,
        FontStyle::Bold,
        FontStyle::BoldItalic,
        FontStyle::Black,
        FontStyle::BlackItalic,
    ];

    /// CSS-style numeric weight.
    pub fn weight(self) -> f32 {
        match self {
            FontStyle::Thin | FontStyle::ThinItalic => 100.0,
            FontStyle::Light | FontStyle::LightItalic => 300.0,
            FontStyle::Regular | FontStyle::Italic => 400.0,
            FontStyle::Medium | FontStyle::MediumItalic => 500.0,
            FontStyle::Bold | FontStyle::BoldItalic => 700.0,
            FontStyle::Black | FontStyle::BlackItalic => 900.0,
        }
    }

    /// Whether the face is slanted.
    pub fn is_italic(self) -> bool {
        matches!(
            self,
            FontStyle::ThinItalic
                | FontStyle::LightItalic
                | FontStyle::Italic
                | FontStyle::MediumItalic
                | FontStyle::BoldItalic
                | FontStyle::BlackItalic
        )
    }

    pub(crate) fn parley_weight(self) -> parley::style::FontWeight {
        parley::style::FontWeight::new(self.weight())
    }

    pub(crate) fn parley_slant(self) -> parley::style::FontStyle {
        if self.is_italic() {
            parley::style::FontStyle::Italic
        } else {
            parley::style::FontStyle::Normal
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fonts/style.rs"]
mod tests;
