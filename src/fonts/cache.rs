use std::collections::HashMap;
use std::sync::Arc;

use crate::fonts::shaping::TextShaper;
use crate::fonts::style::FontStyle;
use crate::foundation::error::{ImprintError, ImprintResult};

/// A decoded face living in the shared font collection.
#[derive(Clone, Debug)]
pub struct Typeface {
    pub(crate) family: String,
    pub(crate) style: FontStyle,
    pub(crate) bytes: Arc<Vec<u8>>,
    /// Family name the shaping collection knows this face by.
    pub(crate) collection_family: String,
}

impl Typeface {
    /// Family alias the face was registered under.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Style the face was registered under.
    pub fn style(&self) -> FontStyle {
        self.style
    }

    /// Raw font file bytes.
    pub fn bytes(&self) -> &Arc<Vec<u8>> {
        &self.bytes
    }
}

/// A typeface paired with a size, ready to shape and draw.
///
/// `face` is `None` only when the process has no usable fallback font; such a font measures zero
/// and draws nothing.
#[derive(Clone, Debug)]
pub struct DrawableFont {
    pub(crate) face: Option<Typeface>,
    pub(crate) style: FontStyle,
    pub(crate) size: f32,
    pub(crate) builtin: bool,
}

impl DrawableFont {
    /// Requested size in pixels.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Requested style.
    pub fn style(&self) -> FontStyle {
        self.style
    }

    /// True when lookup fell back to the built-in face.
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Decoded face backing this font, if any.
    pub fn typeface(&self) -> Option<&Typeface> {
        self.face.as_ref()
    }
}

/// Raw bytes of one registered face, as handed to paragraph shaping.
#[derive(Clone, Debug)]
pub struct RawFont {
    /// Family alias.
    pub family: String,
    /// Registered style.
    pub style: FontStyle,
    /// Font file bytes.
    pub bytes: Arc<Vec<u8>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct DrawableKey {
    family: Option<String>,
    style: FontStyle,
    size_bits: u32,
}

/// Per-generation font registry.
///
/// Faces are keyed by `(family, style)` and never replaced once registered. The first family
/// registered with `is_default` becomes the default for lookups that name no family.
pub struct ResourceCache {
    faces: HashMap<String, HashMap<FontStyle, Typeface>>,
    drawables: HashMap<DrawableKey, DrawableFont>,
    default_family: Option<String>,
    builtin: Option<Option<Typeface>>,
    font_ctx: parley::FontContext,
    shaper: TextShaper,
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("families", &self.faces.keys().collect::<Vec<_>>())
            .field("default_family", &self.default_family)
            .finish_non_exhaustive()
    }
}

impl ResourceCache {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            faces: HashMap::new(),
            drawables: HashMap::new(),
            default_family: None,
            builtin: None,
            font_ctx: parley::FontContext::default(),
            shaper: TextShaper::new(),
        }
    }

    /// Decode `bytes` and register them under `(family, style)`.
    ///
    /// Decoding failures return [`ImprintError::FontDecode`] and leave the registry untouched.
    /// Registering an existing key is ignored.
    pub fn register_font(
        &mut self,
        family: &str,
        style: FontStyle,
        bytes: Vec<u8>,
        is_default: bool,
    ) -> ImprintResult<()> {
        if self.has_font(family, style) {
            tracing::debug!(family, ?style, "font already registered, keeping first");
        } else {
            let bytes = Arc::new(bytes);
            let collection_family =
                decode_into(&mut self.font_ctx, &bytes).ok_or_else(|| {
                    ImprintError::FontDecode {
                        family: family.to_owned(),
                    }
                })?;
            self.faces.entry(family.to_owned()).or_default().insert(
                style,
                Typeface {
                    family: family.to_owned(),
                    style,
                    bytes,
                    collection_family,
                },
            );
        }

        if is_default {
            match &self.default_family {
                None => {
                    self.default_family = Some(family.to_owned());
                }
                Some(existing) if existing == family => {}
                Some(existing) => {
                    tracing::warn!(
                        family,
                        existing = existing.as_str(),
                        "default font family already set, ignoring"
                    );
                }
            }
        }
        Ok(())
    }

    /// Whether `(family, style)` is registered.
    pub fn has_font(&self, family: &str, style: FontStyle) -> bool {
        self.faces
            .get(family)
            .is_some_and(|styles| styles.contains_key(&style))
    }

    /// Name of the default family, if one was registered.
    pub fn default_family(&self) -> Option<&str> {
        self.default_family.as_deref()
    }

    /// Lenient lookup: never fails.
    ///
    /// `None` means the default family. A family that is unknown, or lacks `style`, falls back to
    /// another style of the family and then to the built-in face. Only exact `(family, style)`
    /// hits are cached; fallbacks are recomputed so a later registration takes effect.
    pub fn resolve_font(&mut self, family: Option<&str>, style: FontStyle, size: f32) -> DrawableFont {
        let key = DrawableKey {
            family: family.map(str::to_owned),
            style,
            size_bits: size.to_bits(),
        };
        if let Some(hit) = self.drawables.get(&key) {
            return hit.clone();
        }

        let wanted = family.map(str::to_owned).or_else(|| self.default_family.clone());
        let styles = wanted.as_deref().and_then(|name| self.faces.get(name));

        if let Some(face) = styles.and_then(|styles| styles.get(&style)) {
            let font = DrawableFont {
                face: Some(face.clone()),
                style,
                size,
                builtin: false,
            };
            self.drawables.insert(key, font.clone());
            return font;
        }

        let nearest = styles
            .and_then(|styles| {
                styles
                    .get(&FontStyle::Regular)
                    .or_else(|| styles.values().min_by_key(|t| t.style))
            })
            .cloned();
        match nearest {
            Some(face) => {
                tracing::debug!(
                    family = face.family.as_str(),
                    ?style,
                    "style not registered, using nearest"
                );
                DrawableFont {
                    face: Some(face),
                    style,
                    size,
                    builtin: false,
                }
            }
            None => {
                if let Some(name) = wanted.as_deref() {
                    tracing::warn!(family = name, ?style, "unknown font family, using built-in font");
                }
                DrawableFont {
                    face: self.builtin_face(),
                    style,
                    size,
                    builtin: true,
                }
            }
        }
    }

    /// Strict lookup: raw bytes of every registered style of every named family.
    pub fn all_raw_bytes_for(&self, families: &[String]) -> ImprintResult<Vec<RawFont>> {
        let mut out = Vec::new();
        for family in families {
            let styles = self
                .faces
                .get(family)
                .ok_or_else(|| ImprintError::UnknownFontFamily(family.clone()))?;
            let mut entries: Vec<&Typeface> = styles.values().collect();
            entries.sort_by_key(|t| t.style);
            out.extend(entries.into_iter().map(|t| RawFont {
                family: t.family.clone(),
                style: t.style,
                bytes: Arc::clone(&t.bytes),
            }));
        }
        Ok(out)
    }

    pub(crate) fn shaping_parts(&mut self) -> (&mut parley::FontContext, &mut TextShaper) {
        (&mut self.font_ctx, &mut self.shaper)
    }

    fn builtin_face(&mut self) -> Option<Typeface> {
        if let Some(cached) = &self.builtin {
            return cached.clone();
        }
        let face = load_system_sans().and_then(|bytes| {
            let bytes = Arc::new(bytes);
            let collection_family = decode_into(&mut self.font_ctx, &bytes)?;
            Some(Typeface {
                family: collection_family.clone(),
                style: FontStyle::Regular,
                bytes,
                collection_family,
            })
        });
        if face.is_none() {
            tracing::warn!("no system font available, text without a registered font will not draw");
        }
        self.builtin = Some(face.clone());
        face
    }
}

/// Register `bytes` with the shaping collection and return the family name it was filed under.
pub(crate) fn decode_into(font_ctx: &mut parley::FontContext, bytes: &Arc<Vec<u8>>) -> Option<String> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.as_ref().clone()), None);
    let (family_id, _) = families.first()?;
    font_ctx
        .collection
        .family_name(*family_id)
        .map(str::to_owned)
}

fn load_system_sans() -> Option<Vec<u8>> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    let id = db.query(&usvg::fontdb::Query {
        families: &[usvg::fontdb::Family::SansSerif],
        ..usvg::fontdb::Query::default()
    })?;
    db.with_face_data(id, |data, _index| data.to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/fonts/cache.rs"]
mod tests;
