use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::surface::{ImageFormat, Surface};

/// Snapshot `surface` and encode it as `format`.
///
/// `quality` is clamped to `1..=100`. A surface that yields no bytes is reported as
/// [`ImprintError::Encode`].
pub(crate) fn finalize(
    surface: &mut dyn Surface,
    format: ImageFormat,
    quality: u8,
) -> ImprintResult<Vec<u8>> {
    let bytes = surface.encode(format, quality.clamp(1, 100))?;
    if bytes.is_empty() {
        return Err(ImprintError::encode(format!(
            "{format} snapshot of {}x{} surface produced no bytes",
            surface.width(),
            surface.height()
        )));
    }
    tracing::debug!(%format, bytes = bytes.len(), "encoded surface");
    Ok(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/render/finalize.rs"]
mod tests;
