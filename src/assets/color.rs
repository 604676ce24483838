use crate::foundation::core::Rgba8;
use crate::foundation::error::{ImprintError, ImprintResult};
use serde::{Deserialize, Serialize};

/// Parse a colour string: `#rgb`, `#rrggbb`, `#rrggbbaa` or `rgba(r, g, b, a)`.
///
/// Channels in `rgba()` are integers in `0..=255`; alpha is a fraction in `0..=1`.
pub fn parse_color(s: &str) -> ImprintResult<Rgba8> {
    let s = s.trim();
    if s.starts_with('#') {
        return parse_hex(s).map_err(ImprintError::validation);
    }
    if s.starts_with("rgba(") {
        return parse_rgba_fn(s).map_err(ImprintError::validation);
    }
    Err(ImprintError::validation(format!(
        "unsupported colour string \"{s}\""
    )))
}

/// Build a colour from `[r, g, b]` or `[r, g, b, a]` with 8-bit channels and fractional alpha.
pub fn color_from_components(v: &[f64]) -> ImprintResult<Rgba8> {
    fn channel(c: f64) -> ImprintResult<u8> {
        if !c.is_finite() || !(0.0..=255.0).contains(&c) {
            return Err(ImprintError::validation(format!(
                "colour channel {c} is out of range 0..=255"
            )));
        }
        Ok(c.round() as u8)
    }

    let (r, g, b, a) = match v {
        [r, g, b] => (*r, *g, *b, 1.0),
        [r, g, b, a] => (*r, *g, *b, *a),
        _ => {
            return Err(ImprintError::validation(
                "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
            ));
        }
    };
    Ok(Rgba8::new(channel(r)?, channel(g)?, channel(b)?, alpha_to_u8(a)?))
}

fn alpha_to_u8(a: f64) -> ImprintResult<u8> {
    if !a.is_finite() || !(0.0..=1.0).contains(&a) {
        return Err(ImprintError::validation(format!(
            "alpha {a} is out of range 0..=1"
        )));
    }
    Ok((a * 255.0).round() as u8)
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    let body = &s[1..];
    if !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("invalid hex colour \"{s}\""));
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    let expanded;
    let body = if body.len() == 3 {
        expanded = body.chars().flat_map(|c| [c, c]).collect::<String>();
        expanded.as_str()
    } else {
        body
    };

    match body.len() {
        6 => Ok(Rgba8::new(
            hex_byte(&body[0..2])?,
            hex_byte(&body[2..4])?,
            hex_byte(&body[4..6])?,
            255,
        )),
        8 => Ok(Rgba8::new(
            hex_byte(&body[0..2])?,
            hex_byte(&body[2..4])?,
            hex_byte(&body[4..6])?,
            hex_byte(&body[6..8])?,
        )),
        _ => Err(format!(
            "hex colour \"{s}\" must be #RGB, #RRGGBB or #RRGGBBAA"
        )),
    }
}

fn parse_rgba_fn(s: &str) -> Result<Rgba8, String> {
    let invalid = || format!("invalid rgba colour \"{s}\"");
    let inner = s
        .strip_prefix("rgba(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(invalid)?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let [r, g, b, a] = parts.as_slice() else {
        return Err(invalid());
    };

    let channel = |p: &str| -> Result<u8, String> {
        if p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        p.parse::<u8>().map_err(|_| invalid())
    };
    let alpha = |p: &str| -> Result<u8, String> {
        let well_formed = p == "1"
            || p
                .strip_prefix('0')
                .unwrap_or(p)
                .strip_prefix('.')
                .is_some_and(|frac| !frac.is_empty() && frac.chars().all(|c| c.is_ascii_digit()));
        if !well_formed {
            return Err(invalid());
        }
        let v: f64 = p.parse().map_err(|_| invalid())?;
        alpha_to_u8(v).map_err(|_| invalid())
    };

    Ok(Rgba8::new(channel(r)?, channel(g)?, channel(b)?, alpha(a)?))
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            Arr(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Str(s) => parse_color(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => color_from_components(&v).map_err(serde::de::Error::custom),
        }
    }
}

impl Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&format_args!(
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
