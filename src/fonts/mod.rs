pub(crate) mod cache;
pub(crate) mod shaping;
pub(crate) mod style;
