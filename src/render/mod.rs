/// CPU raster surface backed by `vello_cpu`.
pub mod cpu;
pub(crate) mod executor;
pub(crate) mod finalize;
/// Surface that records draw calls instead of rasterizing.
pub mod recording;
/// Drawing surface interface and its value types.
pub mod surface;
