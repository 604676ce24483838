/// Declaration tree: the scene and its element kinds.
pub mod model;
pub(crate) mod nodes;
