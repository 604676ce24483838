pub(crate) mod barrier;
pub(crate) mod command;
pub(crate) mod compiler;
