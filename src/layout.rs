use std::rc::Rc;

use crate::foundation::core::{Frame, Length};

/// Handle to the frame a node renders inside.
///
/// Most parents know their child frame at compile time. A parent whose size depends on loaded
/// data (a picture without a declared size) hands out a deferred handle instead; it is read only
/// when the child's commands execute, after the parent's enter command has stored the size.
#[derive(Clone)]
pub(crate) struct ParentFrame(Rc<dyn Fn() -> Frame>);

impl ParentFrame {
    pub(crate) fn fixed(frame: Frame) -> Self {
        Self(Rc::new(move || frame))
    }

    pub(crate) fn deferred(resolve: impl Fn() -> Frame + 'static) -> Self {
        Self(Rc::new(resolve))
    }

    pub(crate) fn get(&self) -> Frame {
        (self.0)()
    }
}

impl std::fmt::Debug for ParentFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ParentFrame").field(&self.get()).finish()
    }
}

/// Absolute frame of a box declared at `(x, y)` inside `parent` with the given lengths.
pub(crate) fn place(parent: Frame, x: f64, y: f64, width: Length, height: Length) -> Frame {
    let origin = parent.origin_offset(finite_or_zero(x), finite_or_zero(y));
    Frame::new(
        origin.x,
        origin.y,
        width.resolve(parent.width),
        height.resolve(parent.height),
    )
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
#[path = "../tests/unit/layout/layout.rs"]
mod tests;
