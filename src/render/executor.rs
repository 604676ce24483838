use std::cell::RefCell;
use std::rc::Rc;

use crate::assets::loader::AssetLoader;
use crate::compile::barrier::CompletionBarrier;
use crate::compile::command::CommandList;
use crate::fonts::cache::ResourceCache;
use crate::foundation::error::{ImprintError, ImprintResult};
use crate::render::surface::Surface;
use crate::scene::model::TextDefaults;

/// Everything command actions share during one generation.
///
/// Actions borrow the surface and font cache only inside [`RenderEnv::with_cx`], never across an
/// await, so strictly sequential execution can never observe a held borrow.
pub struct RenderEnv {
    surface: RefCell<Box<dyn Surface>>,
    fonts: RefCell<ResourceCache>,
    loader: AssetLoader,
    defaults: TextDefaults,
}

impl std::fmt::Debug for RenderEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderEnv")
            .field("loader", &self.loader)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

/// Synchronous drawing context handed to node render hooks.
pub(crate) struct RenderCx<'a> {
    pub(crate) surface: &'a mut dyn Surface,
    pub(crate) fonts: &'a mut ResourceCache,
    pub(crate) defaults: &'a TextDefaults,
}

impl RenderEnv {
    /// Environment drawing into `surface` with a fresh font cache.
    pub fn new(surface: Box<dyn Surface>, loader: AssetLoader, defaults: TextDefaults) -> Self {
        Self {
            surface: RefCell::new(surface),
            fonts: RefCell::new(ResourceCache::new()),
            loader,
            defaults,
        }
    }

    pub(crate) fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    pub(crate) fn with_cx<R>(&self, f: impl FnOnce(&mut RenderCx<'_>) -> R) -> R {
        let mut surface = self.surface.borrow_mut();
        let mut fonts = self.fonts.borrow_mut();
        let mut cx = RenderCx {
            surface: surface.as_mut(),
            fonts: &mut fonts,
            defaults: &self.defaults,
        };
        f(&mut cx)
    }

    pub(crate) fn into_surface(self) -> Box<dyn Surface> {
        self.surface.into_inner()
    }
}

/// Run `commands` in order once `barrier` settles.
///
/// Each action is awaited to completion before the next starts. The first failure aborts the run
/// and is returned unchanged. Returns the number of commands executed.
pub(crate) async fn execute(
    commands: CommandList,
    barrier: &CompletionBarrier,
    env: &Rc<RenderEnv>,
) -> ImprintResult<usize> {
    barrier.wait().await;
    if !barrier.is_settled() {
        return Err(ImprintError::render("completion barrier released before settling"));
    }

    let mut executed = 0usize;
    for command in commands {
        tracing::debug!("Running {} -> {}", command.seq(), command.label());
        let seq = command.seq();
        let label = command.label().to_owned();
        let action = command.into_action();
        if let Err(e) = action(Rc::clone(env)).await {
            tracing::debug!(seq, label = label.as_str(), error = %e, "command failed");
            return Err(e);
        }
        executed += 1;
    }
    Ok(executed)
}

#[cfg(test)]
#[path = "../../tests/unit/render/executor.rs"]
mod tests;
