use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::assets::loader::AssetLoader;
use crate::compile::barrier::CompletionBarrier;
use crate::compile::command::{Action, CommandList, NodeId, Phase};
use crate::foundation::core::Frame;
use crate::foundation::error::ImprintResult;
use crate::layout::ParentFrame;
use crate::render::executor::{RenderCx, RenderEnv};
use crate::scene::model::{Element, Scene};
use crate::scene::nodes::{
    ClipRectNode, ContainerNode, GradientNode, LoadFontNode, ParagraphNode, PictureNode, TextNode,
};

/// Behaviour of one element kind under the enter/exit protocol.
///
/// `render` runs in the node's enter command after `load` (if any) resolved; `after_render` runs
/// in its exit command, after every descendant's commands. Both see the same `State`.
pub(crate) trait RenderNode: 'static {
    /// Label prefix: commands are named `"<NAME> Render"` and `"<NAME> AfterRender"`.
    const NAME: &'static str;

    /// Scratch state shared by the node's enter and exit actions.
    type State: Default + 'static;

    /// Result of the asynchronous loader.
    type Data: 'static;

    /// Reject malformed declarations before any command is registered.
    fn validate(&self) -> ImprintResult<()> {
        Ok(())
    }

    /// Loader awaited at the start of the enter action.
    fn load(&self, _loader: &AssetLoader) -> Option<LocalBoxFuture<'static, ImprintResult<Self::Data>>> {
        None
    }

    /// The node's own absolute frame.
    fn frame(&self, parent: Frame) -> Frame {
        parent
    }

    fn render(
        &self,
        cx: &mut RenderCx<'_>,
        frame: Frame,
        state: &mut Self::State,
        data: Option<Self::Data>,
    ) -> ImprintResult<()>;

    fn after_render(&self, _cx: &mut RenderCx<'_>, _frame: Frame, _state: &mut Self::State) -> ImprintResult<()> {
        Ok(())
    }

    /// Frame published to children. Only read once the enter action has run.
    fn child_frame(&self, own: Frame, _state: &Self::State) -> Frame {
        own
    }
}

/// Proof that a node's enter command was appended; consumed by [`Compiler::exit`].
#[must_use]
#[derive(Debug)]
pub(crate) struct Registration {
    node: NodeId,
    name: &'static str,
}

/// Output of compilation: the ordered commands and the barrier gating their execution.
#[derive(Debug)]
pub struct Compiled {
    commands: CommandList,
    barrier: CompletionBarrier,
}

impl Compiled {
    /// Commands in execution order.
    pub fn commands(&self) -> &CommandList {
        &self.commands
    }

    /// Barrier that settled when the walk finished.
    pub fn barrier(&self) -> &CompletionBarrier {
        &self.barrier
    }

    pub(crate) fn into_parts(self) -> (CommandList, CompletionBarrier) {
        (self.commands, self.barrier)
    }
}

/// Builds the command list for a declaration tree.
#[derive(Debug, Default)]
pub struct Compiler {
    commands: CommandList,
    barrier: CompletionBarrier,
    registered: HashSet<NodeId>,
    next_node: u32,
}

impl Compiler {
    /// Empty compiler with an unsettled barrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `scene` depth-first.
    ///
    /// The walk holds one barrier registration of its own, so the barrier settles exactly when
    /// the last top-level element has been acknowledged.
    #[tracing::instrument(skip_all, fields(width = scene.width, height = scene.height))]
    pub fn compile(scene: &Scene) -> ImprintResult<Compiled> {
        let mut compiler = Self::new();
        let root = ParentFrame::fixed(Frame::root(scene.width, scene.height));
        compiler.barrier.increment(1)?;
        for child in &scene.children {
            compiler.walk(child, &root)?;
        }
        compiler.barrier.decrement()?;
        tracing::debug!(commands = compiler.commands.len(), "compiled scene");
        Ok(compiler.finish())
    }

    /// Stop compiling and hand over the commands and barrier.
    pub fn finish(self) -> Compiled {
        Compiled {
            commands: self.commands,
            barrier: self.barrier,
        }
    }

    /// Commands appended so far.
    pub fn commands(&self) -> &CommandList {
        &self.commands
    }

    /// The barrier the compiler maintains.
    pub fn barrier(&self) -> &CompletionBarrier {
        &self.barrier
    }

    /// Append `node`'s enter command.
    ///
    /// Returns `None` when `node` already registered, so a caller that re-invokes registration
    /// for an id it already holds gets no second command pair. [`Compiler::compile`] mints a fresh
    /// id per declared element, so equal sibling declarations still register separately.
    pub(crate) fn enter(
        &mut self,
        node: NodeId,
        name: &'static str,
        action: Action,
    ) -> ImprintResult<Option<Registration>> {
        if !self.registered.insert(node) {
            tracing::debug!(node = node.0, name, "node already registered");
            return Ok(None);
        }
        self.barrier.increment(1)?;
        self.commands
            .push(Phase::Enter, format!("{name} Render"), node, action);
        Ok(Some(Registration { node, name }))
    }

    /// Append the exit command for `registration` and acknowledge it on the barrier.
    pub(crate) fn exit(&mut self, registration: Registration, action: Action) -> ImprintResult<()> {
        let Registration { node, name } = registration;
        self.commands
            .push(Phase::Exit, format!("{name} AfterRender"), node, action);
        self.barrier.decrement()
    }

    fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    fn walk(&mut self, element: &Element, parent: &ParentFrame) -> ImprintResult<()> {
        let children = element.children();
        match element {
            Element::LinearGradient(e) => self.register(GradientNode::from(e), parent, children),
            Element::Container(e) => self.register(ContainerNode::from(e), parent, children),
            Element::ClipRect(e) => self.register(ClipRectNode::from(e), parent, children),
            Element::Picture(e) => self.register(PictureNode::from(e), parent, children),
            Element::Text(e) => self.register(TextNode::from(e), parent, children),
            Element::Paragraph(e) => self.register(ParagraphNode::from(e), parent, children),
            Element::LoadFont(e) => self.register(LoadFontNode::from(e), parent, children),
        }
    }

    /// Run the enter/exit protocol for `node`, walking `children` in between.
    ///
    /// Every call mints a new [`NodeId`].
    pub(crate) fn register<N: RenderNode>(
        &mut self,
        node: N,
        parent: &ParentFrame,
        children: &[Element],
    ) -> ImprintResult<()> {
        node.validate()?;
        let id = self.next_node_id();
        let node = Rc::new(node);
        let state = Rc::new(RefCell::new(N::State::default()));

        let Some(registration) = self.enter(id, N::NAME, enter_action(&node, &state, parent))?
        else {
            return Ok(());
        };

        if !children.is_empty() {
            let published = {
                let node = Rc::clone(&node);
                let state = Rc::clone(&state);
                let parent = parent.clone();
                ParentFrame::deferred(move || {
                    let own = node.frame(parent.get());
                    node.child_frame(own, &state.borrow())
                })
            };
            for child in children {
                self.walk(child, &published)?;
            }
        }

        self.exit(registration, exit_action(&node, &state, parent))
    }
}

fn enter_action<N: RenderNode>(
    node: &Rc<N>,
    state: &Rc<RefCell<N::State>>,
    parent: &ParentFrame,
) -> Action {
    let node = Rc::clone(node);
    let state = Rc::clone(state);
    let parent = parent.clone();
    Box::new(move |env: Rc<RenderEnv>| {
        async move {
            let data = match node.load(env.loader()) {
                Some(pending) => Some(pending.await?),
                None => None,
            };
            let frame = node.frame(parent.get());
            env.with_cx(|cx| node.render(cx, frame, &mut state.borrow_mut(), data))
        }
        .boxed_local()
    })
}

fn exit_action<N: RenderNode>(
    node: &Rc<N>,
    state: &Rc<RefCell<N::State>>,
    parent: &ParentFrame,
) -> Action {
    let node = Rc::clone(node);
    let state = Rc::clone(state);
    let parent = parent.clone();
    Box::new(move |env: Rc<RenderEnv>| {
        async move {
            let frame = node.frame(parent.get());
            env.with_cx(|cx| node.after_render(cx, frame, &mut state.borrow_mut()))
        }
        .boxed_local()
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compiler.rs"]
mod tests;
