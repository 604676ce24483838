use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::foundation::error::ImprintResult;
use crate::render::executor::RenderEnv;

/// Deferred surface work attached to a command.
pub(crate) type Action = Box<dyn FnOnce(Rc<RenderEnv>) -> LocalBoxFuture<'static, ImprintResult<()>>>;

/// Pre-order index of a node in the declared tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Which half of a node's lifecycle a command belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Render step, appended before the node's children.
    Enter,
    /// Cleanup step, appended after the node's children.
    Exit,
}

/// One compiled entry: a labelled, not yet executed action.
pub struct Command {
    seq: usize,
    phase: Phase,
    label: String,
    node: NodeId,
    action: Action,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("seq", &self.seq)
            .field("phase", &self.phase)
            .field("label", &self.label)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Position in the list.
    pub fn seq(&self) -> usize {
        self.seq
    }

    /// Enter or exit.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `"<Name> Render"` or `"<Name> AfterRender"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Node that registered the command.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub(crate) fn into_action(self) -> Action {
        self.action
    }
}

/// Append-only command sequence built during compilation.
#[derive(Debug, Default)]
pub struct CommandList {
    commands: Vec<Command>,
}

impl CommandList {
    pub(crate) fn push(&mut self, phase: Phase, label: String, node: NodeId, action: Action) -> usize {
        let seq = self.commands.len();
        self.commands.push(Command {
            seq,
            phase,
            label,
            node,
            action,
        });
        seq
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// `true` when nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Labels in execution order.
    pub fn labels(&self) -> Vec<&str> {
        self.commands.iter().map(Command::label).collect()
    }

    /// The list reduced to its bracket structure.
    pub fn brackets(&self) -> Vec<(Phase, NodeId)> {
        self.commands.iter().map(|c| (c.phase, c.node)).collect()
    }
}

impl IntoIterator for CommandList {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

/// Whether `brackets` is balanced and every exit closes the most recent open enter.
pub fn is_well_nested(brackets: &[(Phase, NodeId)]) -> bool {
    let mut open = Vec::new();
    for &(phase, node) in brackets {
        match phase {
            Phase::Enter => open.push(node),
            Phase::Exit => {
                if open.pop() != Some(node) {
                    return false;
                }
            }
        }
    }
    open.is_empty()
}

#[cfg(test)]
#[path = "../../tests/unit/compile/command.rs"]
mod tests;
