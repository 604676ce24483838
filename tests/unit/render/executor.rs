use std::cell::RefCell;

use futures::FutureExt;
use futures::executor::block_on;

use super::*;
use crate::compile::command::{Action, NodeId, Phase};
use crate::render::recording::RecordingSurface;

type Log = Rc<RefCell<Vec<usize>>>;

fn env() -> Rc<RenderEnv> {
    Rc::new(RenderEnv::new(
        Box::new(RecordingSurface::new(8, 8)),
        AssetLoader::new(std::env::temp_dir()),
        TextDefaults::default(),
    ))
}

fn logging(log: &Log, id: usize, fail: bool) -> Action {
    let log = Rc::clone(log);
    Box::new(move |_env: Rc<RenderEnv>| {
        async move {
            log.borrow_mut().push(id);
            if fail {
                Err(ImprintError::render(format!("action {id} failed")))
            } else {
                Ok(())
            }
        }
        .boxed_local()
    })
}

fn settled() -> CompletionBarrier {
    let barrier = CompletionBarrier::new();
    barrier.increment(1).unwrap();
    barrier.decrement().unwrap();
    barrier
}

#[test]
fn runs_commands_in_registration_order() {
    let log: Log = Rc::default();
    let mut commands = CommandList::default();
    for i in 0..4 {
        commands.push(Phase::Enter, format!("step {i}"), NodeId(i as u32), logging(&log, i, false));
    }
    let executed = block_on(execute(commands, &settled(), &env())).unwrap();
    assert_eq!(executed, 4);
    assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);
}

#[test]
fn first_failure_stops_the_run() {
    let log: Log = Rc::default();
    let mut commands = CommandList::default();
    commands.push(Phase::Enter, "ok".into(), NodeId(0), logging(&log, 0, false));
    commands.push(Phase::Enter, "boom".into(), NodeId(1), logging(&log, 1, true));
    commands.push(Phase::Exit, "never".into(), NodeId(1), logging(&log, 2, false));

    let err = block_on(execute(commands, &settled(), &env())).unwrap_err();
    assert!(matches!(err, ImprintError::Render(ref m) if m == "action 1 failed"));
    assert_eq!(*log.borrow(), vec![0, 1]);
}

#[test]
fn waits_for_the_barrier_before_running() {
    let log: Log = Rc::default();
    let mut commands = CommandList::default();
    commands.push(Phase::Enter, "gated".into(), NodeId(0), logging(&log, 0, false));

    let barrier = CompletionBarrier::new();
    barrier.increment(1).unwrap();
    let env = env();
    let mut run = execute(commands, &barrier, &env).boxed_local();
    assert!((&mut run).now_or_never().is_none());
    assert!(log.borrow().is_empty());

    barrier.decrement().unwrap();
    assert_eq!(block_on(run).unwrap(), 1);
    assert_eq!(*log.borrow(), vec![0]);
}
