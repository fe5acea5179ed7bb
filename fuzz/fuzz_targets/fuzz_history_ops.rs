#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rewind::{Controller, HistoryConfig, Subject};

#[derive(Debug, Arbitrary)]
enum Op {
    Push(u8),
    Pop,
    Checkpoint,
    Undo,
    Redo,
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    max_depth: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let max_depth = usize::from(input.max_depth.max(1));
    let mut ctl = Controller::new(Subject::new(Vec::<u8>::new()), HistoryConfig::new(max_depth));

    for op in input.ops {
        let before = ctl.originator().state().clone();
        let (undo_before, redo_before) = (ctl.history().undo_depth(), ctl.history().redo_depth());

        match op {
            Op::Push(b) => ctl.apply(|s| s.state_mut().push(b)),
            Op::Pop => {
                ctl.apply(|s| s.state_mut().pop());
            }
            Op::Checkpoint => ctl.checkpoint(),
            Op::Undo | Op::Redo => {
                let undo = matches!(op, Op::Undo);
                let result = if undo { ctl.undo() } else { ctl.redo() };
                match result {
                    Ok(state) => {
                        assert_eq!(state, ctl.history_state());
                        // Redo right after undo (and vice versa) must land on `before`.
                        let back = if undo { ctl.redo() } else { ctl.undo() };
                        assert!(back.is_ok());
                        assert_eq!(ctl.originator().state(), &before);
                        assert_eq!(ctl.history().undo_depth(), undo_before);
                        assert_eq!(ctl.history().redo_depth(), redo_before);
                    }
                    Err(err) => {
                        assert!(err.is_no_history());
                        assert_eq!(ctl.originator().state(), &before);
                        assert_eq!(ctl.history().undo_depth(), undo_before);
                        assert_eq!(ctl.history().redo_depth(), redo_before);
                    }
                }
            }
            Op::Clear => ctl.clear_history(),
        }

        // Post-conditions that must always hold:
        assert!(ctl.history().undo_depth() <= max_depth, "depth limit exceeded");
        assert_eq!(ctl.can_undo(), ctl.history().undo_depth() > 0);
        assert_eq!(ctl.can_redo(), ctl.history().redo_depth() > 0);
    }
});
