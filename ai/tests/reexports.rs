#![cfg(feature = "full")]

use ai::anim::{AnimationClip, AnimationStateMachine, AnimatorConfig, ClipLibrary, VecEventSink};
use ai::bt::{BehaviorTree, ExecutionContext, NodeKind, Status};
use ai::core::{CharacterId, TickContext};

#[test]
fn umbrella_exposes_both_runtimes() {
    let mut tree: BehaviorTree<()> = BehaviorTree::new("idle");
    tree.add_root(NodeKind::wait(0.0));
    let mut ctx = ExecutionContext::new(1u64);
    let tick = TickContext::new(0, 0.1);
    assert_eq!(tree.execute(&tick, &mut ctx, &mut ()), Some(Status::Success));

    let library = ClipLibrary::from_clips([AnimationClip::new("idle", 1.0).looping(true)]).unwrap();
    let mut machine = AnimationStateMachine::new(CharacterId(1), &AnimatorConfig::base_only());
    machine.load_states(&library, ["idle"]).unwrap();
    let mut sink = VecEventSink::default();
    machine.set_initial_state(0, "idle", &mut sink);
    machine.update(1.5, &mut sink);
    assert_eq!(machine.loop_count(0), 1);
}
