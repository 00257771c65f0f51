use std::collections::BTreeMap;

use ai_bt::{
    Behavior, BehaviorTree, ExecutionContext, ExecutionContexts, NodeIndex, NodeKind, NodeScope,
    Status, TRACE_RESET, TRACE_STATUS,
};
use ai_core::{TickContext, WorldMut, WorldView};
use ai_tools::{TraceLog, TRACE_LOG};

#[derive(Debug, Default)]
struct RecordingWorld {
    log: Vec<String>,
    results: BTreeMap<&'static str, Status>,
}

impl RecordingWorld {
    fn count(&self, entry: &str) -> usize {
        self.log.iter().filter(|e| *e == entry).count()
    }
}

impl WorldView for RecordingWorld {
    type Agent = u64;
}

impl WorldMut for RecordingWorld {}

/// Logs every callback and returns whatever the world says (default `Success`).
struct Probe(&'static str);

impl Behavior<RecordingWorld> for Probe {
    fn spawn(&self, scope: &mut NodeScope<'_, RecordingWorld>) {
        scope.world.log.push(format!("spawn:{}", self.0));
    }

    fn tick(&self, scope: &mut NodeScope<'_, RecordingWorld>) -> Status {
        scope.world.log.push(format!("tick:{}", self.0));
        scope
            .world
            .results
            .get(self.0)
            .copied()
            .unwrap_or(Status::Success)
    }

    fn terminate(&self, scope: &mut NodeScope<'_, RecordingWorld>, _status: Status) {
        scope.world.log.push(format!("terminate:{}", self.0));
    }
}

fn probe(name: &'static str) -> NodeKind<RecordingWorld> {
    NodeKind::behavior("Probe", Probe(name))
}

fn sequence_of(names: &[&'static str]) -> BehaviorTree<RecordingWorld> {
    let mut tree = BehaviorTree::new("test");
    let root = tree.add_root(NodeKind::Sequence);
    for name in names {
        tree.add_child(root, probe(name));
    }
    tree
}

#[test]
fn sequence_of_waits_runs_for_two_seconds() {
    let mut tree = BehaviorTree::new("waits");
    let root = tree.add_root(NodeKind::Sequence);
    tree.add_child(root, NodeKind::wait(1.0));
    let second = tree.add_child(root, NodeKind::wait(1.0));

    let mut ctx = ExecutionContext::new(1u64);
    let mut world = RecordingWorld::default();
    let mut tick = TickContext::new(0, 0.5);

    let mut results = Vec::new();
    for _ in 0..5 {
        results.push(tree.execute(&tick, &mut ctx, &mut world));
        tick = tick.next();
    }

    assert_eq!(
        results,
        vec![
            Some(Status::Running),
            Some(Status::Running),
            Some(Status::Running),
            Some(Status::Running),
            Some(Status::Success),
        ]
    );
    // Second wait spawned on the frame the first one completed.
    assert_eq!(ctx.memory(second).unwrap().started_at, 1.0);
    assert!(ctx.is_finished());
    assert_eq!(tree.execute(&tick, &mut ctx, &mut world), None);
}

#[test]
fn running_child_is_resumed_without_respawn() {
    let tree = sequence_of(&["a", "b"]);
    let mut ctx = ExecutionContext::new(1u64);
    let mut world = RecordingWorld::default();
    world.results.insert("b", Status::Running);
    let mut tick = TickContext::new(0, 0.1);

    for _ in 0..3 {
        assert_eq!(
            tree.execute(&tick, &mut ctx, &mut world),
            Some(Status::Running)
        );
        tick = tick.next();
    }

    assert_eq!(world.count("tick:a"), 1);
    assert_eq!(world.count("spawn:b"), 1);
    assert_eq!(world.count("tick:b"), 3);
    assert_eq!(world.count("terminate:b"), 0);
    assert_eq!(ctx.last_running(), Some(NodeIndex(0)));
    assert_eq!(ctx.status(NodeIndex(2)), Status::Running);

    world.results.insert("b", Status::Success);
    assert_eq!(
        tree.execute(&tick, &mut ctx, &mut world),
        Some(Status::Success)
    );
    assert_eq!(world.count("spawn:b"), 1);
    assert_eq!(world.count("terminate:b"), 1);
}

#[test]
fn selector_stops_at_first_success() {
    let mut tree = BehaviorTree::new("selector");
    let root = tree.add_root(NodeKind::Selector);
    let a = tree.add_child(root, probe("a"));
    let b = tree.add_child(root, probe("b"));
    let c = tree.add_child(root, probe("c"));

    let mut ctx = ExecutionContext::new(1u64);
    let mut world = RecordingWorld::default();
    world.results.insert("a", Status::Failure);

    let status = tree.execute(&TickContext::new(0, 0.1), &mut ctx, &mut world);

    assert_eq!(status, Some(Status::Success));
    assert_eq!(
        world.log,
        vec![
            "spawn:a",
            "tick:a",
            "terminate:a",
            "spawn:b",
            "tick:b",
            "terminate:b"
        ]
    );
    assert_eq!(ctx.status(a), Status::Failure);
    assert_eq!(ctx.status(b), Status::Success);
    assert_eq!(ctx.status(c), Status::Invalid);
}

#[test]
fn selector_fails_when_every_child_fails() {
    let mut tree = BehaviorTree::new("selector");
    let root = tree.add_root(NodeKind::Selector);
    tree.add_child(root, probe("a"));
    tree.add_child(root, probe("b"));

    let mut ctx = ExecutionContext::new(1u64);
    let mut world = RecordingWorld::default();
    world.results.insert("a", Status::Failure);
    world.results.insert("b", Status::Failure);

    assert_eq!(
        tree.execute(&TickContext::new(0, 0.1), &mut ctx, &mut world),
        Some(Status::Failure)
    );
}

#[test]
fn sequence_stops_at_first_failure() {
    let tree = sequence_of(&["a", "b"]);
    let mut ctx = ExecutionContext::new(1u64);
    let mut world = RecordingWorld::default();
    world.results.insert("a", Status::Failure);

    assert_eq!(
        tree.execute(&TickContext::new(0, 0.1), &mut ctx, &mut world),
        Some(Status::Failure)
    );
    assert_eq!(world.count("tick:b"), 0);
}

#[test]
fn breakpoint_pauses_then_resumes_at_the_same_node() {
    let mut tree = sequence_of(&["a", "b", "c"]);
    let b = NodeIndex(2);
    tree.set_breakpoint(b, true);

    let mut ctx = ExecutionContext::new(1u64);
    let mut world = RecordingWorld::default();
    let tick = TickContext::new(0, 0.1);

    assert_eq!(
        tree.execute(&tick, &mut ctx, &mut world),
        Some(Status::Breaking)
    );
    assert_eq!(ctx.breaking(), Some(b));
    assert_eq!(ctx.status(b), Status::Invalid);
    assert_eq!(ctx.status(NodeIndex(0)), Status::Breaking);
    assert_eq!(world.log, vec!["spawn:a", "tick:a", "terminate:a"]);
    assert!(!ctx.is_finished());

    world.log.clear();
    assert_eq!(
        tree.execute(&tick.next(), &mut ctx, &mut world),
        Some(Status::Success)
    );
    assert_eq!(ctx.breaking(), None);
    // Nodes above and before the breakpoint are refreshed without spawn/terminate.
    assert_eq!(
        world.log,
        vec![
            "tick:a",
            "spawn:b",
            "tick:b",
            "terminate:b",
            "spawn:c",
            "tick:c",
            "terminate:c"
        ]
    );
}

#[test]
fn composite_keeps_prior_status_when_a_child_breaks() {
    let mut tree = sequence_of(&["a", "b"]);
    tree.set_breakpoint(NodeIndex(2), true);

    let mut ctx = ExecutionContext::new(1u64);
    let mut world = RecordingWorld::default();
    world.results.insert("a", Status::Running);
    let tick = TickContext::new(0, 0.1);

    assert_eq!(
        tree.execute(&tick, &mut ctx, &mut world),
        Some(Status::Running)
    );

    world.results.insert("a", Status::Success);
    assert_eq!(
        tree.execute(&tick.next(), &mut ctx, &mut world),
        Some(Status::Running)
    );
    assert_eq!(ctx.breaking(), Some(NodeIndex(2)));
}

#[test]
fn external_breaking_node_resumes_on_next_execute() {
    let tree = sequence_of(&["a", "b"]);
    let mut ctx = ExecutionContext::new(1u64);
    let mut world = RecordingWorld::default();

    ctx.set_breaking(Some(NodeIndex(2)));
    assert_eq!(
        tree.execute(&TickContext::new(0, 0.1), &mut ctx, &mut world),
        Some(Status::Success)
    );
    assert_eq!(ctx.breaking(), None);
    assert_eq!(world.count("spawn:a"), 0);
    assert_eq!(world.count("spawn:b"), 1);
}

#[test]
fn resume_continues_from_the_requested_node() {
    let tree = sequence_of(&["a", "b"]);
    let mut ctx = ExecutionContext::new(1u64);
    let mut world = RecordingWorld::default();

    tree.resume(&mut ctx, NodeIndex(1));
    assert_eq!(ctx.breaking(), Some(NodeIndex(1)));
    assert_eq!(
        tree.execute(&TickContext::new(0, 0.1), &mut ctx, &mut world),
        Some(Status::Success)
    );
    assert_eq!(world.count("spawn:a"), 1);
    assert_eq!(world.count("spawn:b"), 1);
}

#[test]
#[should_panic(expected = "has no node")]
fn resume_rejects_unknown_nodes() {
    let tree = sequence_of(&["a"]);
    tree.resume(&mut ExecutionContext::new(1u64), NodeIndex(9));
}

#[test]
fn startup_is_a_no_op_until_the_run_finishes() {
    let tree = sequence_of(&["a"]);
    let mut ctx = ExecutionContext::new(1u64);
    let mut world = RecordingWorld::default();
    world.results.insert("a", Status::Running);
    let tick = TickContext::new(0, 0.1);

    tree.execute(&tick, &mut ctx, &mut world);
    tree.startup(&mut ctx);
    assert_eq!(ctx.status(NodeIndex(1)), Status::Running);

    world.results.insert("a", Status::Success);
    assert_eq!(
        tree.execute(&tick, &mut ctx, &mut world),
        Some(Status::Success)
    );
    assert_eq!(tree.execute(&tick, &mut ctx, &mut world), None);

    tree.startup(&mut ctx);
    assert!(!ctx.is_finished());
    assert!(ctx.statuses().iter().all(|s| *s == Status::Invalid));
    assert_eq!(
        tree.execute(&tick, &mut ctx, &mut world),
        Some(Status::Success)
    );
    assert_eq!(world.count("spawn:a"), 2);
}

#[test]
fn abort_resets_and_finishes_the_run() {
    let tree = sequence_of(&["a"]);
    let mut ctx = ExecutionContext::new(1u64);
    let mut world = RecordingWorld::default();
    world.results.insert("a", Status::Running);
    let tick = TickContext::new(0, 0.1);

    tree.execute(&tick, &mut ctx, &mut world);
    tree.abort(&mut ctx);

    assert!(ctx.is_finished());
    assert_eq!(ctx.last_running(), None);
    assert!(ctx.statuses().iter().all(|s| *s == Status::Invalid));
    assert_eq!(tree.execute(&tick, &mut ctx, &mut world), None);

    tree.startup(&mut ctx);
    assert_eq!(
        tree.execute(&tick, &mut ctx, &mut world),
        Some(Status::Running)
    );
    assert_eq!(world.count("spawn:a"), 2);
}

#[test]
fn status_writes_are_traced_through_the_blackboard() {
    let mut tree = BehaviorTree::new("trace");
    let root = tree.add_root(NodeKind::Sequence);
    tree.add_child(root, NodeKind::wait(0.0));

    let mut ctx = ExecutionContext::new(7u64);
    ctx.blackboard.set(TRACE_LOG, TraceLog::default());
    let mut world = RecordingWorld::default();

    tree.execute(&TickContext::new(0, 0.1), &mut ctx, &mut world);
    tree.startup(&mut ctx);

    let log = ctx.blackboard.get(TRACE_LOG).unwrap();
    let writes: Vec<(u64, u64)> = log.with_tag(TRACE_STATUS).map(|e| (e.a, e.b)).collect();
    assert_eq!(writes, vec![(1, 1), (0, 1)]);
    assert!(log.with_tag(TRACE_STATUS).all(|e| e.agent == 7));
    assert_eq!(log.with_tag(TRACE_RESET).count(), 1);
}

#[test]
fn random_sequence_visits_every_child_once_in_a_seeded_order() {
    fn run(seed: u64) -> Vec<String> {
        let mut tree = BehaviorTree::new("random");
        let root = tree.add_root(NodeKind::RandomSequence);
        for name in ["a", "b", "c", "d", "e"] {
            tree.add_child(root, probe(name));
        }
        let mut ctx = ExecutionContext::seeded(3u64, seed);
        let mut world = RecordingWorld::default();
        assert_eq!(
            tree.execute(&TickContext::new(seed, 0.1), &mut ctx, &mut world),
            Some(Status::Success)
        );
        world
            .log
            .into_iter()
            .filter(|e| e.starts_with("tick:"))
            .collect()
    }

    let first = run(99);
    assert_eq!(first, run(99));

    let mut sorted = first.clone();
    sorted.sort();
    assert_eq!(sorted, vec!["tick:a", "tick:b", "tick:c", "tick:d", "tick:e"]);
}

#[test]
fn random_selector_keeps_its_order_while_a_child_runs() {
    let mut tree = BehaviorTree::new("random");
    let root = tree.add_root(NodeKind::RandomSelector);
    for name in ["a", "b", "c"] {
        tree.add_child(root, probe(name));
    }

    let mut ctx = ExecutionContext::seeded(1u64, 5);
    let mut world = RecordingWorld::default();
    for name in ["a", "b", "c"] {
        world.results.insert(name, Status::Running);
    }
    let tick = TickContext::new(5, 0.1);

    let running_child = |ctx: &ExecutionContext<u64>| {
        (1..4)
            .map(NodeIndex)
            .find(|&i| ctx.status(i) == Status::Running)
            .unwrap()
    };

    tree.execute(&tick, &mut ctx, &mut world);
    let running = running_child(&ctx);
    tree.execute(&tick.next(), &mut ctx, &mut world);

    assert_eq!(running_child(&ctx), running);
    assert_eq!(world.log.iter().filter(|e| e.starts_with("spawn:")).count(), 1);
    assert_eq!(world.log.iter().filter(|e| e.starts_with("tick:")).count(), 2);
}

#[test]
fn placeholder_nodes_are_inert() {
    let mut tree = BehaviorTree::new("placeholder");
    let root = tree.add_root(NodeKind::Sequence);
    tree.add_child(root, NodeKind::placeholder("Unknown", Default::default()));

    let mut ctx = ExecutionContext::new(1u64);
    assert_eq!(
        tree.execute(&TickContext::new(0, 0.1), &mut ctx, &mut RecordingWorld::default()),
        Some(Status::Success)
    );
}

#[test]
fn contexts_are_independent_per_character() {
    let mut tree = BehaviorTree::new("shared");
    let root = tree.add_root(NodeKind::Sequence);
    tree.add_child(root, NodeKind::wait(1.0));

    let mut contexts = ExecutionContexts::new(0);
    let mut world = RecordingWorld::default();
    let tick = TickContext::new(0, 0.5);

    tree.execute(&tick, contexts.get_or_create(1), &mut world);
    tree.execute(&tick, contexts.get_or_create(2), &mut world);
    tree.abort(contexts.get_or_create(1));

    assert_eq!(contexts.len(), 2);
    assert!(contexts.get(1).unwrap().is_finished());
    assert_eq!(
        tree.execute(&tick.next(), contexts.get_or_create(2), &mut world),
        Some(Status::Running)
    );
    assert_eq!(contexts.get(2).unwrap().status(NodeIndex(1)), Status::Running);
}

#[test]
#[should_panic(expected = "empty behavior tree")]
fn executing_an_empty_tree_panics() {
    let tree: BehaviorTree<RecordingWorld> = BehaviorTree::new("empty");
    let mut ctx = ExecutionContext::new(1u64);
    tree.execute(&TickContext::new(0, 0.1), &mut ctx, &mut RecordingWorld::default());
}

#[test]
#[should_panic(expected = "cannot have children")]
fn wait_cannot_own_children() {
    let mut tree: BehaviorTree<RecordingWorld> = BehaviorTree::new("bad");
    let root = tree.add_root(NodeKind::Sequence);
    let wait = tree.add_child(root, NodeKind::wait(1.0));
    tree.add_child(wait, NodeKind::Sequence);
}
