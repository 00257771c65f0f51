use ai_bt::{Behavior, BehaviorTree, ExecutionContext, NodeKind, NodeScope, Status};
use ai_core::{TickContext, WorldMut, WorldView};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[derive(Default)]
struct World;

impl WorldView for World {
    type Agent = u64;
}

impl WorldMut for World {}

struct AlwaysSucceed;

impl Behavior<World> for AlwaysSucceed {
    fn tick(&self, _scope: &mut NodeScope<'_, World>) -> Status {
        Status::Success
    }
}

struct AlwaysRunning;

impl Behavior<World> for AlwaysRunning {
    fn tick(&self, _scope: &mut NodeScope<'_, World>) -> Status {
        Status::Running
    }
}

fn bench_bt_tick(c: &mut Criterion) {
    // Never finishes; steady-state frames resume the running tail.
    let mut tree = BehaviorTree::new("bench");
    let root = tree.add_root(NodeKind::Sequence);
    for _ in 0..32 {
        tree.add_child(root, NodeKind::behavior("Succeed", AlwaysSucceed));
    }
    tree.add_child(root, NodeKind::behavior("Run", AlwaysRunning));

    let mut ctx = ExecutionContext::new(1u64);
    let mut world = World;
    let mut tick = TickContext::new(0, 0.1);

    c.bench_function("ai-bt/execute(leaves=33)", |b| {
        b.iter(|| {
            black_box(tree.execute(&tick, &mut ctx, &mut world));
            tick = tick.next();
        })
    });

    let mut random = BehaviorTree::new("bench-random");
    let root = random.add_root(NodeKind::RandomSelector);
    for _ in 0..32 {
        random.add_child(root, NodeKind::wait(0.0));
    }

    c.bench_function("ai-bt/random_selector(children=32)", |b| {
        b.iter(|| {
            let mut ctx = ExecutionContext::seeded(1u64, 7);
            black_box(random.execute(&tick, &mut ctx, &mut world));
        })
    });
}

criterion_group!(benches, bench_bt_tick);
criterion_main!(benches);
