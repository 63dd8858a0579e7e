use channels::{Destination, InMemoryChannelSet};
use common::Order;
use criterion::{Criterion, criterion_group, criterion_main};
use router::{Router, RoutingDecision};

const TYPES: [&str; 5] = ["chocolate", "caramel", "blueberry", "brownie", "Chocolate "];

fn bench_classify(c: &mut Criterion) {
    c.bench_function("router/classify_mixed_types", |b| {
        b.iter(|| {
            for t in TYPES {
                std::hint::black_box(RoutingDecision::for_type(std::hint::black_box(t)));
            }
        });
    });
}

fn bench_route_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("router/route_100_orders", |b| {
        b.iter(|| {
            rt.block_on(async {
                let router = Router::new(InMemoryChannelSet::with_capacity(128));
                for id in 0..100u64 {
                    let order = Order::new(id, TYPES[(id % 5) as usize], 1).unwrap();
                    router.route(order).await.unwrap();
                }
                assert_eq!(router.channels().depth(Destination::Unknown).await, 20);
            });
        });
    });
}

criterion_group!(benches, bench_classify, bench_route_100);
criterion_main!(benches);
