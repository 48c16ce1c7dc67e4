use std::sync::Arc;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use chrono::NaiveDate;
use detbridge::determinations::{DeterminationsEngine, MemoryEngine};
use detbridge::{
    AttributeData, DataEntity, DeterminationsService, ResourceCatalog, ServiceConfig,
    SessionBuilder, TemporalKind, TemporalValueItem,
};
use serde_json::json;

const RULEBASE: &str = "Loans Bursary 17_18";

fn year_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2017, 8, 1).unwrap()
}

fn rulebase_archive() -> Vec<u8> {
    json!({
        "name": RULEBASE,
        "entities": [
            {
                "name": "global",
                "attributes": [
                    {"name": "UKPRN", "kind": "number"},
                    {"name": "LARSVersion", "kind": "text"}
                ],
                "children": ["Learner"]
            },
            {
                "name": "Learner",
                "attributes": [
                    {"name": "LearnRefNumber", "kind": "text"},
                    {"name": "OnProgPayment", "kind": "temporal"},
                    {"name": "AreaCostFactor", "kind": "number"}
                ],
                "children": []
            }
        ],
        "rules": [
            {"entity": "Learner", "attribute": "AreaCostFactor", "value": {"type": "number", "value": 1.2}}
        ]
    })
    .to_string()
    .into_bytes()
}

fn learner_tree(learners: usize) -> DataEntity {
    let mut global =
        DataEntity::global().with_attribute(AttributeData::new("UKPRN", 12_345_678i64));
    for i in 0..learners {
        global.add_child(
            DataEntity::new("Learner")
                .with_attribute(AttributeData::new("LearnRefNumber", format!("L{i:04}")))
                .with_attribute(AttributeData::temporal(
                    "OnProgPayment",
                    vec![
                        TemporalValueItem::new(
                            NaiveDate::from_ymd_opt(2017, 8, 1).unwrap(),
                            100.0,
                            TemporalKind::Currency,
                        ),
                        TemporalValueItem::new(
                            NaiveDate::from_ymd_opt(2017, 9, 1).unwrap(),
                            250.0,
                            TemporalKind::Currency,
                        ),
                    ],
                )),
        );
    }
    global
}

fn bench_compile_rulebase(c: &mut Criterion) {
    c.bench_function("mapping/compile_rulebase", |b| {
        b.iter_custom(|iters| {
            let engine = MemoryEngine::new();
            let bytes = rulebase_archive();

            let start = Instant::now();
            for _ in 0..iters {
                let _ = engine.compile_rulebase(&bytes).unwrap();
            }
            start.elapsed()
        });
    });
}

fn bench_map_in_single(c: &mut Criterion) {
    c.bench_function("mapping/map_in_1_learner", |b| {
        b.iter_custom(|iters| {
            let builder = SessionBuilder::new(Arc::new(MemoryEngine::new()));
            let bytes = rulebase_archive();
            let global = learner_tree(1);
            // Warm the compile cache so samples time mapping alone.
            builder
                .create_session(&mut bytes.as_slice(), &global)
                .unwrap();

            let start = Instant::now();
            for _ in 0..iters {
                let _ = builder
                    .create_session(&mut bytes.as_slice(), &global)
                    .unwrap();
            }
            start.elapsed()
        });
    });
}

fn bench_map_in_cohort(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_in_throughput");
    group.throughput(Throughput::Elements(100));

    group.bench_function("100_learners", |b| {
        b.iter_custom(|iters| {
            let builder = SessionBuilder::new(Arc::new(MemoryEngine::new()));
            let bytes = rulebase_archive();
            let global = learner_tree(100);
            builder
                .create_session(&mut bytes.as_slice(), &global)
                .unwrap();

            let start = Instant::now();
            for _ in 0..iters {
                let _ = builder
                    .create_session(&mut bytes.as_slice(), &global)
                    .unwrap();
            }
            start.elapsed()
        });
    });
    group.finish();
}

fn bench_execute_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute_throughput");
    group.throughput(Throughput::Elements(100));

    group.bench_function("execute_100_learners", |b| {
        b.iter_custom(|iters| {
            let resources = ResourceCatalog::new().with_resource(RULEBASE, rulebase_archive());
            let service = DeterminationsService::new(
                Arc::new(MemoryEngine::new()),
                Arc::new(resources),
                &ServiceConfig::new(RULEBASE, year_start()),
            );
            let global = learner_tree(100);
            // First execution compiles; keep it out of the timing.
            service.execute_session(&global).unwrap();

            let start = Instant::now();
            for _ in 0..iters {
                let _ = service.execute_session(&global).unwrap();
            }
            start.elapsed()
        });
    });
    group.finish();
}

criterion_group!(
    mapping,
    bench_compile_rulebase,
    bench_map_in_single,
    bench_map_in_cohort,
    bench_execute_session
);
criterion_main!(mapping);
