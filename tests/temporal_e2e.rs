use detbridge::determinations::MemoryEngine;
use detbridge::{
    AttributeData, AttributeValue, DataEntity, DeterminationsService, ResourceCatalog,
    ServiceConfig, TemporalKind, TemporalValueItem,
};
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;

const RULEBASE: &str = "Loans Bursary 17_18";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rulebase_archive() -> Vec<u8> {
    json!({
        "name": RULEBASE,
        "entities": [
            {
                "name": "global",
                "attributes": [{"name": "UKPRN", "kind": "number"}],
                "children": ["Learner"]
            },
            {
                "name": "Learner",
                "attributes": [
                    {"name": "LearnRefNumber", "kind": "text"},
                    {"name": "OnProgPayment", "kind": "temporal"},
                    {"name": "LearnDelFamStatus", "kind": "temporal"},
                    {"name": "BursaryFund", "kind": "temporal"}
                ],
                "children": []
            }
        ],
        "rules": [
            {
                "entity": "Learner",
                "attribute": "BursaryFund",
                "value": {
                    "type": "temporal",
                    "value": {
                        "change_points": [
                            {"date": "2017-08-01", "value": {"type": "number", "value": 50.0}}
                        ]
                    }
                }
            }
        ]
    })
    .to_string()
    .into_bytes()
}

fn service() -> DeterminationsService {
    let resources = ResourceCatalog::new().with_resource(RULEBASE, rulebase_archive());
    DeterminationsService::new(
        Arc::new(MemoryEngine::new()),
        Arc::new(resources),
        &ServiceConfig::new(RULEBASE, date(2017, 8, 1)),
    )
}

fn execute_with_payment(changepoints: Vec<TemporalValueItem>) -> DataEntity {
    let global = DataEntity::global().with_child(
        DataEntity::new("Learner")
            .with_attribute(AttributeData::new("LearnRefNumber", "TestLearner"))
            .with_attribute(AttributeData::temporal("OnProgPayment", changepoints)),
    );
    let determined = service().execute_session(&global).unwrap();
    let learner = determined
        .children_named("Learner")
        .next()
        .cloned()
        .unwrap();
    learner
}

#[test]
fn temporal_payments_flatten_to_monthly_samples() {
    let learner = execute_with_payment(vec![
        TemporalValueItem::new(date(2017, 8, 1), 100.0, TemporalKind::Currency),
        TemporalValueItem::new(date(2017, 9, 1), 250.0, TemporalKind::Currency),
    ]);

    let payment = learner.attribute("OnProgPayment").unwrap();
    assert!(payment.value().is_null());

    let samples = payment.changepoints();
    assert_eq!(samples.len(), 12);

    // One sample per month, walking the reporting year from August.
    assert_eq!(samples[0].effective_from(), date(2017, 8, 1));
    assert_eq!(samples[5].effective_from(), date(2018, 1, 1));
    assert_eq!(samples[11].effective_from(), date(2018, 7, 1));

    assert_eq!(samples[0].value(), &AttributeValue::Float(100.0));
    for sample in &samples[1..] {
        assert_eq!(sample.value(), &AttributeValue::Float(250.0));
    }
    assert!(samples.iter().all(|sample| sample.kind().is_none()));
}

#[test]
fn temporal_currency_parses_string_amounts() {
    let learner = execute_with_payment(vec![TemporalValueItem::new(
        date(2017, 8, 1),
        " 99.5 ",
        TemporalKind::Currency,
    )]);

    let samples = learner.attribute("OnProgPayment").unwrap().changepoints();
    assert_eq!(samples[0].value(), &AttributeValue::Float(99.5));
}

#[test]
fn temporal_empty_changepoint_opens_null_span() {
    let learner = execute_with_payment(vec![
        TemporalValueItem::new(date(2017, 8, 1), 100.0, TemporalKind::Currency),
        TemporalValueItem::new(date(2017, 10, 1), "", TemporalKind::Currency),
    ]);

    let samples = learner.attribute("OnProgPayment").unwrap().changepoints();
    assert_eq!(samples[0].value(), &AttributeValue::Float(100.0));
    assert_eq!(samples[1].value(), &AttributeValue::Float(100.0));
    for sample in &samples[2..] {
        assert_eq!(sample.value(), &AttributeValue::Null);
    }
}

#[test]
fn temporal_samples_null_before_first_changepoint() {
    let learner = execute_with_payment(vec![TemporalValueItem::new(
        date(2018, 6, 1),
        100.0,
        TemporalKind::Currency,
    )]);

    let samples = learner.attribute("OnProgPayment").unwrap().changepoints();
    for sample in &samples[..10] {
        assert_eq!(sample.value(), &AttributeValue::Null);
    }
    assert_eq!(samples[10].value(), &AttributeValue::Float(100.0));
    assert_eq!(samples[11].value(), &AttributeValue::Float(100.0));
}

#[test]
fn temporal_text_changepoints_trimmed_on_the_way_in() {
    let global = DataEntity::global().with_child(
        DataEntity::new("Learner")
            .with_attribute(AttributeData::new("LearnRefNumber", "TestLearner"))
            .with_attribute(AttributeData::temporal(
                "LearnDelFamStatus",
                vec![TemporalValueItem::new(
                    date(2017, 8, 1),
                    "  continuing  ",
                    TemporalKind::Text,
                )],
            )),
    );

    let determined = service().execute_session(&global).unwrap();
    let learner = determined.children_named("Learner").next().unwrap();
    let samples = learner.attribute("LearnDelFamStatus").unwrap().changepoints();
    assert_eq!(samples.len(), 12);
    assert_eq!(samples[0].value(), &AttributeValue::String("continuing".into()));
}

#[test]
fn temporal_changepoint_without_kind_is_rejected() {
    let global = DataEntity::global().with_child(
        DataEntity::new("Learner").with_attribute(AttributeData::temporal(
            "OnProgPayment",
            vec![TemporalValueItem::untyped(date(2017, 8, 1), 100.0)],
        )),
    );

    let err = service().execute_session(&global).unwrap_err();
    assert!(err.is_mapping());
    assert!(format!("{err}").contains("OnProgPayment"));
}

#[test]
fn temporal_unparseable_currency_is_rejected() {
    let global = DataEntity::global().with_child(
        DataEntity::new("Learner").with_attribute(AttributeData::temporal(
            "OnProgPayment",
            vec![TemporalValueItem::new(
                date(2017, 8, 1),
                "lots",
                TemporalKind::Currency,
            )],
        )),
    );

    let err = service().execute_session(&global).unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn temporal_rule_conclusions_sampled_on_read() {
    // BursaryFund is never supplied; the rule-base concludes it.
    let learner = execute_with_payment(vec![TemporalValueItem::new(
        date(2017, 8, 1),
        100.0,
        TemporalKind::Currency,
    )]);

    let samples = learner.attribute("BursaryFund").unwrap().changepoints();
    assert_eq!(samples.len(), 12);
    for sample in samples {
        assert_eq!(sample.value(), &AttributeValue::Float(50.0));
    }
}
