//! Property-based tests for perception encoding, world state shape, and decisions.
//!
//! Run with: cargo test --test perception_properties

use glam::Vec3;
use proptest::prelude::*;

use robot_brain::actions::Decision;
use robot_brain::core::error::BrainError;
use robot_brain::perception::{encode_batch, encode_one, Percept, PerceptValue, RawReading, STATUS_OK};
use robot_brain::rules::{parse_fact, render_percepts, Clause, ClauseBase, Condition, Expected};
use robot_brain::simulation::RuleEvaluator;
use robot_brain::world::{SensorGroup, WorldState};

// =============================================================================
// Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = Vec3> {
    prop::array::uniform3(-5.0..5.0f32).prop_map(Vec3::from_array)
}

fn arb_reading(status: impl Strategy<Value = i32>) -> impl Strategy<Value = RawReading> {
    (status, any::<bool>(), arb_point(), any::<i32>(), arb_point())
        .prop_map(|(status, detected, point, handle, normal)| {
            RawReading::new(status, detected, point, handle, normal)
        })
}

fn arb_value() -> impl Strategy<Value = PerceptValue> {
    prop_oneof![
        Just(PerceptValue::Detected),
        Just(PerceptValue::Clear),
        Just(PerceptValue::Unknown),
    ]
}

fn arb_decision() -> impl Strategy<Value = Decision> {
    prop::sample::select(Decision::ALL.to_vec())
}

/// Distinct sensor ids, 1 to 12 of them
fn arb_sensor_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("S[0-9]{1,3}", 1..12).prop_map(|ids| ids.into_iter().collect())
}

fn group_of(ids: &[String]) -> SensorGroup {
    SensorGroup::new("north", ids.iter().cloned()).unwrap()
}

fn percepts_for(ids: &[String], values: &[PerceptValue]) -> Vec<Percept> {
    ids.iter()
        .zip(values.iter().cycle())
        .map(|(id, value)| Percept::new(id.as_str(), *value))
        .collect()
}

fn clause(decision: String, conditions: Vec<Condition>) -> Clause {
    Clause {
        head: "takeDecision".into(),
        body: "perceptionNorth".into(),
        decision,
        conditions,
        description: String::new(),
    }
}

// =============================================================================
// Encoding
// =============================================================================

proptest! {
    #[test]
    fn failed_status_is_always_unknown(
        raw in arb_reading((1..1000i32).prop_union(-1000..0i32)),
    ) {
        let percept = encode_one("S1", &raw).unwrap();
        prop_assert_eq!(percept.value, PerceptValue::Unknown);
        prop_assert_eq!(percept.value.as_str(), "None");
    }

    #[test]
    fn ok_status_reports_the_detection_flag(raw in arb_reading(Just(STATUS_OK))) {
        let detected = matches!(raw.0[1], robot_brain::perception::RawField::Bool(true));
        let percept = encode_one("S1", &raw).unwrap();

        let expected = if detected { "True" } else { "False" };
        prop_assert_eq!(percept.value.as_str(), expected);
    }

    #[test]
    fn encoding_is_deterministic(raw in arb_reading(-2..3i32)) {
        prop_assert_eq!(encode_one("S7", &raw).unwrap(), encode_one("S7", &raw).unwrap());
    }

    #[test]
    fn batch_keeps_input_order(
        ids in arb_sensor_ids(),
        raws in prop::collection::vec(arb_reading(0..2i32), 12),
    ) {
        let readings: Vec<(String, RawReading)> =
            ids.iter().cloned().zip(raws.into_iter()).collect();
        let percepts = encode_batch(&readings).unwrap();

        prop_assert_eq!(percepts.len(), readings.len());
        for (percept, (id, _)) in percepts.iter().zip(&readings) {
            prop_assert_eq!(&percept.sensor_id, id);
        }
    }

    #[test]
    fn rendered_facts_parse_back(
        ids in arb_sensor_ids(),
        values in prop::collection::vec(arb_value(), 1..4),
    ) {
        let percepts = percepts_for(&ids, &values);
        let parsed = parse_fact(&render_percepts(&percepts)).unwrap();

        prop_assert_eq!(parsed.len(), percepts.len());
        for ((id, value), percept) in parsed.iter().zip(&percepts) {
            prop_assert_eq!(id, &percept.sensor_id);
            prop_assert_eq!(value.as_str(), percept.value.as_str());
        }
    }
}

// =============================================================================
// World state shape
// =============================================================================

proptest! {
    #[test]
    fn matching_percepts_build_a_state(
        ids in arb_sensor_ids(),
        values in prop::collection::vec(arb_value(), 1..4),
    ) {
        let state = WorldState::new(group_of(&ids), percepts_for(&ids, &values)).unwrap();
        prop_assert_eq!(state.len(), ids.len());
    }

    #[test]
    fn short_lists_are_rejected(ids in arb_sensor_ids(), drop in 1usize..12) {
        let mut percepts = percepts_for(&ids, &[PerceptValue::Clear]);
        percepts.truncate(ids.len().saturating_sub(drop));

        let result = WorldState::new(group_of(&ids), percepts);
        prop_assert!(matches!(result, Err(BrainError::StateShape(_))));
    }

    #[test]
    fn long_lists_are_rejected(ids in arb_sensor_ids(), extra in 1usize..4) {
        let mut percepts = percepts_for(&ids, &[PerceptValue::Detected]);
        for i in 0..extra {
            percepts.push(Percept::new(format!("X{}", i), PerceptValue::Clear));
        }

        let result = WorldState::new(group_of(&ids), percepts);
        prop_assert!(matches!(result, Err(BrainError::StateShape(_))));
    }

    #[test]
    fn permuted_lists_are_rejected(ids in arb_sensor_ids(), rotate in 1usize..12) {
        prop_assume!(ids.len() > 1);
        let shift = rotate % ids.len();
        prop_assume!(shift != 0);

        let mut percepts = percepts_for(&ids, &[PerceptValue::Unknown]);
        percepts.rotate_left(shift);

        let result = WorldState::new(group_of(&ids), percepts);
        prop_assert!(matches!(result, Err(BrainError::StateShape(_))));
    }
}

// =============================================================================
// Decisions
// =============================================================================

proptest! {
    #[test]
    fn decisions_stay_in_the_vocabulary(
        ids in arb_sensor_ids(),
        values in prop::collection::vec(arb_value(), 1..4),
        rules in prop::collection::vec((arb_decision(), prop::option::of(arb_value())), 0..6),
    ) {
        let clauses = rules
            .into_iter()
            .map(|(decision, condition)| {
                let conditions = condition
                    .map(|value| Condition {
                        sensor_id: ids[0].clone(),
                        expected: Expected::Is(value),
                    })
                    .into_iter()
                    .collect();
                clause(decision.to_string(), conditions)
            })
            .collect();

        let mut evaluator = RuleEvaluator::new(ClauseBase::from_clauses(clauses));
        let state = WorldState::new(group_of(&ids), percepts_for(&ids, &values)).unwrap();

        let decision = evaluator.decide(&state).unwrap();
        prop_assert!(Decision::ALL.contains(&decision));
        prop_assert_eq!(evaluator.current(), Some(decision));
    }

    #[test]
    fn unknown_answers_never_become_decisions(answer in "[A-Za-z]{1,10}") {
        let ids = vec!["S1".to_string()];
        let mut evaluator =
            RuleEvaluator::new(ClauseBase::from_clauses(vec![clause(answer.clone(), vec![])]));
        let state = WorldState::new(group_of(&ids), percepts_for(&ids, &[PerceptValue::Clear])).unwrap();

        match evaluator.decide(&state) {
            Ok(decision) => prop_assert_eq!(decision.to_string(), answer),
            Err(BrainError::InvalidDecision(value)) => {
                prop_assert_eq!(value, answer);
                prop_assert_eq!(evaluator.current(), None);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
