//! Evaluation-level guarantees: lifecycle ordering, bit-identical reset,
//! non-negativity under arbitrary catches, and independent models on
//! separate threads.

use std::thread;

use cohort_core::{RunMode, WeightUnits};
use cohort_engine::{
    CategoryConfig, InitialisationPhaseConfig, Model, ModelConfig, ModelError, ModelPhase,
    ProcessPenaltyConfig, TimeStepConfig,
};
use cohort_processes::{
    Ageing, BasicLengthWeight, ConstantSelectivity, LogisticSelectivity, MortalityInstantaneous,
    RecruitmentConstant, VonBertalanffy,
};
use cohort_test_utils::{catches_table, method_table};
use proptest::prelude::*;

/// Biomass model over 1990–2000, ages 1–15, two categories, two time
/// steps with mortality split across both.
fn config(r0: f64, catch: f64, m: f64) -> ModelConfig {
    let mut cfg = ModelConfig::new(1990, 2000, 1, 15);
    cfg.age_lengths.push((
        "vb".into(),
        Box::new(
            VonBertalanffy::builder()
                .linf(55.7)
                .k(0.14)
                .t0(-0.82)
                .cv_first(0.1)
                .length_weight(
                    BasicLengthWeight::new(0.007289, 3.2055, WeightUnits::Kilograms).unwrap(),
                )
                .build()
                .unwrap(),
        ),
    ));
    cfg.categories
        .push(CategoryConfig::new("male").age_length("vb"));
    cfg.categories
        .push(CategoryConfig::new("female").age_length("vb"));
    cfg.selectivities.push((
        "one".into(),
        Box::new(ConstantSelectivity::new(1.0).unwrap()),
    ));
    cfg.selectivities.push((
        "trawl_sel".into(),
        Box::new(LogisticSelectivity::new(5.0, 2.0).unwrap()),
    ));
    cfg.penalties
        .push(ProcessPenaltyConfig::new("catch_penalty"));

    let catches: Vec<(u32, [f64; 1])> = (1995..=2000).map(|y| (y, [catch])).collect();
    let rows: Vec<(u32, &[f64])> = catches.iter().map(|(y, c)| (*y, &c[..])).collect();
    cfg.processes.push(
        RecruitmentConstant::new("recruitment", ["male", "female"], vec![0.5, 0.5], r0)
            .unwrap()
            .into(),
    );
    cfg.processes.push(
        MortalityInstantaneous::builder("mortality")
            .categories(["male", "female"])
            .m([m])
            .relative_m_by_age(["one"])
            .time_step_proportions([0.5, 0.5])
            .biomass(true)
            .catches(catches_table(&["trawl"], &rows))
            .method(method_table(&[[
                "trawl",
                "male,female",
                "trawl_sel,trawl_sel",
                "summer",
                "0.6",
                "catch_penalty",
            ]]))
            .build()
            .unwrap()
            .into(),
    );
    cfg.processes
        .push(Ageing::new("ageing", ["male", "female"]).into());
    cfg.time_steps
        .push(TimeStepConfig::new("summer", ["recruitment", "mortality"]));
    cfg.time_steps
        .push(TimeStepConfig::new("winter", ["mortality", "ageing"]));
    cfg.initialisation_phases
        .push(InitialisationPhaseConfig::Iterative {
            label: "equilibrium".into(),
            years: 30,
        });
    cfg
}

fn snapshot(model: &Model) -> Vec<u64> {
    model
        .partition()
        .iter()
        .flat_map(|(_, c)| c.numbers_at_age().iter().map(|n| n.to_bits()))
        .collect()
}

#[test]
fn run_requires_reset() {
    let mut model = Model::new(config(1e5, 100.0, 0.2)).unwrap();
    assert_eq!(model.phase(), ModelPhase::Built);
    assert_eq!(
        model.run(RunMode::Basic).unwrap_err(),
        ModelError::Lifecycle {
            expected: ModelPhase::Reset,
            actual: ModelPhase::Built,
        }
    );

    model.reset().unwrap();
    assert_eq!(model.phase(), ModelPhase::Reset);
    model.run(RunMode::Basic).unwrap();
    assert_eq!(model.phase(), ModelPhase::Executed);
    assert_eq!(
        model.run(RunMode::Basic).unwrap_err(),
        ModelError::Lifecycle {
            expected: ModelPhase::Reset,
            actual: ModelPhase::Executed,
        }
    );
}

#[test]
fn reset_clears_partition_and_penalties() {
    let mut model = Model::new(config(1e4, 1e9, 0.2)).unwrap();
    model.evaluate(RunMode::Basic).unwrap();
    assert!(model.penalties().trigger_count() > 0);
    assert!(model.partition().total() > 0.0);

    model.reset().unwrap();
    assert_eq!(model.penalties().trigger_count(), 0);
    assert_eq!(model.partition().total(), 0.0);
}

#[test]
fn excessive_catch_is_capped_and_penalised() {
    let mut model = Model::new(config(1e4, 1e9, 0.2)).unwrap();
    let summary = model.evaluate(RunMode::Estimation).unwrap();
    assert_eq!(summary.penalty_triggers, 6);
    assert!(summary.penalty_score > 0.0);
    assert_eq!(summary.penalty_score, model.penalties().total_score());
    let records = model.penalties().records("catch_penalty").unwrap();
    assert!(records.iter().all(|r| {
        r.source == "mortality/trawl" && r.requested == 1e9 && r.permitted < r.requested
    }));
}

#[test]
fn independent_models_run_on_separate_threads() {
    let inputs = [(1e4, 50.0), (5e4, 200.0), (1e5, 400.0), (2e5, 1e9)];

    let sequential: Vec<Vec<u64>> = inputs
        .iter()
        .map(|&(r0, catch)| {
            let mut model = Model::new(config(r0, catch, 0.2)).unwrap();
            model.evaluate(RunMode::Basic).unwrap();
            snapshot(&model)
        })
        .collect();

    let parallel: Vec<Vec<u64>> = thread::scope(|s| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|&(r0, catch)| {
                s.spawn(move || {
                    let mut model = Model::new(config(r0, catch, 0.2)).unwrap();
                    model.evaluate(RunMode::Basic).unwrap();
                    snapshot(&model)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}

#[test]
fn built_model_moves_into_a_worker() {
    let mut model = Model::new(config(1e5, 100.0, 0.2)).unwrap();
    model.evaluate(RunMode::Basic).unwrap();
    let expected = snapshot(&model);

    let handle = thread::spawn(move || {
        model.evaluate(RunMode::Basic).unwrap();
        snapshot(&model)
    });
    assert_eq!(handle.join().unwrap(), expected);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn reset_then_rerun_is_bit_identical(
        r0 in 1e3f64..1e6,
        catch in 0.0f64..5e3,
        m in 0.0f64..0.6,
        r0_change in 0.5f64..2.0,
    ) {
        let mut model = Model::new(config(r0, catch, m)).unwrap();
        let first = model.evaluate(RunMode::Basic).unwrap();
        let first_state = snapshot(&model);

        // A different evaluation in between must leave no trace.
        model.set_addressable("process[recruitment].r0", r0 * r0_change).unwrap();
        model.evaluate(RunMode::Basic).unwrap();
        model.set_addressable("process[recruitment].r0", r0).unwrap();

        let second = model.evaluate(RunMode::Basic).unwrap();
        prop_assert_eq!(&first_state, &snapshot(&model));
        prop_assert_eq!(first.penalty_triggers, second.penalty_triggers);
        prop_assert_eq!(first.penalty_score.to_bits(), second.penalty_score.to_bits());
    }

    #[test]
    fn partition_stays_non_negative(
        r0 in 1e2f64..1e6,
        catch in 0.0f64..1e7,
        m in 0.0f64..1.0,
    ) {
        let mut model = Model::new(config(r0, catch, m)).unwrap();
        model.evaluate(RunMode::Basic).unwrap();
        for (_, category) in model.partition().iter() {
            for n in category.numbers_at_age() {
                prop_assert!(n.is_finite() && *n >= 0.0);
            }
        }
    }
}
