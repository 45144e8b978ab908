//! Whole-model evaluations: recruitment, mortality and ageing scheduled
//! over several years, with and without initialisation phases.
//!
//! With `M = 0` and a flat selectivity the expected partitions are exact
//! sums of recruited fish minus the catch.

use cohort_core::{ConfigError, ExecutionError, RunMode};
use cohort_engine::{
    AddressableTarget, CategoryConfig, InitialisationPhaseConfig, Model, ModelConfig, ModelError,
    ModelPhase, TimeStepConfig,
};
use cohort_process::Process;
use cohort_processes::{Ageing, MortalityInstantaneous, ProcessKind, RecruitmentConstant};
use cohort_test_utils::{
    catches_table, init_tracing, method_table, FlatSelectivity, NegativeProcess, ScaleProcess,
};
use indexmap::IndexMap;

fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

fn mortality(catch_2003: f64) -> MortalityInstantaneous {
    MortalityInstantaneous::builder("mortality")
        .categories(["stock"])
        .m([0.0])
        .relative_m_by_age(["one"])
        .catches(catches_table(&["trawl"], &[(2003, &[catch_2003])]))
        .method(method_table(&[["trawl", "stock", "one", "annual", "0.7", "none"]]))
        .build()
        .unwrap()
}

/// Years 2000–2004, ages 1–5 with a plus group, one annual time step
/// running recruitment (r0 = 1000), mortality and ageing.
fn config() -> ModelConfig {
    let mut cfg = ModelConfig::new(2000, 2004, 1, 5);
    cfg.categories.push(CategoryConfig::new("stock"));
    cfg.selectivities
        .push(("one".into(), Box::new(FlatSelectivity(1.0))));
    cfg.processes.push(
        RecruitmentConstant::new("recruitment", ["stock"], vec![1.0], 1000.0)
            .unwrap()
            .into(),
    );
    cfg.processes.push(mortality(600.0).into());
    cfg.processes.push(Ageing::new("ageing", ["stock"]).into());
    cfg.time_steps.push(TimeStepConfig::new(
        "annual",
        ["recruitment", "mortality", "ageing"],
    ));
    cfg
}

fn stock(model: &Model) -> Vec<f64> {
    model
        .partition()
        .category("stock")
        .unwrap()
        .numbers_at_age()
        .to_vec()
}

#[test]
fn basic_run_removes_the_catch() {
    init_tracing();
    let mut model = Model::new(config()).unwrap();
    let summary = model.evaluate(RunMode::Basic).unwrap();

    // 2003 before fishing: [1000, 1000, 1000, 1000, 0]; u = 600 / 4000.
    assert_eq!(stock(&model), [0.0, 1000.0, 850.0, 850.0, 1700.0]);
    assert_eq!(summary.first_year, 2000);
    assert_eq!(summary.last_year, 2004);
    assert_eq!(summary.years(), 5);
    assert_eq!(summary.penalty_triggers, 0);
    assert_eq!(summary.penalty_score, 0.0);
    assert_eq!(
        summary
            .process_us
            .iter()
            .map(|(label, _)| label.as_str())
            .collect::<Vec<_>>(),
        ["recruitment", "mortality", "ageing"]
    );

    let report = model
        .process("mortality")
        .and_then(ProcessKind::as_mortality_instantaneous)
        .and_then(|m| m.fishery("trawl"))
        .unwrap()
        .report();
    assert_eq!(report.actual_catches[&2003], 600.0);
    assert_eq!(report.exploitation_by_year[&2003], 0.15);
}

#[test]
fn iterative_initialisation_fills_the_plus_group() {
    let mut cfg = config();
    cfg.initialisation_phases
        .push(InitialisationPhaseConfig::Iterative {
            label: "equilibrium".into(),
            years: 10,
        });
    let mut model = Model::new(cfg).unwrap();
    let summary = model.evaluate(RunMode::Basic).unwrap();
    assert_eq!(summary.initialisation_years, 10);

    // Fifteen cohorts of 1000 recruited, fishing skipped while initialising.
    let numbers = stock(&model);
    assert_close(numbers.iter().sum(), 15_000.0 - 600.0);
    assert_eq!(numbers[0], 0.0);
    assert_close(numbers[1], 1000.0);
}

#[test]
fn state_by_age_initialisation_sets_numbers() {
    let mut cfg = ModelConfig::new(2000, 2001, 1, 5);
    cfg.categories.push(CategoryConfig::new("stock"));
    cfg.processes.push(Ageing::new("ageing", ["stock"]).into());
    cfg.time_steps
        .push(TimeStepConfig::new("annual", ["ageing"]));
    cfg.initialisation_phases
        .push(InitialisationPhaseConfig::StateByAge {
            label: "survey".into(),
            values: IndexMap::from([(
                "stock".to_string(),
                vec![100.0, 200.0, 300.0, 400.0, 500.0],
            )]),
        });
    let mut model = Model::new(cfg).unwrap();
    model.evaluate(RunMode::Basic).unwrap();
    assert_eq!(stock(&model), [0.0, 0.0, 100.0, 200.0, 1200.0]);
}

#[test]
fn projection_runs_past_the_final_year() {
    let mut cfg = config();
    cfg.projection_final_year = Some(2006);
    let mut model = Model::new(cfg).unwrap();
    model
        .set_addressable("process[mortality].method_trawl{2005}", 300.0)
        .unwrap();
    model.reset().unwrap();
    let summary = model.run_projection().unwrap();
    assert_eq!(summary.mode, RunMode::Projection);
    assert_eq!(summary.last_year, 2006);
    assert_close(stock(&model).iter().sum(), 7000.0 - 600.0 - 300.0);

    // A basic run of the same model stops at the final year.
    let summary = model.evaluate(RunMode::Basic).unwrap();
    assert_eq!(summary.last_year, 2004);
    assert_close(stock(&model).iter().sum(), 5000.0 - 600.0);
}

#[test]
fn addressable_changes_apply_at_reset() {
    let mut model = Model::new(config()).unwrap();
    assert_eq!(model.addressable("process[recruitment].r0").unwrap(), 1000.0);
    model
        .set_addressable("process[recruitment].r0", 2000.0)
        .unwrap();
    model
        .set_addressable("process[mortality].method_trawl{2003}", 0.0)
        .unwrap();
    model.evaluate(RunMode::Basic).unwrap();
    assert_eq!(stock(&model).iter().sum::<f64>(), 10_000.0);
    assert_eq!(
        model.addressable("process[mortality].method_trawl{2003}"),
        Ok(0.0)
    );
}

#[test]
fn addressable_paths_are_checked() {
    let mut model = Model::new(config()).unwrap();
    assert!(matches!(
        model.addressable("process[growth].k"),
        Err(ModelError::UnknownProcess { .. })
    ));
    assert!(matches!(
        model.set_addressable("process[recruitment]r0", 1.0),
        Err(ModelError::Addressable(_))
    ));
    assert!(matches!(
        model.set_addressable("process[recruitment].q", 1.0),
        Err(ModelError::Addressable(_))
    ));
}

#[test]
fn custom_process_is_driven_through_its_addressable() {
    let mut cfg = ModelConfig::new(2000, 2000, 1, 3);
    cfg.categories.push(CategoryConfig::new("stock"));
    cfg.processes.push(
        RecruitmentConstant::new("recruitment", ["stock"], vec![1.0], 1000.0)
            .unwrap()
            .into(),
    );
    cfg.processes
        .push(ProcessKind::Custom(Box::new(ScaleProcess::new(
            "scale",
            ["stock"],
            1.0,
        ))));
    cfg.time_steps
        .push(TimeStepConfig::new("annual", ["recruitment", "scale"]));
    let mut model = Model::new(cfg).unwrap();
    model.set_addressable("process[scale].factor", 0.5).unwrap();
    model.evaluate(RunMode::Basic).unwrap();
    assert_eq!(stock(&model), [500.0, 0.0, 0.0]);
    assert_eq!(model.process("scale").unwrap().type_name(), "scale");
}

#[test]
fn negative_partition_aborts_with_location() {
    let mut cfg = config();
    cfg.processes
        .push(ProcessKind::Custom(Box::new(NegativeProcess::new(
            "bad", "stock", 2002,
        ))));
    cfg.time_steps[0].processes.insert(1, "bad".into());
    let mut model = Model::new(cfg).unwrap();
    model.reset().unwrap();
    match model.run(RunMode::Basic) {
        Err(ModelError::Execution {
            year,
            time_step,
            process,
            source: ExecutionError::NegativePartition { age: 1, .. },
        }) => {
            assert_eq!(year, 2002);
            assert_eq!(time_step, "annual");
            assert_eq!(process, "bad");
        }
        other => panic!("expected Execution error, got {other:?}"),
    }
    assert_eq!(model.phase(), ModelPhase::Failed);
}

#[test]
fn usage_flags_gate_addressable_targets() {
    let mut cfg = config();
    cfg.addressable_targets.push(AddressableTarget::new(
        "process[mortality].time_step_proportions{1}",
        RunMode::Estimation,
    ));
    match Model::new(cfg) {
        Err(ConfigError::UsageNotPermitted { addressable, mode }) => {
            assert_eq!(addressable, "process[mortality].time_step_proportions{1}");
            assert_eq!(mode, RunMode::Estimation);
        }
        other => panic!("expected UsageNotPermitted, got {other:?}"),
    }

    let mut cfg = config();
    cfg.addressable_targets.push(AddressableTarget::new(
        "process[mortality].time_step_proportions{1}",
        RunMode::Projection,
    ));
    cfg.addressable_targets.push(AddressableTarget::new(
        "process[recruitment].r0",
        RunMode::Estimation,
    ));
    let model = Model::new(cfg).unwrap();
    assert_eq!(model.addressable_targets().len(), 2);
}

#[test]
fn unknown_target_addressable_is_rejected() {
    let mut cfg = config();
    cfg.addressable_targets.push(AddressableTarget::new(
        "process[recruitment].r1",
        RunMode::Estimation,
    ));
    assert!(matches!(Model::new(cfg), Err(ConfigError::Addressable(_))));
}

#[test]
fn process_errors_surface_from_new() {
    let mut cfg = config();
    cfg.selectivities.clear();
    assert!(matches!(
        Model::new(cfg),
        Err(ConfigError::UnknownSelectivity { .. })
    ));

    let mut cfg = config();
    cfg.categories[0] = CategoryConfig::new("stock").age_length("von_bertalanffy");
    assert!(matches!(
        Model::new(cfg),
        Err(ConfigError::UnknownAgeLength { .. })
    ));

    let mut cfg = config();
    cfg.time_steps.clear();
    assert!(matches!(Model::new(cfg), Err(ConfigError::InvalidModel { .. })));
}

#[test]
fn out_of_range_inputs_are_rejected_at_reset() {
    let mut model = Model::new(config()).unwrap();
    let cases = [
        ("process[mortality].m{stock}", -0.5, 0.0, "m{stock}", -0.5),
        (
            "process[mortality].time_step_proportions{1}",
            0.25,
            1.0,
            "time_step_proportions",
            0.25,
        ),
        (
            "process[mortality].method_trawl{2003}",
            -600.0,
            600.0,
            "method_trawl{2003}",
            -600.0,
        ),
    ];
    for (path, bad, good, label, reported) in cases {
        model.set_addressable(path, bad).unwrap();
        match model.evaluate(RunMode::Estimation) {
            Err(ModelError::Reset {
                process,
                source: ExecutionError::InvalidInput {
                    addressable, value, ..
                },
            }) => {
                assert_eq!(process, "mortality");
                assert_eq!(addressable, label);
                assert_eq!(value, reported);
            }
            other => panic!("{path} = {bad}: expected InvalidInput, got {other:?}"),
        }
        assert_eq!(model.phase(), ModelPhase::Failed);
        model.set_addressable(path, good).unwrap();
    }

    model
        .set_addressable("process[mortality].method_trawl{2003}", f64::NAN)
        .unwrap();
    assert!(matches!(
        model.evaluate(RunMode::Estimation),
        Err(ModelError::Reset {
            source: ExecutionError::InvalidInput { .. },
            ..
        })
    ));
    model
        .set_addressable("process[mortality].method_trawl{2003}", 600.0)
        .unwrap();

    // Restored inputs run as before and no fish are invented.
    model.evaluate(RunMode::Estimation).unwrap();
    assert_eq!(stock(&model), [0.0, 1000.0, 850.0, 850.0, 1700.0]);
}
