//! Benchmark profiles for the Cohort population dynamics framework.
//!
//! Provides pre-built [`ModelConfig`] profiles for benchmarking:
//!
//! - [`reference_profile`]: 36 years, ages 1–30, two sexes, three fisheries
//! - [`stress_profile`]: 111 years, ages 1–60, eight categories, six fisheries
//! - [`catch_series`]: deterministic catch history for any fishery

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cohort_core::{ConfigError, Table, WeightUnits};
use cohort_engine::{
    CategoryConfig, InitialisationPhaseConfig, ModelConfig, ProcessPenaltyConfig, TimeStepConfig,
};
use cohort_processes::{
    Ageing, BasicLengthWeight, ConstantSelectivity, LogisticSelectivity, MortalityInstantaneous,
    RecruitmentConstant, VonBertalanffy,
};

/// Build the reference benchmark profile: 1975–2010, ages 1–30.
///
/// Categories `male` and `female` share one von Bertalanffy curve.
/// Fisheries `trawl`, `line` and `pot` take biomass catches from 1980.
/// A 60-year iterative initialisation precedes the model years.
pub fn reference_profile() -> Result<ModelConfig, ConfigError> {
    profile(1975, 2010, 30, &["male", "female"], &["trawl", "line", "pot"])
}

/// Build the stress benchmark profile: 1900–2010, ages 1–60.
///
/// Same structure as [`reference_profile`] with eight categories and six
/// fisheries.
pub fn stress_profile() -> Result<ModelConfig, ConfigError> {
    let categories: Vec<String> = (0..8).map(|i| format!("stock_{i}")).collect();
    let categories: Vec<&str> = categories.iter().map(String::as_str).collect();
    profile(
        1900,
        2010,
        60,
        &categories,
        &["trawl", "line", "pot", "seine", "gillnet", "dredge"],
    )
}

/// Deterministic catch (tonnes) for `fishery_index` in `year`.
///
/// Varies between 50 and 95 tonnes with no random state.
pub fn catch_series(fishery_index: usize, year: u32) -> f64 {
    let step = (year as usize * 7 + fishery_index * 13) % 10;
    50.0 + 5.0 * step as f64
}

fn profile(
    start_year: u32,
    final_year: u32,
    max_age: u32,
    categories: &[&str],
    fisheries: &[&str],
) -> Result<ModelConfig, ConfigError> {
    let mut cfg = ModelConfig::new(start_year, final_year, 1, max_age);

    let growth = VonBertalanffy::builder()
        .linf(55.7)
        .k(0.14)
        .t0(-0.82)
        .cv_first(0.1)
        .cv_last(0.2)
        .time_step_proportions([0.0, 0.5])
        .length_weight(BasicLengthWeight::new(
            0.007289,
            3.2055,
            WeightUnits::Kilograms,
        )?)
        .build()?;
    cfg.age_lengths.push(("vb".into(), Box::new(growth)));
    for category in categories {
        cfg.categories
            .push(CategoryConfig::new(*category).age_length("vb"));
    }

    cfg.selectivities
        .push(("one".into(), Box::new(ConstantSelectivity::new(1.0)?)));
    for (i, fishery) in fisheries.iter().enumerate() {
        let a50 = 3.0 + 2.0 * i as f64;
        cfg.selectivities.push((
            format!("{fishery}_sel"),
            Box::new(LogisticSelectivity::new(a50, 2.5)?),
        ));
    }
    cfg.penalties
        .push(ProcessPenaltyConfig::new("catch_penalty"));

    let share = 1.0 / categories.len() as f64;
    cfg.processes.push(
        RecruitmentConstant::new(
            "recruitment",
            categories.iter().copied(),
            vec![share; categories.len()],
            2.0e6,
        )?
        .into(),
    );
    cfg.processes.push(
        MortalityInstantaneous::builder("mortality")
            .categories(categories.iter().copied())
            .m([0.2])
            .relative_m_by_age(["one"])
            .time_step_proportions([0.5, 0.5])
            .biomass(true)
            .catches(catches(start_year + 5, final_year, fisheries))
            .method(methods(categories, fisheries))
            .build()?
            .into(),
    );
    cfg.processes
        .push(Ageing::new("ageing", categories.iter().copied()).into());

    cfg.time_steps
        .push(TimeStepConfig::new("summer", ["recruitment", "mortality"]));
    cfg.time_steps
        .push(TimeStepConfig::new("winter", ["mortality", "ageing"]));
    cfg.initialisation_phases
        .push(InitialisationPhaseConfig::Iterative {
            label: "equilibrium".into(),
            years: 2 * max_age,
        });
    Ok(cfg)
}

fn catches(first_year: u32, final_year: u32, fisheries: &[&str]) -> Table {
    let mut table = Table::new(
        "catches",
        std::iter::once("year").chain(fisheries.iter().copied()),
    );
    for year in first_year..=final_year {
        table.push_row(
            std::iter::once(year.to_string())
                .chain((0..fisheries.len()).map(|i| catch_series(i, year).to_string())),
        );
    }
    table
}

fn methods(categories: &[&str], fisheries: &[&str]) -> Table {
    let mut table = Table::new(
        "method",
        ["method", "category", "selectivity", "time_step", "u_max", "penalty"],
    );
    let category_cell = categories.join(",");
    for fishery in fisheries {
        let selectivity = vec![format!("{fishery}_sel"); categories.len()].join(",");
        table.push_row([
            fishery.to_string(),
            category_cell.clone(),
            selectivity,
            "summer".to_string(),
            "0.7".to_string(),
            "catch_penalty".to_string(),
        ]);
    }
    table
}
