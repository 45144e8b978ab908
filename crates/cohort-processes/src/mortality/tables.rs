//! Reading the `catches` and `method` tables.
//!
//! Both tables arrive as raw strings. Every failure is reported against
//! the row it came from.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use cohort_core::table::parse_cell;
use cohort_core::{ConfigError, Provenance, Table};
use cohort_process::ModelInfo;

pub(crate) const COL_YEAR: &str = "year";
pub(crate) const COL_METHOD: &str = "method";
pub(crate) const COL_CATEGORY: &str = "category";
pub(crate) const COL_SELECTIVITY: &str = "selectivity";
pub(crate) const COL_TIME_STEP: &str = "time_step";
pub(crate) const COL_U_MAX: &str = "u_max";
pub(crate) const COL_PENALTY: &str = "penalty";
pub(crate) const COL_INITIALISATION: &str = "initialisation";
pub(crate) const COL_RETAINED: &str = "retained_selectivity";
pub(crate) const COL_DISCARD_MORTALITY: &str = "discard_mortality_selectivity";

/// Catch columns of the `catches` table.
#[derive(Debug, Default)]
pub(crate) struct Catches {
    /// Years kept, i.e. those within the model or projection years.
    pub(crate) years: BTreeSet<u32>,
    /// Catch by year, per fishery column, in column order.
    pub(crate) by_fishery: IndexMap<String, BTreeMap<u32, f64>>,
    pub(crate) at: Provenance,
}

pub(crate) fn read_catches(table: &Table, model: &ModelInfo) -> Result<Catches, ConfigError> {
    table.validate_shape()?;
    let year_column = table.require_column(COL_YEAR)?;

    let mut by_fishery = IndexMap::new();
    for (i, column) in table.columns().iter().enumerate() {
        if i == year_column {
            continue;
        }
        if by_fishery.insert(column.clone(), BTreeMap::new()).is_some() {
            return Err(ConfigError::DuplicateLabel {
                kind: "catches column",
                label: column.clone(),
            });
        }
    }

    let mut years = BTreeSet::new();
    for (row_index, row) in table.rows().iter().enumerate() {
        let at = table.row_provenance(row_index);
        let year: u32 = parse_cell(&row[year_column], COL_YEAR, &at)?;
        if !years.insert(year) {
            return Err(ConfigError::InvalidValue {
                parameter: COL_YEAR.into(),
                value: row[year_column].clone(),
                reason: "year appears more than once".into(),
                at,
            });
        }
        if year < model.start_year || year > model.projection_final_year {
            tracing::warn!(table = table.name(), year, %at, "catch year outside the model years is ignored");
            years.remove(&year);
            continue;
        }
        for (i, cell) in row.iter().enumerate() {
            if i == year_column {
                continue;
            }
            let fishery = &table.columns()[i];
            let value: f64 = parse_cell(cell, fishery, &at)?;
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    parameter: fishery.clone(),
                    value: cell.clone(),
                    reason: "catches must be finite and non-negative".into(),
                    at,
                });
            }
            if let Some(catches) = by_fishery.get_mut(fishery.as_str()) {
                catches.insert(year, value);
            }
        }
    }

    Ok(Catches {
        years,
        by_fishery,
        at: table.provenance().clone(),
    })
}

/// One row of the `method` table.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MethodRow {
    pub(crate) fishery: String,
    pub(crate) categories: Vec<String>,
    pub(crate) selectivities: Vec<String>,
    pub(crate) retained: Vec<String>,
    pub(crate) discard_mortality: Vec<String>,
    pub(crate) time_step: String,
    pub(crate) u_max: f64,
    pub(crate) penalty: String,
    pub(crate) initialisation: bool,
    pub(crate) at: Provenance,
}

pub(crate) fn read_methods(table: &Table, retained: bool) -> Result<Vec<MethodRow>, ConfigError> {
    table.validate_shape()?;
    let method = table.require_column(COL_METHOD)?;
    let category = table.require_column(COL_CATEGORY)?;
    let selectivity = table.require_column(COL_SELECTIVITY)?;
    let time_step = table.require_column(COL_TIME_STEP)?;
    let u_max = table.require_column(COL_U_MAX)?;
    let penalty = table.require_column(COL_PENALTY)?;
    let initialisation = table.column_index(COL_INITIALISATION);
    let retention = if retained {
        Some((
            table.require_column(COL_RETAINED)?,
            table.require_column(COL_DISCARD_MORTALITY)?,
        ))
    } else {
        None
    };

    let mut rows = Vec::with_capacity(table.len());
    for (row_index, row) in table.rows().iter().enumerate() {
        let at = table.row_provenance(row_index);
        let categories = split_list(&row[category]);
        if categories.is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: COL_CATEGORY.into(),
                value: row[category].clone(),
                reason: "at least one category is required".into(),
                at,
            });
        }
        let selectivities = aligned_list(&row[selectivity], COL_SELECTIVITY, categories.len(), &at)?;
        let (retained, discard_mortality) = match retention {
            Some((r, d)) => (
                aligned_list(&row[r], COL_RETAINED, categories.len(), &at)?,
                aligned_list(&row[d], COL_DISCARD_MORTALITY, categories.len(), &at)?,
            ),
            None => (Vec::new(), Vec::new()),
        };

        let u: f64 = parse_cell(&row[u_max], COL_U_MAX, &at)?;
        if !(u > 0.0 && u <= 1.0) {
            return Err(ConfigError::InvalidValue {
                parameter: COL_U_MAX.into(),
                value: row[u_max].clone(),
                reason: "must lie in (0, 1]".into(),
                at,
            });
        }

        let init = match initialisation {
            Some(column) => parse_cell::<bool>(&row[column].to_ascii_lowercase(), COL_INITIALISATION, &at)?,
            None => false,
        };

        rows.push(MethodRow {
            fishery: row[method].trim().to_string(),
            categories,
            selectivities,
            retained,
            discard_mortality,
            time_step: row[time_step].trim().to_string(),
            u_max: u,
            penalty: row[penalty].trim().to_string(),
            initialisation: init,
            at,
        });
    }
    Ok(rows)
}

/// Split a comma list cell into trimmed, non-empty labels.
pub(crate) fn split_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn aligned_list(
    cell: &str,
    parameter: &str,
    expected: usize,
    at: &Provenance,
) -> Result<Vec<String>, ConfigError> {
    let values = split_list(cell);
    if values.len() != expected {
        return Err(ConfigError::LengthMismatch {
            parameter: parameter.into(),
            expected,
            actual: values.len(),
            at: at.clone(),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_core::AgeRange;

    fn model() -> ModelInfo {
        ModelInfo {
            start_year: 2001,
            final_year: 2005,
            projection_final_year: 2007,
            ages: AgeRange::new(1, 20).unwrap(),
            age_plus: true,
            time_steps: 1,
        }
    }

    fn methods() -> Table {
        Table::new(
            "method",
            ["method", "category", "selectivity", "time_step", "u_max", "penalty"],
        )
        .with_provenance(Provenance::new("estimation.csl2", 20))
        .with_row(["trawl", "male, female", "trawl_sel,trawl_sel", "step_one", "0.7", "catch_penalty"])
        .with_row(["line", "male", "line_sel", "step_one", "0.9", "none"])
    }

    #[test]
    fn catches_keep_model_and_projection_years() {
        let table = Table::new("catches", ["year", "trawl", "line"])
            .with_row(["2000", "1", "2"])
            .with_row(["2004", "100", "20"])
            .with_row(["2006", "50", "0"]);
        let catches = read_catches(&table, &model()).unwrap();
        assert_eq!(catches.years.iter().copied().collect::<Vec<_>>(), [2004, 2006]);
        assert_eq!(catches.by_fishery["trawl"], BTreeMap::from([(2004, 100.0), (2006, 50.0)]));
        assert_eq!(catches.by_fishery["line"].get(&2000), None);
    }

    #[test]
    fn catches_reject_negative_values() {
        let table = Table::new("catches", ["year", "trawl"])
            .with_provenance(Provenance::new("catch.csl2", 4))
            .with_row(["2004", "-1"]);
        let err = read_catches(&table, &model()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value '-1' for 'trawl': catches must be finite and non-negative (catch.csl2:5)"
        );
    }

    #[test]
    fn catches_reject_repeated_years() {
        let table = Table::new("catches", ["year", "trawl"])
            .with_row(["2004", "1"])
            .with_row(["2004", "2"]);
        assert!(read_catches(&table, &model()).is_err());
    }

    #[test]
    fn catches_require_year_column() {
        let table = Table::new("catches", ["trawl"]).with_row(["1"]);
        assert!(matches!(
            read_catches(&table, &model()),
            Err(ConfigError::MissingColumn { .. })
        ));
    }

    #[test]
    fn method_rows_split_category_lists() {
        let rows = read_methods(&methods(), false).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].categories, ["male", "female"]);
        assert_eq!(rows[0].selectivities, ["trawl_sel", "trawl_sel"]);
        assert_eq!(rows[0].at, Provenance::new("estimation.csl2", 21));
        assert!(!rows[1].initialisation);
        assert_eq!(rows[1].penalty, "none");
    }

    #[test]
    fn method_selectivities_must_align_with_categories() {
        let table = methods().with_row(["pot", "male,female", "pot_sel", "step_one", "0.5", "none"]);
        assert!(matches!(
            read_methods(&table, false),
            Err(ConfigError::LengthMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn u_max_outside_unit_interval_rejected() {
        let table = methods().with_row(["pot", "male", "pot_sel", "step_one", "1.5", "none"]);
        assert!(matches!(
            read_methods(&table, false),
            Err(ConfigError::InvalidValue { ref parameter, .. }) if parameter == "u_max"
        ));
    }

    #[test]
    fn retained_columns_required_in_retained_mode() {
        let err = read_methods(&methods(), true).unwrap_err();
        assert!(matches!(err, ConfigError::MissingColumn { ref column, .. } if column == "retained_selectivity"));
    }

    #[test]
    fn initialisation_column_is_optional() {
        let table = Table::new(
            "method",
            ["method", "category", "selectivity", "time_step", "u_max", "penalty", "initialisation"],
        )
        .with_row(["trawl", "male", "sel", "step_one", "0.7", "none", "True"]);
        assert!(read_methods(&table, false).unwrap()[0].initialisation);
    }
}
