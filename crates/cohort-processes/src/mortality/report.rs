//! Per-year removals at age, one vector per fishery-category binding.

use std::collections::BTreeMap;

/// Removals at age by year and binding.
///
/// Storage is allocated once, for every catch year, when the process is
/// built. Executions only overwrite the slots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Removals {
    by_year: BTreeMap<u32, Vec<Vec<f64>>>,
}

impl Removals {
    pub(crate) fn allocate(years: impl IntoIterator<Item = u32>, spreads: &[usize]) -> Self {
        let slots: Vec<Vec<f64>> = spreads.iter().map(|&n| vec![0.0; n]).collect();
        Self {
            by_year: years.into_iter().map(|y| (y, slots.clone())).collect(),
        }
    }

    pub(crate) fn slot_mut(&mut self, year: u32, binding: usize) -> Option<&mut [f64]> {
        self.by_year
            .get_mut(&year)
            .and_then(|b| b.get_mut(binding))
            .map(Vec::as_mut_slice)
    }

    pub(crate) fn zero(&mut self) {
        for slot in self.by_year.values_mut().flatten() {
            slot.fill(0.0);
        }
    }

    /// Removals at age for `binding` in `year`.
    pub fn get(&self, year: u32, binding: usize) -> Option<&[f64]> {
        self.by_year
            .get(&year)
            .and_then(|b| b.get(binding))
            .map(Vec::as_slice)
    }

    /// Years with storage, ascending.
    pub fn years(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_year.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_preallocated_per_year_and_binding() {
        let mut r = Removals::allocate([2004, 2005], &[3, 2]);
        assert_eq!(r.years().collect::<Vec<_>>(), [2004, 2005]);
        assert_eq!(r.get(2005, 1), Some(&[0.0, 0.0][..]));
        assert!(r.get(2006, 0).is_none());
        assert!(r.get(2004, 2).is_none());

        r.slot_mut(2004, 0).unwrap()[2] = 7.5;
        assert_eq!(r.get(2004, 0), Some(&[0.0, 0.0, 7.5][..]));
        r.zero();
        assert_eq!(r.get(2004, 0), Some(&[0.0; 3][..]));
    }
}
