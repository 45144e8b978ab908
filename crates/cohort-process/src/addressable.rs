//! Label-addressed process parameters exposed to the estimator.
//!
//! Each process owns an [`AddressableRegistry`]: a small ordered map from
//! label to a tagged value ([`Addressable`]) plus the run modes
//! ([`Usage`]) in which an estimator may target it. The registry is the
//! owner of the current value; processes copy from it on `reset()`, so the
//! estimator can change a parameter between evaluations without knowing
//! how the process stores it internally.
//!
//! Single elements are addressed with an optional index string:
//!
//! | Kind | Index | Example |
//! |------|-------|---------|
//! | `Scalar` | none | `r0` |
//! | `Vector` | 1-based position | `time_step_proportions{2}` |
//! | `StringMap` | key | `m{male}` |
//! | `UnsignedMap` | integer key | `method_trawl{2005}` |

use std::collections::BTreeMap;

use indexmap::IndexMap;

use cohort_core::{AddressableError, Usage};

// ── Values ─────────────────────────────────────────────────────────

/// An addressable value, owned by the registry.
#[derive(Clone, Debug, PartialEq)]
pub enum Addressable {
    /// A single real.
    Scalar(f64),
    /// An ordered sequence of reals.
    Vector(Vec<f64>),
    /// Reals keyed by string, in insertion order.
    StringMap(IndexMap<String, f64>),
    /// Reals keyed by an unsigned integer (usually a year), ascending.
    UnsignedMap(BTreeMap<u32, f64>),
}

impl Addressable {
    /// Name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Vector(_) => "vector",
            Self::StringMap(_) => "string map",
            Self::UnsignedMap(_) => "unsigned map",
        }
    }

    /// Number of reals held.
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Vector(v) => v.len(),
            Self::StringMap(m) => m.len(),
            Self::UnsignedMap(m) => m.len(),
        }
    }

    /// Whether no reals are held. A scalar is never empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the value is a container rather than a scalar.
    pub fn is_vector(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }
}

/// Borrowed view of an [`Addressable`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AddressableRef<'a> {
    /// A single real.
    Scalar(&'a f64),
    /// An ordered sequence of reals.
    Vector(&'a [f64]),
    /// Reals keyed by string.
    StringMap(&'a IndexMap<String, f64>),
    /// Reals keyed by unsigned integer.
    UnsignedMap(&'a BTreeMap<u32, f64>),
}

/// Mutable view of an [`Addressable`].
///
/// Containers can be updated in place but not resized through this view.
#[derive(Debug)]
pub enum AddressableMut<'a> {
    /// A single real.
    Scalar(&'a mut f64),
    /// An ordered sequence of reals.
    Vector(&'a mut [f64]),
    /// Reals keyed by string.
    StringMap(&'a mut IndexMap<String, f64>),
    /// Reals keyed by unsigned integer.
    UnsignedMap(&'a mut BTreeMap<u32, f64>),
}

#[derive(Clone, Debug, PartialEq)]
struct Entry {
    value: Addressable,
    usage: Usage,
}

// ── Registry ───────────────────────────────────────────────────────

/// Per-process map from label to addressable value and usage flags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddressableRegistry {
    entries: IndexMap<String, Entry>,
}

impl AddressableRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `label`.
    pub fn register(
        &mut self,
        label: impl Into<String>,
        value: Addressable,
        usage: Usage,
    ) -> Result<(), AddressableError> {
        let label = label.into();
        if self.entries.contains_key(&label) {
            return Err(AddressableError::AlreadyRegistered { label });
        }
        self.entries.insert(label, Entry { value, usage });
        Ok(())
    }

    /// Whether `label` is registered.
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// Registered labels in registration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered addressables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, label: &str) -> Result<&Entry, AddressableError> {
        self.entries
            .get(label)
            .ok_or_else(|| AddressableError::NotRegistered {
                label: label.to_string(),
            })
    }

    fn entry_mut(&mut self, label: &str) -> Result<&mut Entry, AddressableError> {
        self.entries
            .get_mut(label)
            .ok_or_else(|| AddressableError::NotRegistered {
                label: label.to_string(),
            })
    }

    /// Borrow the value registered under `label`.
    pub fn get(&self, label: &str) -> Result<AddressableRef<'_>, AddressableError> {
        Ok(match &self.entry(label)?.value {
            Addressable::Scalar(v) => AddressableRef::Scalar(v),
            Addressable::Vector(v) => AddressableRef::Vector(v),
            Addressable::StringMap(m) => AddressableRef::StringMap(m),
            Addressable::UnsignedMap(m) => AddressableRef::UnsignedMap(m),
        })
    }

    /// Mutably borrow the value registered under `label`.
    pub fn get_mut(&mut self, label: &str) -> Result<AddressableMut<'_>, AddressableError> {
        Ok(match &mut self.entry_mut(label)?.value {
            Addressable::Scalar(v) => AddressableMut::Scalar(v),
            Addressable::Vector(v) => AddressableMut::Vector(v),
            Addressable::StringMap(m) => AddressableMut::StringMap(m),
            Addressable::UnsignedMap(m) => AddressableMut::UnsignedMap(m),
        })
    }

    /// Replace the whole value under `label`. The variant must not change.
    pub fn replace(&mut self, label: &str, value: Addressable) -> Result<(), AddressableError> {
        let entry = self.entry_mut(label)?;
        if std::mem::discriminant(&entry.value) != std::mem::discriminant(&value) {
            return Err(AddressableError::TypeMismatch {
                label: label.to_string(),
                expected: entry.value.kind_name(),
                actual: value.kind_name(),
            });
        }
        entry.value = value;
        Ok(())
    }

    /// Number of reals held under `label`.
    pub fn size(&self, label: &str) -> Result<usize, AddressableError> {
        Ok(self.entry(label)?.value.len())
    }

    /// Whether `label` holds a container.
    pub fn is_vector(&self, label: &str) -> Result<bool, AddressableError> {
        Ok(self.entry(label)?.value.is_vector())
    }

    /// Usage flags of `label`.
    pub fn usage(&self, label: &str) -> Result<Usage, AddressableError> {
        Ok(self.entry(label)?.usage)
    }

    /// Scalar value under `label`.
    pub fn scalar(&self, label: &str) -> Result<f64, AddressableError> {
        match self.entry(label)?.value {
            Addressable::Scalar(v) => Ok(v),
            ref other => Err(mismatch(label, "scalar", other)),
        }
    }

    /// Vector value under `label`.
    pub fn vector(&self, label: &str) -> Result<&[f64], AddressableError> {
        match &self.entry(label)?.value {
            Addressable::Vector(v) => Ok(v),
            other => Err(mismatch(label, "vector", other)),
        }
    }

    /// String-keyed map under `label`.
    pub fn string_map(&self, label: &str) -> Result<&IndexMap<String, f64>, AddressableError> {
        match &self.entry(label)?.value {
            Addressable::StringMap(m) => Ok(m),
            other => Err(mismatch(label, "string map", other)),
        }
    }

    /// Integer-keyed map under `label`.
    pub fn unsigned_map(&self, label: &str) -> Result<&BTreeMap<u32, f64>, AddressableError> {
        match &self.entry(label)?.value {
            Addressable::UnsignedMap(m) => Ok(m),
            other => Err(mismatch(label, "unsigned map", other)),
        }
    }

    /// Read one real, using `index` for containers.
    pub fn value(&self, label: &str, index: Option<&str>) -> Result<f64, AddressableError> {
        let value = &self.entry(label)?.value;
        match (value, index) {
            (Addressable::Scalar(v), None) => Ok(*v),
            (Addressable::Scalar(_), Some(_)) => Err(AddressableError::IndexRequired {
                label: label.to_string(),
                reason: "is a scalar and takes no index",
            }),
            (_, None) => Err(AddressableError::IndexRequired {
                label: label.to_string(),
                reason: "requires an element index",
            }),
            (Addressable::Vector(v), Some(i)) => {
                let pos = vector_position(label, i, v.len())?;
                Ok(v[pos])
            }
            (Addressable::StringMap(m), Some(k)) => {
                m.get(k).copied().ok_or_else(|| not_found(label, k))
            }
            (Addressable::UnsignedMap(m), Some(k)) => {
                let key = unsigned_key(label, k)?;
                m.get(&key).copied().ok_or_else(|| not_found(label, k))
            }
        }
    }

    /// Overwrite one real, using `index` for containers.
    ///
    /// Unsigned maps accept new keys; every other container requires the
    /// element to exist already.
    pub fn set_value(
        &mut self,
        label: &str,
        index: Option<&str>,
        new_value: f64,
    ) -> Result<(), AddressableError> {
        let value = &mut self.entry_mut(label)?.value;
        match (value, index) {
            (Addressable::Scalar(v), None) => *v = new_value,
            (Addressable::Scalar(_), Some(_)) => {
                return Err(AddressableError::IndexRequired {
                    label: label.to_string(),
                    reason: "is a scalar and takes no index",
                })
            }
            (_, None) => {
                return Err(AddressableError::IndexRequired {
                    label: label.to_string(),
                    reason: "requires an element index",
                })
            }
            (Addressable::Vector(v), Some(i)) => {
                let pos = vector_position(label, i, v.len())?;
                v[pos] = new_value;
            }
            (Addressable::StringMap(m), Some(k)) => {
                let slot = m.get_mut(k).ok_or_else(|| not_found(label, k))?;
                *slot = new_value;
            }
            (Addressable::UnsignedMap(m), Some(k)) => {
                let key = unsigned_key(label, k)?;
                m.insert(key, new_value);
            }
        }
        Ok(())
    }
}

fn mismatch(label: &str, expected: &'static str, actual: &Addressable) -> AddressableError {
    AddressableError::TypeMismatch {
        label: label.to_string(),
        expected,
        actual: actual.kind_name(),
    }
}

fn not_found(label: &str, index: &str) -> AddressableError {
    AddressableError::IndexNotFound {
        label: label.to_string(),
        index: index.to_string(),
    }
}

fn unsigned_key(label: &str, index: &str) -> Result<u32, AddressableError> {
    index.trim().parse().map_err(|_| not_found(label, index))
}

/// Convert a 1-based index string into a 0-based position.
fn vector_position(label: &str, index: &str, len: usize) -> Result<usize, AddressableError> {
    match index.trim().parse::<usize>() {
        Ok(i) if (1..=len).contains(&i) => Ok(i - 1),
        _ => Err(not_found(label, index)),
    }
}

// ── Paths ──────────────────────────────────────────────────────────

/// A parsed model-level addressable path: `process[label].name{index}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressablePath {
    /// Label of the owning process.
    pub process: String,
    /// Addressable label within the process.
    pub addressable: String,
    /// Element index, if any.
    pub index: Option<String>,
}

impl AddressablePath {
    /// Parse `process[<label>].<addressable>` with an optional `{<index>}`.
    pub fn parse(path: &str) -> Result<Self, AddressableError> {
        let malformed = |reason| AddressableError::MalformedPath {
            path: path.to_string(),
            reason,
        };
        let (owner, rest) = path.split_once('[').ok_or_else(|| malformed("expected '['"))?;
        if owner.trim() != "process" {
            return Err(malformed("only process addressables are exposed"));
        }
        let (process, rest) = rest.split_once(']').ok_or_else(|| malformed("expected ']'"))?;
        let rest = rest
            .strip_prefix('.')
            .ok_or_else(|| malformed("expected '.' after ']'"))?;
        let (addressable, index) = match rest.split_once('{') {
            Some((name, idx)) => {
                let idx = idx
                    .strip_suffix('}')
                    .ok_or_else(|| malformed("expected '}' at end"))?;
                (name, Some(idx.to_string()))
            }
            None => (rest, None),
        };
        if process.is_empty() || addressable.is_empty() {
            return Err(malformed("empty label"));
        }
        Ok(Self {
            process: process.to_string(),
            addressable: addressable.to_string(),
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registry() -> AddressableRegistry {
        let mut r = AddressableRegistry::new();
        r.register("r0", Addressable::Scalar(1e6), Usage::all())
            .unwrap();
        r.register(
            "time_step_proportions",
            Addressable::Vector(vec![0.25, 0.75]),
            Usage::all() - Usage::ESTIMATE,
        )
        .unwrap();
        r.register(
            "m",
            Addressable::StringMap(IndexMap::from([
                ("male".to_string(), 0.2),
                ("female".to_string(), 0.15),
            ])),
            Usage::all(),
        )
        .unwrap();
        r.register(
            "method_trawl",
            Addressable::UnsignedMap(BTreeMap::from([(2004, 500.0), (2005, 800.0)])),
            Usage::all(),
        )
        .unwrap();
        r
    }

    #[test]
    fn reports_size_and_kind() {
        let r = registry();
        assert_eq!(r.size("r0"), Ok(1));
        assert_eq!(r.is_vector("r0"), Ok(false));
        assert_eq!(r.size("m"), Ok(2));
        assert_eq!(r.is_vector("method_trawl"), Ok(true));
        assert_eq!(r.labels().collect::<Vec<_>>(), ["r0", "time_step_proportions", "m", "method_trawl"]);
    }

    #[test]
    fn unknown_label_is_not_registered() {
        let r = registry();
        assert_eq!(
            r.get("q").unwrap_err(),
            AddressableError::NotRegistered { label: "q".into() }
        );
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut r = registry();
        assert!(matches!(
            r.register("m", Addressable::Scalar(0.0), Usage::all()),
            Err(AddressableError::AlreadyRegistered { .. })
        ));
    }

    #[test]
    fn vector_indices_are_one_based() {
        let mut r = registry();
        assert_eq!(r.value("time_step_proportions", Some("2")), Ok(0.75));
        assert!(r.value("time_step_proportions", Some("0")).is_err());
        r.set_value("time_step_proportions", Some("1"), 0.5).unwrap();
        assert_eq!(r.vector("time_step_proportions").unwrap(), &[0.5, 0.75]);
    }

    #[test]
    fn maps_addressed_by_key() {
        let mut r = registry();
        assert_eq!(r.value("m", Some("female")), Ok(0.15));
        r.set_value("m", Some("male"), 0.3).unwrap();
        assert_eq!(r.string_map("m").unwrap()["male"], 0.3);
        assert!(r.set_value("m", Some("juvenile"), 0.1).is_err());

        r.set_value("method_trawl", Some("2006"), 900.0).unwrap();
        assert_eq!(r.value("method_trawl", Some("2006")), Ok(900.0));
        assert_eq!(r.size("method_trawl"), Ok(3));
    }

    #[test]
    fn index_required_for_containers_only() {
        let r = registry();
        assert!(matches!(
            r.value("m", None),
            Err(AddressableError::IndexRequired { .. })
        ));
        assert!(matches!(
            r.value("r0", Some("1")),
            Err(AddressableError::IndexRequired { .. })
        ));
        assert_eq!(r.value("r0", None), Ok(1e6));
    }

    #[test]
    fn typed_access_checks_kind() {
        let r = registry();
        assert_eq!(
            r.scalar("m").unwrap_err(),
            AddressableError::TypeMismatch {
                label: "m".into(),
                expected: "scalar",
                actual: "string map",
            }
        );
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut r = registry();
        if let Ok(AddressableMut::Scalar(v)) = r.get_mut("r0") {
            *v = 2e6;
        }
        assert_eq!(r.scalar("r0"), Ok(2e6));
        assert!(r.replace("r0", Addressable::Vector(vec![])).is_err());
    }

    #[test]
    fn usage_flags_are_kept_per_label() {
        let r = registry();
        assert!(!r.usage("time_step_proportions").unwrap().contains(Usage::ESTIMATE));
        assert!(r.usage("m").unwrap().contains(Usage::ESTIMATE));
    }

    #[test]
    fn parses_process_paths() {
        assert_eq!(
            AddressablePath::parse("process[mortality].m{male}"),
            Ok(AddressablePath {
                process: "mortality".into(),
                addressable: "m".into(),
                index: Some("male".into()),
            })
        );
        assert_eq!(
            AddressablePath::parse("process[recruitment].r0").map(|p| p.index),
            Ok(None)
        );
        assert!(AddressablePath::parse("selectivity[logistic].a50").is_err());
        assert!(AddressablePath::parse("process[mortality]m").is_err());
        assert!(AddressablePath::parse("process[mortality].m{male").is_err());
    }

    proptest! {
        #[test]
        fn vector_elements_are_one_based(
            values in prop::collection::vec(-1e6f64..1e6, 1..12),
            pick in any::<prop::sample::Index>(),
            new_value in -1e6f64..1e6,
        ) {
            let mut r = AddressableRegistry::new();
            r.register("v", Addressable::Vector(values.clone()), Usage::all()).unwrap();
            let i = pick.index(values.len());
            let key = (i + 1).to_string();

            prop_assert_eq!(r.value("v", Some(&key)), Ok(values[i]));
            r.set_value("v", Some(&key), new_value).unwrap();
            prop_assert_eq!(r.value("v", Some(&key)), Ok(new_value));

            // Every other element is untouched.
            let stored = r.vector("v").unwrap();
            for (j, (a, b)) in stored.iter().zip(&values).enumerate() {
                if j != i {
                    prop_assert_eq!(a.to_bits(), b.to_bits());
                }
            }
            prop_assert!(r.value("v", Some("0")).is_err());
            let past_end = (values.len() + 1).to_string();
            prop_assert!(r.set_value("v", Some(&past_end), 1.0).is_err());
        }

        #[test]
        fn unsigned_map_keys_round_trip(
            year in 1900u32..2100,
            catch in 0.0f64..1e7,
        ) {
            let mut r = registry();
            let key = year.to_string();
            r.set_value("method_trawl", Some(&key), catch).unwrap();
            prop_assert_eq!(r.value("method_trawl", Some(&key)), Ok(catch));
            prop_assert_eq!(r.unsigned_map("method_trawl").unwrap()[&year], catch);
        }

        #[test]
        fn model_paths_round_trip(
            process in "[a-z][a-z_]{0,12}",
            name in "[a-z][a-z_0-9]{0,12}",
            index in prop::option::of("[a-z0-9]{1,6}"),
        ) {
            let path = match &index {
                Some(i) => format!("process[{process}].{name}{{{i}}}"),
                None => format!("process[{process}].{name}"),
            };
            let parsed = AddressablePath::parse(&path).unwrap();
            prop_assert_eq!(parsed.process, process);
            prop_assert_eq!(parsed.addressable, name);
            prop_assert_eq!(parsed.index, index);
        }
    }
}
