//! Hierarchical grouping of thermals by an ordered list of fields.
//!
//! Thermals are sorted by a composite key (one [`SortableValue`] per field,
//! then start time) and then walked once. A category boundary opens at a
//! level whenever that level's title differs from the previous thermal's,
//! and every deeper level opens with it. This only partitions correctly
//! because the sort order follows the same field priority.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, ThermalError};
use crate::models::{Logbook, Thermal};
use crate::rules::CategoryRules;
use crate::sortable::{SortableValue, SortingField};

/// Index of a category inside a [`CategoryForest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub usize);

/// Creates and finalizes the output-specific side of each category.
pub trait CategoryFactory {
    /// Whatever the output format keeps per category (a folder, a label, ...).
    type Handle;

    /// Called when a category boundary opens. `parent` is `None` for roots.
    fn create_category(
        &mut self,
        field: SortingField,
        title: &str,
        parent: Option<&Self::Handle>,
    ) -> Self::Handle;

    /// Called once per category after every thermal has been placed.
    fn finish_category(&mut self, _handle: &mut Self::Handle, _title: &str, _total_thermals: usize) {
    }
}

/// Factory whose handles are display titles with the subtree count appended.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingTitles;

impl CategoryFactory for CountingTitles {
    type Handle = String;

    fn create_category(&mut self, _field: SortingField, title: &str, _parent: Option<&String>) -> String {
        title.to_string()
    }

    fn finish_category(&mut self, handle: &mut String, title: &str, total_thermals: usize) {
        *handle = format!("{title} ({total_thermals})");
    }
}

/// One node of the category tree.
#[derive(Debug, Clone)]
pub struct ThermalCategory<H> {
    pub field: SortingField,
    pub title: String,
    pub parent: Option<CategoryId>,
    pub handle: H,
    thermals: Vec<Thermal>,
    children: Vec<CategoryId>,
}

impl<H> ThermalCategory<H> {
    /// Thermals placed directly in this category.
    pub fn thermals(&self) -> &[Thermal] {
        &self.thermals
    }

    pub fn children(&self) -> &[CategoryId] {
        &self.children
    }
}

/// Arena of categories plus the list of roots.
#[derive(Debug, Clone)]
pub struct CategoryForest<H> {
    nodes: Vec<ThermalCategory<H>>,
    roots: Vec<CategoryId>,
}

impl<H> Default for CategoryForest<H> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }
}

impl<H> CategoryForest<H> {
    pub fn roots(&self) -> &[CategoryId] {
        &self.roots
    }

    pub fn category(&self, id: CategoryId) -> Option<&ThermalCategory<H>> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Thermals in the subtree rooted at `id`.
    pub fn total_thermals(&self, id: CategoryId) -> usize {
        self.category(id).map_or(0, |category| {
            category.thermals.len()
                + category
                    .children
                    .iter()
                    .map(|child| self.total_thermals(*child))
                    .sum::<usize>()
        })
    }

    /// Thermals across the whole forest.
    pub fn thermal_count(&self) -> usize {
        self.roots.iter().map(|root| self.total_thermals(*root)).sum()
    }

    fn insert(&mut self, category: ThermalCategory<H>) -> CategoryId {
        let id = CategoryId(self.nodes.len());
        match category.parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.push(category);
        id
    }

    fn finish<F>(&mut self, factory: &mut F)
    where
        F: CategoryFactory<Handle = H>,
    {
        for root in self.roots.clone() {
            self.finish_subtree(root, factory);
        }
    }

    fn finish_subtree<F>(&mut self, id: CategoryId, factory: &mut F)
    where
        F: CategoryFactory<Handle = H>,
    {
        let total = self.total_thermals(id);
        let node = &mut self.nodes[id.0];
        factory.finish_category(&mut node.handle, &node.title, total);
        for child in node.children.clone() {
            self.finish_subtree(child, factory);
        }
    }
}

/// A thermal paired with its precomputed sort keys.
#[derive(Debug, Clone)]
pub struct KeyedThermal {
    pub keys: Vec<SortableValue>,
    pub start: DateTime<Utc>,
    pub thermal: Thermal,
}

/// Composite order: each key in field priority, then start time.
pub fn compare_keyed(a: &KeyedThermal, b: &KeyedThermal) -> Ordering {
    a.keys
        .iter()
        .zip(&b.keys)
        .map(|(ka, kb)| ka.compare(kb))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.start.cmp(&b.start))
}

/// Sorts and groups thermals according to [`CategoryRules`].
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    rules: CategoryRules,
}

impl Categorizer {
    pub fn new(rules: CategoryRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &CategoryRules {
        &self.rules
    }

    /// Sort keys of `thermal`, one per configured field.
    pub fn keys_for(&self, logbook: &Logbook, thermal: &Thermal) -> Result<Vec<SortableValue>> {
        let flight = logbook.flight(thermal.flight_id())?;
        self.rules
            .sorting_fields
            .iter()
            .map(|field| field.value_of(thermal, flight, &self.rules))
            .collect()
    }

    fn keyed(&self, logbook: &Logbook, thermal: Thermal) -> Result<KeyedThermal> {
        let keys = self.keys_for(logbook, &thermal)?;
        let start = thermal.start_time().ok_or(ThermalError::EmptyThermal)?;
        Ok(KeyedThermal {
            keys,
            start,
            thermal,
        })
    }

    /// Stable sort by the composite key. Thermals without keys are dropped.
    pub fn sort(&self, logbook: &Logbook, thermals: Vec<Thermal>) -> Vec<KeyedThermal> {
        let mut keyed: Vec<KeyedThermal> = thermals
            .into_iter()
            .filter_map(|thermal| {
                let flight = thermal.flight_id();
                match self.keyed(logbook, thermal) {
                    Ok(keyed) => Some(keyed),
                    Err(err) => {
                        warn!(%flight, error = %err, "skipping thermal during categorization");
                        None
                    }
                }
            })
            .collect();
        keyed.sort_by(compare_keyed);
        keyed
    }

    /// Build the category forest for `thermals`, finishing every category
    /// through `factory`.
    pub fn categorize<F>(
        &self,
        logbook: &Logbook,
        thermals: Vec<Thermal>,
        factory: &mut F,
    ) -> CategoryForest<F::Handle>
    where
        F: CategoryFactory,
    {
        let fields = &self.rules.sorting_fields;
        let mut forest = CategoryForest::default();
        if fields.is_empty() {
            warn!("no sorting fields configured, nothing to categorize");
            return forest;
        }

        let mut active: Vec<Option<CategoryId>> = vec![None; fields.len()];
        let mut previous: Option<Vec<SortableValue>> = None;
        for KeyedThermal { keys, thermal, .. } in self.sort(logbook, thermals) {
            let mut opened = false;
            for (level, field) in fields.iter().enumerate() {
                let unchanged = !opened
                    && active[level].is_some()
                    && previous
                        .as_ref()
                        .is_some_and(|prev| prev[level].same_category(&keys[level]));
                if unchanged {
                    continue;
                }

                opened = true;
                let title = keys[level].title();
                let parent = if level == 0 { None } else { active[level - 1] };
                let parent_handle = parent.and_then(|id| forest.category(id)).map(|c| &c.handle);
                let handle = factory.create_category(*field, title, parent_handle);
                let id = forest.insert(ThermalCategory {
                    field: *field,
                    title: title.to_string(),
                    parent,
                    handle,
                    thermals: Vec::new(),
                    children: Vec::new(),
                });
                active[level] = Some(id);
            }

            if let Some(leaf) = active[fields.len() - 1] {
                forest.nodes[leaf.0].thermals.push(thermal);
            }
            previous = Some(keys);
        }

        forest.finish(factory);
        info!(
            categories = forest.len(),
            thermals = forest.thermal_count(),
            "categorization finished"
        );
        forest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fix, Flight, FlightId};
    use chrono::{Duration, NaiveDate, TimeZone};

    /// Thermal climbing `rate` m/s for 100 s, starting on the given day.
    fn thermal(flight: FlightId, month: u32, day: u32, rate: f64) -> Thermal {
        let t0 = Utc.with_ymd_and_hms(2017, month, day, 12, 0, 0).unwrap();
        Thermal::new(
            flight,
            0,
            vec![
                Fix::new(46.0, 8.0, 1000.0, t0),
                Fix::new(46.0, 8.001, 1000.0 + rate * 100.0, t0 + Duration::seconds(100)),
            ],
        )
    }

    fn logbook() -> (Logbook, FlightId, FlightId) {
        let date = NaiveDate::from_ymd_opt(2017, 6, 1).unwrap();
        let mut logbook = Logbook::new();
        let ventus = logbook.add_flight(Flight::new(date, "A", "Ventus"));
        let astir = logbook.add_flight(Flight::new(date, "B", "Astir"));
        (logbook, ventus, astir)
    }

    #[test]
    fn strengths_land_in_nearest_bucket() {
        let (logbook, ventus, _) = logbook();
        let thermals = vec![
            thermal(ventus, 6, 1, 2.6),
            thermal(ventus, 6, 2, 1.1),
            thermal(ventus, 6, 3, 1.4),
        ];
        let categorizer = Categorizer::new(CategoryRules::with_fields(vec![SortingField::ThermalStrength]));
        let forest = categorizer.categorize(&logbook, thermals, &mut CountingTitles);

        let titles: Vec<&str> = forest
            .roots()
            .iter()
            .filter_map(|id| forest.category(*id))
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["1.0", "1.5", "2.5"]);
    }

    #[test]
    fn values_in_one_bucket_share_a_category() {
        let (logbook, ventus, astir) = logbook();
        let thermals = vec![
            thermal(ventus, 6, 1, 1.1),
            thermal(astir, 6, 2, 0.9),
            thermal(ventus, 6, 3, 1.2),
        ];
        let categorizer = Categorizer::new(CategoryRules::with_fields(vec![SortingField::ThermalStrength]));
        let forest = categorizer.categorize(&logbook, thermals, &mut CountingTitles);

        assert_eq!(forest.len(), 1);
        let bucket = forest.category(forest.roots()[0]).unwrap();
        assert_eq!(bucket.title, "1.0");
        assert_eq!(bucket.handle, "1.0 (3)");
    }

    #[test]
    fn deeper_levels_reopen_under_new_parent() {
        let (logbook, ventus, astir) = logbook();
        // same month title under two different gliders
        let thermals = vec![thermal(ventus, 6, 1, 1.0), thermal(astir, 6, 2, 1.0)];
        let categorizer = Categorizer::new(CategoryRules::with_fields(vec![
            SortingField::Glider,
            SortingField::Month,
        ]));
        let forest = categorizer.categorize(&logbook, thermals, &mut CountingTitles);

        assert_eq!(forest.roots().len(), 2);
        assert_eq!(forest.len(), 4);
        for root in forest.roots() {
            let category = forest.category(*root).unwrap();
            assert_eq!(category.children().len(), 1);
            let month = forest.category(category.children()[0]).unwrap();
            assert_eq!(month.title, "June");
            assert_eq!(month.parent, Some(*root));
            assert_eq!(month.thermals().len(), 1);
        }
        let first = forest.category(forest.roots()[0]).unwrap();
        assert_eq!(first.title, "Astir");
        assert_eq!(first.handle, "Astir (1)");
    }

    #[test]
    fn ties_fall_back_to_start_time() {
        let (logbook, ventus, _) = logbook();
        let thermals = vec![
            thermal(ventus, 7, 9, 1.0),
            thermal(ventus, 7, 2, 1.0),
            thermal(ventus, 7, 5, 1.0),
        ];
        let categorizer = Categorizer::new(CategoryRules::with_fields(vec![SortingField::Month]));
        let sorted = categorizer.sort(&logbook, thermals);
        let days: Vec<u32> = sorted.iter().map(|k| chrono::Datelike::day(&k.start)).collect();
        assert_eq!(days, vec![2, 5, 9]);
    }

    #[test]
    fn empty_input_gives_empty_forest() {
        let (logbook, _, _) = logbook();
        let forest = Categorizer::default().categorize(&logbook, Vec::new(), &mut CountingTitles);
        assert!(forest.is_empty());
        assert_eq!(forest.thermal_count(), 0);
    }

    #[test]
    fn no_fields_gives_empty_forest() {
        let (logbook, ventus, _) = logbook();
        let categorizer = Categorizer::new(CategoryRules::with_fields(Vec::new()));
        let forest = categorizer.categorize(&logbook, vec![thermal(ventus, 6, 1, 1.0)], &mut CountingTitles);
        assert!(forest.is_empty());
    }

    #[test]
    fn thermals_of_unknown_flights_are_skipped() {
        let (logbook, ventus, _) = logbook();
        let thermals = vec![thermal(ventus, 6, 1, 1.0), thermal(FlightId(42), 6, 1, 1.0)];
        let categorizer = Categorizer::new(CategoryRules::with_fields(vec![SortingField::Glider]));
        let forest = categorizer.categorize(&logbook, thermals, &mut CountingTitles);
        assert_eq!(forest.thermal_count(), 1);
    }
}
