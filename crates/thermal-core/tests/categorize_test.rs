//! Categorization properties across many flights.

use std::cmp::Ordering;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thermal_core::{
    compare_keyed, CategoryForest, CategoryId, CategoryRules, Categorizer, CountingTitles, Fix,
    Flight, FlightId, Logbook, SortingField, Thermal,
};

const GLIDERS: [&str; 4] = ["ASW 28", "Discus 2", "LS4", "Ventus 2c"];

fn random_batch(rng: &mut StdRng, count: usize) -> (Logbook, Vec<Thermal>) {
    let mut logbook = Logbook::new();
    let ids: Vec<FlightId> = GLIDERS
        .iter()
        .map(|glider| {
            logbook.add_flight(Flight::new(
                NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
                "pilot",
                *glider,
            ))
        })
        .collect();

    let thermals = (0..count)
        .map(|_| {
            let t0 = Utc
                .with_ymd_and_hms(
                    rng.random_range(2014..2018),
                    rng.random_range(1..=12),
                    rng.random_range(1..=28),
                    rng.random_range(9..18),
                    rng.random_range(0..60),
                    0,
                )
                .unwrap();
            let duration_s = rng.random_range(60..600);
            let climb_m = rng.random_range(50.0..1500.0);
            let flight = ids[rng.random_range(0..ids.len())];
            Thermal::new(
                flight,
                0,
                vec![
                    Fix::new(44.0, 5.0, 700.0, t0),
                    Fix::new(44.002, 5.001, 700.0 + climb_m, t0 + Duration::seconds(duration_s)),
                ],
            )
        })
        .collect();
    (logbook, thermals)
}

fn leaf_total(forest: &CategoryForest<String>, id: CategoryId) -> usize {
    let category = forest.category(id).unwrap();
    if category.children().is_empty() {
        category.thermals().len()
    } else {
        assert!(category.thermals().is_empty(), "inner category holds thermals");
        category.children().iter().map(|child| leaf_total(forest, *child)).sum()
    }
}

fn depth(forest: &CategoryForest<String>, id: CategoryId) -> usize {
    let mut depth = 1;
    let mut current = forest.category(id).unwrap();
    while let Some(parent) = current.parent {
        depth += 1;
        current = forest.category(parent).unwrap();
    }
    depth
}

#[test]
fn categorization_preserves_cardinality() {
    let mut rng = StdRng::seed_from_u64(2017);
    let field_sets = [
        vec![SortingField::ThermalStrength, SortingField::Month],
        vec![SortingField::Year, SortingField::Month, SortingField::Glider],
        vec![SortingField::Glider, SortingField::ThermalClimb],
        vec![SortingField::ThermalClimb],
    ];

    for fields in field_sets {
        let (logbook, thermals) = random_batch(&mut rng, 120);
        let categorizer = Categorizer::new(CategoryRules::with_fields(fields.clone()));
        let forest = categorizer.categorize(&logbook, thermals, &mut CountingTitles);

        assert_eq!(forest.thermal_count(), 120);
        let leaves: usize = forest.roots().iter().map(|root| leaf_total(&forest, *root)).sum();
        assert_eq!(leaves, 120);

        for index in 0..forest.len() {
            let id = CategoryId(index);
            let category = forest.category(id).unwrap();
            let level = depth(&forest, id);
            assert_eq!(category.field, fields[level - 1]);
            if category.children().is_empty() {
                assert_eq!(level, fields.len(), "leaf above the deepest level");
            }
            assert_eq!(
                category.handle,
                format!("{} ({})", category.title, forest.total_thermals(id))
            );
        }
    }
}

#[test]
fn sibling_titles_are_unique() {
    let mut rng = StdRng::seed_from_u64(99);
    let (logbook, thermals) = random_batch(&mut rng, 200);
    let categorizer = Categorizer::new(CategoryRules::with_fields(vec![
        SortingField::Month,
        SortingField::ThermalStrength,
    ]));
    let forest = categorizer.categorize(&logbook, thermals, &mut CountingTitles);

    let mut sibling_groups: Vec<Vec<CategoryId>> = vec![forest.roots().to_vec()];
    for index in 0..forest.len() {
        sibling_groups.push(forest.category(CategoryId(index)).unwrap().children().to_vec());
    }
    for group in sibling_groups {
        let mut titles: Vec<&str> = group
            .iter()
            .map(|id| forest.category(*id).unwrap().title.as_str())
            .collect();
        let before = titles.len();
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(titles.len(), before, "a key was split across sibling categories");
    }
}

#[test]
fn months_sort_chronologically_not_alphabetically() {
    let mut rng = StdRng::seed_from_u64(5);
    let (logbook, thermals) = random_batch(&mut rng, 150);
    let categorizer = Categorizer::new(CategoryRules::with_fields(vec![SortingField::Month]));
    let forest = categorizer.categorize(&logbook, thermals, &mut CountingTitles);

    let titles: Vec<&str> = forest
        .roots()
        .iter()
        .map(|id| forest.category(*id).unwrap().title.as_str())
        .collect();
    let expected = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];
    let positions: Vec<usize> = titles
        .iter()
        .map(|title| expected.iter().position(|m| m == title).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn composite_order_is_transitive() {
    let mut rng = StdRng::seed_from_u64(31);
    let (logbook, thermals) = random_batch(&mut rng, 60);
    let categorizer = Categorizer::new(CategoryRules::with_fields(vec![
        SortingField::Glider,
        SortingField::ThermalStrength,
    ]));
    let sorted = categorizer.sort(&logbook, thermals);

    for pair in sorted.windows(2) {
        assert_ne!(compare_keyed(&pair[0], &pair[1]), Ordering::Greater);
    }
    for a in &sorted {
        for b in &sorted {
            if compare_keyed(a, b) == Ordering::Greater {
                continue;
            }
            for c in &sorted {
                if compare_keyed(b, c) != Ordering::Greater {
                    assert_ne!(compare_keyed(a, c), Ordering::Greater);
                }
            }
        }
    }
}

#[test]
fn equal_keys_keep_input_order() {
    let t0 = Utc.with_ymd_and_hms(2015, 5, 5, 12, 0, 0).unwrap();
    let mut logbook = Logbook::new();
    let date = NaiveDate::from_ymd_opt(2015, 5, 5).unwrap();
    let ids: Vec<FlightId> = (0..5)
        .map(|_| logbook.add_flight(Flight::new(date, "pilot", "Duo Discus")))
        .collect();

    let thermals: Vec<Thermal> = ids
        .iter()
        .rev()
        .map(|id| {
            Thermal::new(
                *id,
                0,
                vec![
                    Fix::new(44.0, 5.0, 700.0, t0),
                    Fix::new(44.0, 5.0, 900.0, t0 + Duration::seconds(100)),
                ],
            )
        })
        .collect();

    let categorizer = Categorizer::new(CategoryRules::with_fields(vec![SortingField::Glider]));
    let order: Vec<FlightId> = categorizer
        .sort(&logbook, thermals)
        .iter()
        .map(|keyed| keyed.thermal.flight_id())
        .collect();
    let expected: Vec<FlightId> = ids.into_iter().rev().collect();
    assert_eq!(order, expected);
}
