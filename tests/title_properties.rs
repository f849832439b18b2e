// Properties of title normalization, checked over generated input and
// against both store backends.

use moviedb_cli::store::{normalize_title, open_store, Backend};
use proptest::prelude::*;
use proptest::test_runner::Config;
use tempfile::tempdir;

/// Respell `title` with some letters case-flipped and extra outer spaces.
fn respell(title: &str, flips: &[bool], lead: usize, trail: usize) -> String {
    let body: String = title
        .chars()
        .zip(flips.iter().cycle())
        .map(|(c, flip)| match (flip, c.is_ascii_uppercase()) {
            (false, _) => c,
            (true, true) => c.to_ascii_lowercase(),
            (true, false) => c.to_ascii_uppercase(),
        })
        .collect();
    format!("{}{}{}", " ".repeat(lead), body, " ".repeat(trail))
}

proptest! {
    #![proptest_config(Config::with_cases(512))]

    #[test]
    fn normalize_title_is_a_fixed_point(raw in any::<String>()) {
        let once = normalize_title(&raw);
        prop_assert_eq!(normalize_title(&once), once);
    }

    #[test]
    fn normalize_title_keeps_no_outer_whitespace(raw in "\\s{0,3}\\PC{0,20}\\s{0,3}") {
        let once = normalize_title(&raw);
        prop_assert_eq!(once.trim(), once.as_str());
    }
}

proptest! {
    #![proptest_config(Config::with_cases(32))]

    #[test]
    fn one_add_succeeds_among_respellings(
        title in "[A-Za-z][A-Za-z0-9:' -]{0,20}",
        spellings in prop::collection::vec(
            (prop::collection::vec(any::<bool>(), 1..8), 0usize..3, 0usize..3),
            1..6,
        ),
    ) {
        for backend in [Backend::Sqlite, Backend::Json] {
            let dir = tempdir().unwrap();
            let store = open_store(backend, dir.path());
            store.initialize().unwrap();

            let mut successes = usize::from(store.add(&title, 2000, 7.0, None).unwrap());
            for (flips, lead, trail) in &spellings {
                let variant = respell(&title, flips, *lead, *trail);
                successes += usize::from(store.add(&variant, 2001, 1.0, None).unwrap());
            }
            prop_assert_eq!(successes, 1, "{:?}", backend);

            let catalog = store.list().unwrap();
            prop_assert_eq!(catalog.len(), 1, "{:?}", backend);
            prop_assert_eq!(catalog[&normalize_title(&title)].year, 2000);
        }
    }
}
