//! Read-only views over a listed catalog: rating statistics, sorting,
//! search and random picks.

use crate::store::{Catalog, MovieInfo};
use rand::seq::IteratorRandom;
use rand::Rng;

/// Summary shown by the "Stats" menu entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingStats {
    pub average: f64,
    pub median: f64,
    pub best: Vec<String>,
    pub best_rating: f64,
    pub worst: Vec<String>,
    pub worst_rating: f64,
}

/// Compute the stats, or `None` for an empty catalog.
pub fn rating_stats(catalog: &Catalog) -> Option<RatingStats> {
    let ratings: Vec<f64> = catalog.values().map(|m| m.rating).collect();
    let (best, best_rating) = extreme(catalog, |a, b| a > b)?;
    let (worst, worst_rating) = extreme(catalog, |a, b| a < b)?;
    Some(RatingStats {
        average: average(&ratings)?,
        median: median(&ratings)?,
        best,
        best_rating,
        worst,
        worst_rating,
    })
}

pub fn average(ratings: &[f64]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

/// Middle rating; the mean of the two middle ones for an even count.
pub fn median(ratings: &[f64]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let mut sorted = ratings.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// All titles sharing the rating that wins under `better`, sorted by title.
fn extreme<F>(catalog: &Catalog, better: F) -> Option<(Vec<String>, f64)>
where
    F: Fn(f64, f64) -> bool,
{
    let target = catalog
        .values()
        .map(|m| m.rating)
        .reduce(|acc, r| if better(r, acc) { r } else { acc })?;
    let mut titles: Vec<String> = catalog
        .iter()
        .filter(|(_, m)| m.rating == target)
        .map(|(t, _)| t.clone())
        .collect();
    titles.sort();
    Some((titles, target))
}

/// Movies by rating, highest first; equal ratings ordered by title.
pub fn sorted_by_rating(catalog: &Catalog) -> Vec<(&String, &MovieInfo)> {
    let mut movies: Vec<_> = catalog.iter().collect();
    movies.sort_by(|a, b| b.1.rating.total_cmp(&a.1.rating).then_with(|| a.0.cmp(b.0)));
    movies
}

/// Movies by title.
pub fn sorted_by_title(catalog: &Catalog) -> Vec<(&String, &MovieInfo)> {
    let mut movies: Vec<_> = catalog.iter().collect();
    movies.sort_by(|a, b| a.0.cmp(b.0));
    movies
}

/// Case-insensitive substring search over titles, sorted by title.
pub fn search<'a>(catalog: &'a Catalog, query: &str) -> Vec<(&'a String, &'a MovieInfo)> {
    let needle = query.trim().to_lowercase();
    sorted_by_title(catalog)
        .into_iter()
        .filter(|(title, _)| title.to_lowercase().contains(&needle))
        .collect()
}

/// One movie chosen uniformly at random.
pub fn random_pick<'a, R>(catalog: &'a Catalog, rng: &mut R) -> Option<(&'a String, &'a MovieInfo)>
where
    R: Rng + ?Sized,
{
    catalog.iter().choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog(entries: &[(&str, f64)]) -> Catalog {
        entries
            .iter()
            .enumerate()
            .map(|(i, (title, rating))| {
                (
                    title.to_string(),
                    MovieInfo {
                        year: 2000 + i as i32,
                        rating: *rating,
                        poster: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn empty_catalog_has_no_stats() {
        let empty = Catalog::new();
        assert_eq!(rating_stats(&empty), None);
        assert_eq!(median(&[]), None);
        assert!(random_pick(&empty, &mut StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn stats_with_ties() {
        let c = catalog(&[("Heat", 8.0), ("Alien", 8.0), ("Cats", 2.5), ("Up", 7.5)]);
        let stats = rating_stats(&c).unwrap();
        assert!((stats.average - 6.5).abs() < 1e-9);
        assert!((stats.median - 7.75).abs() < 1e-9);
        assert_eq!(stats.best, vec!["Alien", "Heat"]);
        assert_eq!(stats.best_rating, 8.0);
        assert_eq!(stats.worst, vec!["Cats"]);
        assert_eq!(stats.worst_rating, 2.5);
    }

    #[test]
    fn median_of_odd_count() {
        assert_eq!(median(&[9.0, 1.0, 5.0]), Some(5.0));
    }

    #[test]
    fn sorting_and_search() {
        let c = catalog(&[("The Matrix", 8.7), ("Matrix Reloaded", 7.2), ("Heat", 8.7)]);
        let by_rating: Vec<&str> = sorted_by_rating(&c).into_iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(by_rating, vec!["Heat", "The Matrix", "Matrix Reloaded"]);

        let hits: Vec<&str> = search(&c, " MATRIX").into_iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(hits, vec!["Matrix Reloaded", "The Matrix"]);
        assert!(search(&c, "godfather").is_empty());
    }

    #[test]
    fn random_pick_comes_from_catalog() {
        let c = catalog(&[("Heat", 8.0), ("Alien", 8.4)]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let (title, _) = random_pick(&c, &mut rng).unwrap();
            assert!(c.contains_key(title));
        }
    }
}
