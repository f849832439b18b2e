//! Input checks for the interactive prompts, plus the edit distance used
//! to suggest titles when a search comes back empty.

use crate::store::normalize_title;
use strsim::levenshtein;

/// Characters allowed in a movie name besides letters, digits and spaces.
const NAME_PUNCTUATION: &[char] = &[':', '\'', '-', '!', '?', '.', ',', '&'];

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 10.0;

/// Accept a non-empty name made of letters, digits, whitespace and common
/// punctuation. Returns it in normalized title form.
pub fn validate_name(input: &str) -> Result<String, String> {
    let name = input.trim();
    if name.is_empty() {
        return Err("Please enter a non-empty movie name.".into());
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_alphanumeric() || c.is_whitespace() || NAME_PUNCTUATION.contains(c)))
    {
        return Err(format!("'{bad}' is not allowed in a movie name."));
    }
    Ok(normalize_title(name))
}

/// Accept a number between 1 and 10 inclusive.
pub fn validate_rating(input: &str) -> Result<f64, String> {
    let rating: f64 = input
        .trim()
        .parse()
        .map_err(|_| "Rating must be a number between 1 and 10.".to_string())?;
    if rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err("Rating must be a number between 1 and 10.".into())
    }
}

/// Titles within `max_distance` edits of `query`, closest first.
pub fn suggestions<'a, I>(query: &str, titles: I, max_distance: usize) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    let query = query.trim().to_lowercase();
    let mut close: Vec<(usize, &str)> = titles
        .into_iter()
        .map(|t| (levenshtein(&t.to_lowercase(), &query), t.as_str()))
        .filter(|(d, _)| *d <= max_distance)
        .collect();
    close.sort();
    close.into_iter().map(|(_, t)| t).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed_and_title_cased() {
        assert_eq!(validate_name("  the matrix ").unwrap(), "The Matrix");
        assert_eq!(validate_name("Who's Afraid? Part 2").unwrap(), "Who'S Afraid? Part 2");
    }

    #[test]
    fn name_rejects_empty_and_odd_characters() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("drop table;").is_err());
        assert!(validate_name("<script>").is_err());
    }

    #[test]
    fn rating_bounds() {
        assert_eq!(validate_rating("7.5"), Ok(7.5));
        assert_eq!(validate_rating(" 1 "), Ok(1.0));
        assert_eq!(validate_rating("10"), Ok(10.0));
        assert!(validate_rating("0.9").is_err());
        assert!(validate_rating("10.1").is_err());
        assert!(validate_rating("NaN").is_err());
        assert!(validate_rating("seven").is_err());
    }

    #[test]
    fn suggestions_are_case_insensitive_and_sorted() {
        let titles = vec![
            "Titanic".to_string(),
            "Titan".to_string(),
            "The Godfather".to_string(),
        ];
        assert_eq!(suggestions("titanik", &titles, 5), vec!["Titanic", "Titan"]);
        assert!(suggestions("zzzzzzzzzzzzzzz", &titles, 5).is_empty());
    }

    #[test]
    fn accented_titles_count_one_edit_per_char() {
        let titles = vec!["Amélie".to_string(), "Amadeus".to_string()];
        assert_eq!(suggestions("amelie", &titles, 1), vec!["Amélie"]);
        assert_eq!(suggestions(" AMÉLIE ", &titles, 0), vec!["Amélie"]);
    }
}
