// UI layer: the interactive menu built on `dialoguer`.
// Every action lists or writes through the store it is given; OMDb is only
// consulted when adding a movie.

use crate::api::{Lookup, OmdbClient};
use crate::config::AppConfig;
use crate::stats;
use crate::store::{MovieStore, StoreError};
use crate::validate::{suggestions, validate_name, validate_rating};
use crate::website::generate_website;
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const MENU: [&str; 10] = [
    "Exit",
    "List movies",
    "Add movie",
    "Delete movie",
    "Update movie",
    "Stats",
    "Random movie",
    "Search movie",
    "Movies sorted by rating",
    "Generate website",
];

/// Maximum edit distance for "did you mean" suggestions.
const SUGGESTION_DISTANCE: usize = 5;

/// Everything a menu action needs.
pub struct Session<'a> {
    pub store: &'a dyn MovieStore,
    pub omdb: &'a OmdbClient,
    pub config: &'a AppConfig,
}

/// Main interactive menu. Runs until the user picks "Exit".
///
/// Storage failures are reported and the loop continues. Anything else
/// escaping an action is a prompt failure (closed terminal, interrupted
/// input) and ends the session.
pub fn main_menu(session: &Session<'_>) -> Result<()> {
    println!("{}", "********** My Movies Database **********".bold());
    println!();
    loop {
        let selection = Select::new()
            .with_prompt("Menu")
            .items(&MENU)
            .default(1)
            .interact()?;
        if selection == 0 {
            println!("Bye!");
            break;
        }
        let outcome = match selection {
            1 => list_movies(session),
            2 => add_movie(session),
            3 => delete_movie(session),
            4 => update_movie(session),
            5 => print_stats(session),
            6 => random_movie(session),
            7 => search_movie(session),
            8 => sorted_by_rating(session),
            9 => website(session),
            _ => Ok(()),
        };
        if let Err(err) = outcome {
            if err.downcast_ref::<StoreError>().is_none() {
                return Err(err);
            }
            err_msg(&format!("{err:#}"));
        }
        println!();
        Input::<String>::new()
            .with_prompt("Press Enter to continue")
            .allow_empty(true)
            .interact_text()?;
        println!();
    }
    Ok(())
}

fn err_msg(msg: &str) {
    println!("{}", msg.red());
}

fn prompt_name(prompt: &str) -> Result<String> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| validate_name(input).map(|_| ()))
        .interact_text()?;
    validate_name(&raw).map_err(anyhow::Error::msg)
}

fn list_movies(session: &Session<'_>) -> Result<()> {
    let movies = session.store.list()?;
    println!("{} movies in total", movies.len());
    for (title, info) in stats::sorted_by_title(&movies) {
        println!("{} ({}): {:.2}", title, info.year, info.rating);
    }
    Ok(())
}

/// Look the title up on OMDb, then store what came back.
fn add_movie(session: &Session<'_>) -> Result<()> {
    let name = prompt_name("Enter new movie name")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("Looking up '{name}' on OMDb..."));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let lookup = session.omdb.lookup(&name);
    spinner.finish_and_clear();

    let movie = match lookup {
        Ok(Lookup::Found(movie)) => movie,
        Ok(Lookup::NotFound) => {
            err_msg(&format!("Movie '{name}' not found on OMDb."));
            return Ok(());
        }
        Err(e) => {
            err_msg(&format!("OMDb is not available: {e}"));
            return Ok(());
        }
    };
    let Some(rating) = movie.rating else {
        err_msg(&format!("'{}' has no rating on OMDb yet, not added.", movie.title));
        return Ok(());
    };

    let added = session
        .store
        .add(&movie.title, movie.year, rating, Some(movie.poster.as_str()))
        .with_context(|| format!("Could not add '{}'", movie.title))?;
    if added {
        println!("Movie '{}' ({}) added with rating {:.2}.", movie.title, movie.year, rating);
    } else {
        err_msg("Movie already exists!");
    }
    Ok(())
}

fn delete_movie(session: &Session<'_>) -> Result<()> {
    let name = prompt_name("Enter the name of the movie to delete")?;
    if session
        .store
        .delete(&name)
        .with_context(|| format!("Could not delete '{name}'"))?
    {
        println!("Movie '{name}' successfully deleted.");
    } else {
        err_msg("Movie doesn't exist!");
    }
    Ok(())
}

fn update_movie(session: &Session<'_>) -> Result<()> {
    let name = prompt_name("Enter the name of the movie to update")?;
    let raw: String = Input::new()
        .with_prompt("Enter a new movie rating (1-10)")
        .validate_with(|input: &String| validate_rating(input).map(|_| ()))
        .interact_text()?;
    let rating = validate_rating(&raw).map_err(anyhow::Error::msg)?;
    if session
        .store
        .update(&name, rating)
        .with_context(|| format!("Could not update '{name}'"))?
    {
        println!("Movie '{name}' updated successfully.");
    } else {
        err_msg("Movie doesn't exist!");
    }
    Ok(())
}

fn print_stats(session: &Session<'_>) -> Result<()> {
    let movies = session.store.list()?;
    let Some(s) = stats::rating_stats(&movies) else {
        err_msg("No movies in the database yet.");
        return Ok(());
    };
    println!("Average rating: {:.2}", s.average);
    println!("Median rating: {:.2}", s.median);
    println!("{}: {}, {:.2}", plural("Best movie", s.best.len()), s.best.join(", "), s.best_rating);
    println!("{}: {}, {:.2}", plural("Worst movie", s.worst.len()), s.worst.join(", "), s.worst_rating);
    Ok(())
}

fn plural(label: &str, n: usize) -> String {
    if n > 1 {
        format!("{label}s")
    } else {
        label.to_string()
    }
}

fn random_movie(session: &Session<'_>) -> Result<()> {
    let movies = session.store.list()?;
    match stats::random_pick(&movies, &mut rand::thread_rng()) {
        Some((title, info)) => println!("Your movie for tonight: {title}, it's rated {:.2}", info.rating),
        None => err_msg("No movies in the database yet."),
    }
    Ok(())
}

fn search_movie(session: &Session<'_>) -> Result<()> {
    let movies = session.store.list()?;
    let query: String = Input::new()
        .with_prompt("Enter part of movie name")
        .interact_text()?;

    let hits = stats::search(&movies, &query);
    if !hits.is_empty() {
        for (title, info) in hits {
            println!("{title} ({}): {:.2}", info.year, info.rating);
        }
        return Ok(());
    }

    let close = suggestions(&query, movies.keys(), SUGGESTION_DISTANCE);
    if close.is_empty() {
        err_msg("No movies found matching your search.");
    } else {
        println!("The movie \"{}\" does not exist. Did you mean:", query.trim());
        for title in close {
            println!("  {title}");
        }
    }
    Ok(())
}

fn sorted_by_rating(session: &Session<'_>) -> Result<()> {
    let movies = session.store.list()?;
    for (title, info) in stats::sorted_by_rating(&movies) {
        println!("{title} ({}): {:.2}", info.year, info.rating);
    }
    Ok(())
}

fn website(session: &Session<'_>) -> Result<()> {
    let movies = session.store.list()?;
    match generate_website(session.config, &movies) {
        Ok(path) => println!("Website was generated successfully: {}", path.display()),
        Err(e) => err_msg(&format!("Website generation failed: {e:#}")),
    }
    Ok(())
}
