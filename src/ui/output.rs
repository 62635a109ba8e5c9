use crate::query::SearchResult;
use crate::ui::table::results_table;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;
use std::path::Path;

/// Sentence previews are cut to this many characters
const PREVIEW_CHARS: usize = 70;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

/// Print ranked matches: distinct files first, then the matching sentences
pub fn search_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("{} No relevant files found.", Icons::CROSS);
        return;
    }

    section(" Top Relevant Files ");
    for res in results {
        println!(
            "{} {} {}",
            Icons::FILE,
            res.source_path.style(theme().path.clone()),
            format!("({:.4})", res.distance).style(theme().for_distance(res.distance).clone())
        );
    }

    section(" Top Matching Sentences ");
    println!("{}", results_table(results));
}

/// Final path component, or the whole path when there is none
pub(crate) fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Cut a sentence to a fixed number of characters for display
pub(crate) fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut)
}
