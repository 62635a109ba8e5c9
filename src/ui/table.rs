use crate::query::SearchResult;
use crate::storage::StoreStats;
use crate::ui::output::{file_name, preview};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct StoreRow {
    #[tabled(rename = "Database")]
    database: String,
    #[tabled(rename = "Documents")]
    documents: usize,
    #[tabled(rename = "Sentences")]
    sentences: usize,
    #[tabled(rename = "Dimension")]
    dimension: usize,
    #[tabled(rename = "Model")]
    model: String,
}

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Document")]
    document: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Sentence")]
    sentence: String,
}

/// One-row summary of a sentence store
pub fn store_table(db_path: &Path, stats: &StoreStats, model: &str) -> String {
    let row = StoreRow {
        database: db_path.display().to_string(),
        documents: stats.sources,
        sentences: stats.records,
        dimension: stats.embedding_dim,
        model: model.to_string(),
    };
    Table::new([row]).with(Style::rounded()).to_string()
}

/// Ranked search hits, one row per document; empty when nothing matched
pub fn results_table(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let rows = results.iter().enumerate().map(|(idx, res)| MatchRow {
        rank: idx + 1,
        document: file_name(&res.source_path),
        distance: format!("{:.4}", res.distance),
        sentence: preview(&res.sentence_text),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}
