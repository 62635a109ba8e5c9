//! Database schema definitions

/// SQL to create the sentences table
pub const CREATE_SENTENCES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sentences (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_path TEXT NOT NULL,
    sentence_text TEXT NOT NULL,
    embedding BLOB NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_sentences_source ON sentences(source_path)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_SENTENCES_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
