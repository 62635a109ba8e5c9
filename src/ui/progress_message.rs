#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProgressPhase {
    Extracting,
    Embedding,
}

#[derive(Clone, Debug)]
pub enum ProgressMessage {
    Started {
        phase: ProgressPhase,
        total: usize,
    },
    Progress {
        phase: ProgressPhase,
        current: usize,
        file: Option<String>,
    },
    Finished {
        phase: ProgressPhase,
    },
    Error(String),
}
