use crate::ui::progress_message::{ProgressMessage, ProgressPhase};
use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, MultiProgress, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::thread;
use std::time::Duration;

const BAR_TEMPLATE: &str = "{spinner:.green} {msg:<24} [{bar:30.cyan/blue}] {pos}/{len} ({eta})";

/// Renders indexing progress from messages sent by the extractor and the
/// ingestion pipeline.
pub struct ProgressManager {
    mp: MultiProgress,
    extracting: ProgressBar,
    embedding: ProgressBar,
    _handle: thread::JoinHandle<()>,
}

impl ProgressManager {
    pub fn new() -> (Self, crossbeam::channel::Sender<ProgressMessage>) {
        let (tx, rx) = crossbeam::channel::unbounded::<ProgressMessage>();

        let mp = MultiProgress::new();
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar());

        let extracting = bar(&mp, &style, "Extracting sentences");
        let embedding = bar(&mp, &style, "Vectorizing sentences");

        let extracting_clone = extracting.clone();
        let embedding_clone = embedding.clone();
        let mp_clone = mp.clone();

        let handle = thread::spawn(move || {
            for msg in rx {
                match msg {
                    ProgressMessage::Started { phase, total } => {
                        let pb = bar_for(phase, &extracting_clone, &embedding_clone);
                        pb.set_length(total as u64);
                        pb.enable_steady_tick(Duration::from_millis(100));
                    }
                    ProgressMessage::Progress { phase, current, file } => {
                        let pb = bar_for(phase, &extracting_clone, &embedding_clone);
                        pb.set_position(current as u64);
                        if let Some(ref f) = file {
                            pb.set_message(short_name(f));
                        }
                    }
                    ProgressMessage::Finished { phase } => {
                        bar_for(phase, &extracting_clone, &embedding_clone).finish_with_message("Done");
                    }
                    ProgressMessage::Error(e) => {
                        mp_clone.println(format!("{} {}", Icons::WARN, e)).ok();
                    }
                }
            }
        });

        (
            Self {
                mp,
                extracting,
                embedding,
                _handle: handle,
            },
            tx,
        )
    }

    pub fn clear(&self) {
        self.extracting.finish_and_clear();
        self.embedding.finish_and_clear();
        self.mp.clear().ok();
    }

    pub fn finish_with_summary(&self, duration: Duration, documents: usize, sentences: usize) {
        self.clear();
        println!();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Complete in {}", HumanDuration(duration)).style(theme().success.clone())
        );
        println!(
            "  {} {}  {} {}",
            Icons::FILE.style(theme().label.clone()),
            documents,
            Icons::SENTENCE.style(theme().label.clone()),
            sentences
        );
    }
}

fn bar(mp: &MultiProgress, style: &ProgressStyle, message: &'static str) -> ProgressBar {
    if !console::Term::stdout().is_term() {
        return ProgressBar::hidden();
    }
    mp.add(ProgressBar::new(0).with_style(style.clone()).with_message(message))
}

fn bar_for<'a>(phase: ProgressPhase, extracting: &'a ProgressBar, embedding: &'a ProgressBar) -> &'a ProgressBar {
    match phase {
        ProgressPhase::Extracting => extracting,
        ProgressPhase::Embedding => embedding,
    }
}

fn short_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        if console::Term::stdout().is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Self { pb }
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}
