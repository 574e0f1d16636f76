//! podtail - Entry Point

use clap::Parser;
use podtail::config::{self, CliOverrides, ResolvedConfig};
use podtail::model::{AppError, Record};
use podtail::parser::ParserKind;
use podtail::source::{KubectlSource, LogSource, ReplaySource};
use podtail::state::LogView;
use podtail::tailer::{LogTailer, RecordBatcher, TailTarget};
use podtail::view_state::{EntryIndex, ViewportDimensions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// podtail - follow a pod's log across reconnects
#[derive(Parser, Debug)]
#[command(name = "podtail")]
#[command(version)]
#[command(about = "Tail a pod's log, reconnecting without duplicating or silently dropping lines")]
pub struct Args {
    /// Pod to tail (falls back to `pod` in the config file)
    pub pod: Option<String>,

    /// Namespace of the pod
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// History lines to fetch when the session starts
    #[arg(short, long)]
    pub tail: Option<usize>,

    /// Line parser
    #[arg(long, value_enum)]
    pub parser: Option<ParserKind>,

    /// Replay a local log file instead of running kubectl
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Minimum render width in columns
    #[arg(long, default_value_t = 120)]
    pub width: u16,

    /// Highlight occurrences of this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Print each record's raw line below its parsed form
    #[arg(long)]
    pub expand: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            pod: self.pod.clone(),
            namespace: self.namespace.clone(),
            tail_lines: self.tail,
            parser: self.parser,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = config::resolve(args.config.clone(), args.overrides())?;

    podtail::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let target = tail_target(&config, args.replay.as_deref())?;
    let source: Arc<dyn LogSource> = match &args.replay {
        Some(path) => Arc::new(ReplaySource::new(path)),
        None => Arc::new(KubectlSource::new(&config.kubectl).with_read_timeout(config.read_timeout)),
    };

    let mut tailer = LogTailer::new(source, target)
        .with_parser(config.parser.build())
        .with_config(config.tail_config());
    tailer.start();

    let mut batcher = RecordBatcher::new(tailer.read(), config.batch_config());
    let mut view = LogView::new(ViewportDimensions::new(args.width, 0));
    if let Some(search) = &args.search {
        view.set_search_text(search.clone());
    }

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => {
                info!("Interrupted, stopping tail session");
                tailer.stop().await?;
                return Ok(());
            }
            batch = batcher.next_batch() => match batch {
                Some(records) => print_batch(&mut view, records, args.expand)?,
                None => break,
            },
        }
    }

    // The queue closed on its own: the session ended, report why.
    tailer.wait().await?;
    Ok(())
}

/// Resolve the pod to tail. Replays without a pod are named after the file.
fn tail_target(config: &ResolvedConfig, replay: Option<&Path>) -> Result<TailTarget, AppError> {
    if let Some(target) = config.tail_target() {
        return Ok(target);
    }
    let pod = replay
        .and_then(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or(AppError::NoPod)?;
    Ok(TailTarget::new(config.namespace.clone(), pod).with_tail_lines(config.tail_lines))
}

/// Append a batch to the view and print the lines it added.
fn print_batch(view: &mut LogView, records: Vec<Record>, expand: bool) -> Result<(), AppError> {
    let first_entry = view.index().entry_count();
    let first_line = view.index().line_count();

    view.append(records);
    if expand {
        for entry in first_entry..view.index().entry_count() {
            view.set_expanded(EntryIndex::new(entry), true);
        }
    }

    let total = view.index().line_count();
    let mut out = std::io::stdout().lock();
    for line in view.render_lines(first_line..total) {
        writeln!(out, "{}", line.to_string().trim_end())?;
    }
    out.flush()?;
    Ok(())
}
