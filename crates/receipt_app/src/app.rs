use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use chrono::Local;
use pipeline_logging::pipeline_info;
use receipt_core::{update, AppState, EntryStatus, LoopOptions, Msg, SourceFile};
use receipt_engine::{
    export_filename, to_delimited_text, AtomicFileWriter, Delimiter, ExtractSettings,
};

use crate::effects::{record_to_fields, EffectRunner};
use crate::persistence;

pub struct CliOptions {
    pub auto_start: bool,
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

impl CliOptions {
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut auto_start = true;
        let mut output_dir = PathBuf::from("output");
        let mut files = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--manual-start" => auto_start = false,
                "--output-dir" => {
                    let value = args
                        .next()
                        .ok_or_else(|| "missing value for --output-dir".to_string())?;
                    output_dir = PathBuf::from(value);
                }
                _ if arg.starts_with("--") => return Err(format!("unknown flag {arg}")),
                _ => files.push(PathBuf::from(arg)),
            }
        }
        if files.is_empty() {
            return Err("no receipt files given".to_string());
        }
        Ok(Self {
            auto_start,
            output_dir,
            files,
        })
    }
}

pub fn run(options: CliOptions) -> Result<(), Box<dyn Error>> {
    let sources = load_source_files(&options.files)?;

    let settings = ExtractSettings {
        api_key: std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty()),
        ..ExtractSettings::default()
    };

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(settings, options.output_dir.clone(), msg_tx.clone());

    let mut state = AppState::with_options(LoopOptions {
        auto_start: options.auto_start,
    });

    let restored = persistence::load_records(&options.output_dir);
    if !restored.is_empty() {
        state = dispatch(state, Msg::RestoreRecords(restored), &runner);
    }

    state = dispatch(state, Msg::FilesSubmitted(sources), &runner);
    if !options.auto_start {
        state = dispatch(state, Msg::StartClicked, &runner);
    }

    // Pump engine completions and timer messages until the queue settles:
    // every entry terminal, nothing in flight.
    loop {
        let view = state.view();
        if view.queued == 0 && view.processing == 0 {
            break;
        }
        if let Some(msg) = runner.poll_engine() {
            state = dispatch(state, msg, &runner);
            continue;
        }
        if let Ok(msg) = msg_rx.recv_timeout(Duration::from_millis(20)) {
            state = dispatch(state, msg, &runner);
        }
    }

    // Banner timers may still be pending; they only affect display state.
    while let Ok(msg) = msg_rx.try_recv() {
        state = dispatch(state, msg, &runner);
    }

    report(&state, &options.output_dir)
}

fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (mut state, effects) = update(state, msg);
    runner.run(effects);
    state.consume_dirty();
    state
}

fn load_source_files(paths: &[PathBuf]) -> Result<Vec<SourceFile>, Box<dyn Error>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = fs::read(path)
            .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        sources.push(SourceFile::new(name, media_type_for(path), bytes));
    }
    Ok(sources)
}

// Inbound filtering is by convention only; the core accepts any bytes.
fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

fn report(state: &AppState, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let view = state.view();
    let mut failed = 0usize;
    for entry in &view.entries {
        match entry.status {
            EntryStatus::Error => {
                failed += 1;
                eprintln!(
                    "{}: error: {}",
                    entry.filename,
                    entry.error.as_deref().unwrap_or("unknown")
                );
            }
            status => pipeline_info!("{}: {}", entry.filename, status),
        }
    }
    pipeline_info!(
        "{} of {} entries processed",
        view.entries.len() - failed,
        view.entries.len()
    );

    let records: Vec<_> = state
        .records_snapshot()
        .iter()
        .map(record_to_fields)
        .collect();
    let csv = to_delimited_text(&records, Delimiter::Comma);
    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    let path = writer.write(&export_filename(Local::now().date_naive()), csv.as_bytes())?;
    pipeline_info!("wrote export to {:?}", path);

    // Tab-delimited snapshot on stdout, ready to pipe to a clipboard tool.
    println!("{}", to_delimited_text(&records, Delimiter::Tab));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::CliOptions;

    #[test]
    fn cli_parses_flags_and_files() {
        let options = CliOptions::from_args(
            ["--manual-start", "--output-dir", "out", "a.pdf", "b.png"]
                .iter()
                .map(|s| s.to_string()),
        )
        .unwrap();
        assert!(!options.auto_start);
        assert_eq!(options.output_dir.to_str(), Some("out"));
        assert_eq!(options.files.len(), 2);
    }

    #[test]
    fn cli_rejects_empty_file_list() {
        assert!(CliOptions::from_args(std::iter::empty()).is_err());
    }

    #[test]
    fn cli_rejects_unknown_flags() {
        let result = CliOptions::from_args(["--retry", "a.pdf"].iter().map(|s| s.to_string()));
        assert!(result.is_err());
    }
}
