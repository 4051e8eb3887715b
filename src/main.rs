use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use project_import::{
    metadata::JsonSidecar,
    ordering::PresentationEntry,
    pending,
    prompt::FilamentRow,
    resolve_project_load, ImportAction, ImportDecision, ImportDialogState, ImportPrompt,
    LoadType, MemoryConfig, PresetBundle, PromptContext, SelectionIndex, UserChoice,
};

#[derive(Parser, Debug)]
#[command(name = "project-import", about = "Decide how a project archive should be loaded")]
struct Cli {
    /// Project archive. Its pre-parsed metadata is read from `<archive>.json`.
    project: PathBuf,

    /// Preset bundle snapshot (JSON).
    #[arg(long)]
    presets: Option<PathBuf>,

    /// Application settings (JSON object of strings).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Load behaviour overriding the configured one: load_geometry, always_ask, open_project.
    #[arg(long)]
    mode: Option<String>,
}

#[derive(Debug, Serialize)]
struct Outcome {
    load_type: LoadType,
    decision: Option<ImportDecision>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<MemoryConfig> {
    let path = match path {
        Some(path) => path,
        None => match MemoryConfig::default_path().filter(|path| path.is_file()) {
            Some(path) => path,
            None => return Ok(MemoryConfig::new()),
        },
    };
    MemoryConfig::from_json_file(&path)
        .with_context(|| format!("loading settings from {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = load_config(cli.config)?;
    let bundle = match &cli.presets {
        Some(path) => PresetBundle::from_json_file(path)
            .with_context(|| format!("loading presets from {}", path.display()))?,
        None => PresetBundle::default(),
    };

    let stdin = io::stdin();
    let mut prompt = TerminalPrompt::new(stdin.lock(), io::stderr());
    let slot = pending::global();

    let resolution = resolve_project_load(
        &cli.project,
        cli.mode.as_deref(),
        &JsonSidecar,
        &bundle,
        &mut prompt,
        &mut config,
        slot,
    );

    let outcome = Outcome {
        load_type: resolution.load_type,
        decision: slot.take_pending(),
    };
    if outcome.decision.is_none() {
        info!("Nothing to load");
    }

    serde_json::to_writer_pretty(io::stdout().lock(), &outcome)?;
    println!();
    Ok(())
}

/// Line-based prompt. Blank answers keep the shown default, `q` cancels.
struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

enum Answer {
    Default,
    Cancel,
    Text(String),
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_answer(&mut self, question: &str) -> io::Result<Answer> {
        write!(self.output, "{question} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Answer::Cancel);
        }
        Ok(match line.trim() {
            "" => Answer::Default,
            "q" | "Q" => Answer::Cancel,
            text => Answer::Text(text.to_string()),
        })
    }

    fn ask_yes_no(&mut self, question: &str) -> io::Result<Option<bool>> {
        loop {
            match self.read_answer(&format!("{question} [Y/n]"))? {
                Answer::Default => return Ok(Some(true)),
                Answer::Cancel => return Ok(None),
                Answer::Text(text) => match text.to_ascii_lowercase().as_str() {
                    "y" | "yes" => return Ok(Some(true)),
                    "n" | "no" => return Ok(Some(false)),
                    _ => writeln!(self.output, "Please answer y or n")?,
                },
            }
        }
    }

    /// `-` selects nothing; anything else must be a listed index.
    fn ask_index(
        &mut self,
        question: &str,
        default: SelectionIndex,
        valid: impl Fn(usize) -> bool,
    ) -> io::Result<Option<SelectionIndex>> {
        let shown = default
            .get()
            .map(|raw| raw.to_string())
            .unwrap_or_else(|| "-".to_string());
        loop {
            match self.read_answer(&format!("{question} [{shown}]"))? {
                Answer::Default => return Ok(Some(default)),
                Answer::Cancel => return Ok(None),
                Answer::Text(text) if text == "-" => return Ok(Some(SelectionIndex::NONE)),
                Answer::Text(text) => match text.parse::<usize>() {
                    Ok(raw) if valid(raw) => return Ok(Some(SelectionIndex::at(raw))),
                    _ => writeln!(self.output, "Not a listed entry: {text}")?,
                },
            }
        }
    }

    fn print_row(&mut self, row: &FilamentRow) -> io::Result<()> {
        writeln!(self.output, "Slot {} ({}):", row.slot, row.color)?;
        for (raw, entry) in row.choices.entries().iter().enumerate() {
            match entry {
                PresentationEntry::Header { caption } => writeln!(self.output, "  -- {caption} --")?,
                PresentationEntry::Selectable { label, group, .. } => match group {
                    Some(group) => writeln!(self.output, "  {raw:>3}  {label}  [{group}]")?,
                    None => writeln!(self.output, "  {raw:>3}  {label}")?,
                },
            }
        }
        Ok(())
    }

    fn run_dialog(&mut self, context: &PromptContext) -> io::Result<Option<UserChoice>> {
        let mut state = ImportDialogState::new(context);

        writeln!(self.output, "Please select an action for {}", context.file_name)?;
        for action in [ImportAction::OpenProject, ImportAction::LoadGeometry] {
            writeln!(self.output, "  {}  {}", action.code(), action.label())?;
        }
        let action = loop {
            match self.read_answer(&format!("Action [{}]", state.action().code()))? {
                Answer::Default => break state.action(),
                Answer::Cancel => return Ok(None),
                Answer::Text(text) => match text.parse::<u8>().ok().and_then(ImportAction::from_code) {
                    Some(action) => break action,
                    None => writeln!(self.output, "Not an action: {text}")?,
                },
            }
        };
        state.set_action(action);

        if state.shows_project_settings() {
            let Some(import) = self.ask_yes_no("Import project printer settings?")? else {
                return Ok(None);
            };
            state.set_import_printer_settings(import);
            if let Some(warning) = state.printer_warning() {
                writeln!(self.output, "Warning: {warning}")?;
            }
            if state.shows_printer_reassign() {
                for (raw, printer) in context.printers.entries().iter().enumerate() {
                    writeln!(self.output, "  {raw:>3}  {}  [{}]", printer.name, printer.group)?;
                }
                let count = context.printers.len();
                let Some(selection) = self.ask_index(
                    "Use printer:",
                    context.printers.default_selection(),
                    |raw| raw < count,
                )?
                else {
                    return Ok(None);
                };
                state.select_printer(selection);
            }

            let Some(import) = self.ask_yes_no("Import project filament settings?")? else {
                return Ok(None);
            };
            state.set_import_filament_settings(import);
            if state.shows_filament_mapping() {
                writeln!(self.output, "Map project colors to your filaments:")?;
                for row in &context.filament_rows {
                    self.print_row(row)?;
                    let Some(selection) = self.ask_index(
                        "Filament:",
                        row.default_selection,
                        |raw| raw < row.choices.len() && !row.choices.is_header_at(raw),
                    )?
                    else {
                        return Ok(None);
                    };
                    state.select_slot(row.slot, selection);
                }
            }
        }

        Ok(Some(state.confirm()))
    }
}

impl<R: BufRead, W: Write> ImportPrompt for TerminalPrompt<R, W> {
    fn ask(&mut self, context: &PromptContext) -> Option<UserChoice> {
        match self.run_dialog(context) {
            Ok(choice) => choice,
            Err(e) => {
                warn!("Import prompt failed, cancelling: {e}");
                None
            }
        }
    }
}
