mod calendar;
mod controller;
mod document_model;
mod find_replace;
mod format;
mod highlight;
mod links;
mod settings;
mod view;

use clap::Parser;
use controller::EditorController;
use document_model::Document;
use log::debug;
use settings::Settings;
use std::path::PathBuf;

/// Notething - a small note-taking text editor.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// File to open.
    file: Option<PathBuf>,

    /// Open in read-only mode.
    #[arg(long)]
    readonly: bool,

    /// Disable line formatting for this session.
    #[arg(long)]
    no_format: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let mut settings = Settings::load();
    if args.readonly {
        settings.readonly_mode = true;
    }
    if args.no_format {
        settings.line_formatting_enabled = false;
    }

    let path = args.file.or_else(|| {
        if settings.reopen_last_file {
            settings.last_file.clone().filter(|p| p.exists())
        } else {
            None
        }
    });

    let doc = match path {
        Some(path) => {
            debug!("opening {}", path.display());
            Document::open(&path)?
        }
        None => Document::new(),
    };

    EditorController::new(doc, settings).run()
}
