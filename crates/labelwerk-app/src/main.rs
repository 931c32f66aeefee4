// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk: Dymo label compositor and CUPS print service
//
// Entry point. Initialises logging and the label service, then runs one
// command.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use labelwerk_core::error::Result;
use labelwerk_core::human_errors::humanize_error;
use labelwerk_core::types::{Alignment, LabelId, LabelRequest};

use services::app_services::LabelService;

#[derive(Debug, Parser)]
#[command(name = "labelwerk", version, about = "Compose and print Dymo labels through CUPS")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the supported label sizes.
    Sizes,
    /// Render a label without printing it.
    Preview {
        #[command(flatten)]
        label: LabelArgs,
        /// Write the PNG here instead of printing a data URL.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a label and remember it.
    Print {
        #[command(flatten)]
        label: LabelArgs,
        #[arg(long, default_value_t = 1)]
        copies: u32,
    },
    /// Show the configured printer's status.
    Status,
    /// List saved labels, most recent first.
    Memory,
    /// Delete saved labels by id.
    Forget {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct LabelArgs {
    /// Label text; `\n` starts a new line.
    text: String,
    /// Label size code (see `labelwerk sizes`).
    #[arg(long)]
    size: Option<String>,
    #[arg(long)]
    font_size: Option<u32>,
    /// left, center or right.
    #[arg(long)]
    align: Option<Alignment>,
}

impl LabelArgs {
    fn into_request<S>(self, service: &LabelService<S>) -> LabelRequest
    where
        S: labelwerk_print::Spooler,
    {
        let mut request = service.request(self.text.replace("\\n", "\n"));
        if let Some(size) = self.size {
            request = request.with_label_size(size);
        }
        if let Some(font_size) = self.font_size {
            request = request.with_font_size(font_size);
        }
        if let Some(align) = self.align {
            request = request.with_align(align);
        }
        request
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let service = LabelService::init()?;
    tracing::debug!(memory = %service.memory_path().display(), "label service ready");

    match cli.command {
        Command::Sizes => {
            for size in service.label_sizes() {
                let (w, h) = size.pixel_dimensions(service.config().dpi);
                println!(
                    "{:<6} {:<40} {:>5.1} x {:>5.1} mm  {w}x{h} px  {}",
                    size.code, size.name, size.width_mm, size.height_mm, size.media_code
                );
            }
        }
        Command::Preview { label, output } => {
            let request = label.into_request(&service);
            let rendered = service.preview(&request)?;
            match output {
                Some(path) => {
                    rendered.save(&path)?;
                    println!("{}", path.display());
                }
                None => println!("{}", rendered.to_data_url()?),
            }
        }
        Command::Print { label, copies } => {
            let request = label.into_request(&service).with_copies(copies);
            let outcome = service.print(&request).await?;
            println!("{}", outcome.message);
        }
        Command::Status => {
            let status = service.status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Memory => {
            println!("{}", serde_json::to_string_pretty(&service.memory())?);
        }
        Command::Forget { ids } => {
            let ids: Vec<LabelId> = ids.iter().map(|id| LabelId::from(id.as_str())).collect();
            let removed = service.forget(&ids)?;
            println!("Deleted {removed} of {} saved label(s)", ids.len());
        }
    }
    Ok(())
}
