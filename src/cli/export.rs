use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{Result, ShepherdError};
use crate::fmt;
use crate::package::{PackageSummary, PackageWriter};
use crate::progress::{CancelToken, PhaseResult, ProgressEvent, ProgressSink};
use crate::settings::load_settings;
use crate::sources::{detect_source, get_by_key, ExportContext};

pub fn run(
    input: &str,
    source_key: Option<&str>,
    output: Option<&str>,
    no_images: bool,
) -> Result<()> {
    let input_dir = PathBuf::from(input);
    if !input_dir.is_dir() {
        return Err(ShepherdError::MissingInput(input.to_string()));
    }

    let source = match source_key {
        Some(key) => {
            get_by_key(key).ok_or_else(|| ShepherdError::UnknownSource(key.to_string()))?
        }
        None => detect_source(&input_dir)
            .ok_or_else(|| ShepherdError::NoSourceDetected(input.to_string()))?,
    };
    let mut output_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| input_dir.join("export.slingshot"));
    if output_path.extension().is_none() {
        output_path.set_extension("slingshot");
    }

    let settings = load_settings();
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        let _ = ctrlc::set_handler(move || cancel.cancel());
    }

    println!("Source: {}", source.name());

    // The worker does the whole fetch -> translate -> write sequence;
    // this thread only renders progress events until the sender drops.
    let (tx, rx) = mpsc::channel();
    let worker = {
        let input_dir = input_dir.clone();
        let output_path = output_path.clone();
        let cancel = cancel.clone();
        let progress = ProgressSink::new(tx);
        thread::spawn(move || -> Result<(Vec<PhaseResult>, PackageSummary)> {
            let work_dir = PathBuf::from(&settings.data_dir).join("work");
            let mut writer = PackageWriter::create(&work_dir)?
                .with_image_archive_limit(settings.image_archive_mb * 1024 * 1024);
            let mut ctx = ExportContext {
                writer: &mut writer,
                progress,
                cancel,
                loop_threshold: settings.loop_threshold,
                include_images: !no_images,
            };
            let results = source.export(&input_dir, &mut ctx)?;
            let summary = writer.finalize(&output_path)?;
            Ok((results, summary))
        })
    };

    for event in rx {
        match event {
            ProgressEvent::PhaseStarted { phase } => println!("{phase}..."),
            ProgressEvent::Records { phase, count } => {
                print!("\r  {phase}: {} rows", fmt::count(count));
                let _ = std::io::stdout().flush();
            }
            ProgressEvent::PhaseFinished { written, skipped, .. } => {
                println!("\r  {} written, {} skipped", fmt::count(written), fmt::count(skipped));
            }
            ProgressEvent::PhaseFailed { phase, message } => {
                println!("\r  {} {phase}: {message}", "failed".red());
            }
        }
    }

    let (results, summary) = worker
        .join()
        .map_err(|_| ShepherdError::Other("export worker panicked".to_string()))??;
    print_summary(&results, &summary);
    Ok(())
}

fn print_summary(results: &[PhaseResult], summary: &PackageSummary) {
    let mut table = Table::new();
    table.set_header(vec!["Phase", "File", "Checksum", "Written", "Skipped", "Status"]);
    for result in results {
        let status = match &result.failure {
            None => "ok".to_string(),
            Some(message) => format!("failed: {message}"),
        };
        let checksum = if result.checksum.len() >= 8 {
            &result.checksum[..8]
        } else {
            "-"
        };
        table.add_row(vec![
            Cell::new(&result.phase),
            Cell::new(&result.source_file),
            Cell::new(checksum),
            Cell::new(fmt::count(result.written)),
            Cell::new(fmt::count(result.skipped)),
            Cell::new(status),
        ]);
    }
    println!("\n{table}");

    for result in results {
        if result.errors.is_empty() {
            continue;
        }
        println!("{} skipped records:", result.phase);
        for error in result.errors.iter().take(5) {
            println!("  {}: {}", error.record_id, error.message);
        }
        if result.errors.len() > 5 {
            println!("  ... and {} more", result.errors.len() - 5);
        }
    }

    let total_amount: f64 = results.iter().map(|r| r.amount).sum();
    if total_amount != 0.0 {
        println!("Contributions total: {}", fmt::money(total_amount));
    }

    println!(
        "{} {} ({} files)",
        "Wrote".green(),
        summary.package_path.display(),
        summary.entries.len()
    );
    for archive in &summary.image_archives {
        println!("  {}", archive.display());
    }
}
