//! The `tools` command: external tool and backend availability.

use console::style;

use crate::config::Settings;
use crate::extract::TextExtractor;
use crate::pdf::{Ghostscript, Merger, SizeCompressor};

use super::super::helpers::availability;

/// Print tool status. Missing tools are reported, never an error.
pub fn cmd_tools(settings: &Settings) -> anyhow::Result<()> {
    let gs = Ghostscript::locate(settings.ghostscript.as_deref());

    println!("\n{}", style("PDF Tool Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("External Tools:").cyan());
    match &gs {
        Some(gs) => println!(
            "  {:<15} {} {}",
            "ghostscript",
            availability(true, "found", ""),
            style(gs.binary().display()).dim()
        ),
        None => {
            println!(
                "  {:<15} {}",
                "ghostscript",
                availability(false, "", "not found")
            );
            println!(
                "                  {}",
                style("Install Ghostscript (gs) to enable compression and tool fallbacks").dim()
            );
        }
    }

    println!("\n{}", style("Text Extraction (in order):").cyan());
    let extractor = TextExtractor::new(gs.clone(), settings.tmp_dir.clone());
    for backend in extractor.backends() {
        println!(
            "  {:<15} {}",
            backend.backend_type().as_str(),
            availability(backend.is_available(), "available", "not available")
        );
    }

    println!("\n{}", style("Merge (in order):").cyan());
    let merger = Merger::new(gs.clone());
    for name in merger.backend_names() {
        println!("  {:<15} {}", name, availability(true, "available", ""));
    }

    println!("\n{}", style("Compression:").cyan());
    let compressor = SizeCompressor::with_ghostscript(gs, settings.tmp_dir.clone());
    println!(
        "  {:<15} {}",
        "ghostscript",
        availability(
            compressor.is_available(),
            "available",
            "disabled (oversized outputs are split instead)"
        )
    );

    println!();
    Ok(())
}
