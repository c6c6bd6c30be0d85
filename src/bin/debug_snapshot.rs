// Debug script to show a tree's snapshot with content fingerprints
// Handy when a file keeps being re-copied every cycle

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use folder_mirror::{scan, Fingerprinter};

/// Print every file folder-mirror would see under ROOT
#[derive(Debug, Parser)]
#[command(name = "debug-snapshot")]
struct Args {
    /// Directory to scan
    root: PathBuf,

    /// Compare against the same relative paths under this directory
    #[arg(long, value_name = "DIR")]
    against: Option<PathBuf>,

    /// Bytes read per fingerprint chunk
    #[arg(long, default_value_t = 4096)]
    chunk_size: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let fingerprinter = Fingerprinter::new(args.chunk_size);

    let snapshot = scan(&args.root)
        .with_context(|| format!("Failed to scan {}", args.root.display()))?;

    println!("=== SNAPSHOT {} ({} files) ===", args.root.display(), snapshot.len());

    let mut differing = 0usize;
    for (relative, absolute) in snapshot.iter() {
        let print = fingerprinter.fingerprint(absolute)?;

        let Some(other_root) = &args.against else {
            println!("  {print}  {}", relative.display());
            continue;
        };

        let other = other_root.join(relative);
        let status = if !other.is_file() {
            "MISSING".to_string()
        } else {
            let other_print = fingerprinter.fingerprint(&other)?;
            if other_print == print {
                "same".to_string()
            } else {
                format!("DIFFERS ({other_print})")
            }
        };
        if status != "same" {
            differing += 1;
        }
        println!("  {print}  {}  [{status}]", relative.display());
    }

    if let Some(other_root) = &args.against {
        let other = scan(other_root)
            .with_context(|| format!("Failed to scan {}", other_root.display()))?;
        let extra: Vec<_> = other
            .relative_paths()
            .filter(|relative| !snapshot.contains(relative))
            .collect();

        println!();
        println!("=== ONLY IN {} ({} files) ===", other_root.display(), extra.len());
        for relative in &extra {
            println!("  {}", relative.display());
        }
        println!();
        println!("{differing} file(s) would be copied, {} removed", extra.len());
    }

    Ok(())
}
