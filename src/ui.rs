#![forbid(unsafe_code)]

use crate::pak;
use inquire::validator::Validation;
use inquire::{Confirm, CustomUserError, Text};
use std::path::PathBuf;

fn prompt_err(e: inquire::InquireError) -> pak::PakError {
    pak::PakError::Prompt(e.to_string())
}

fn validate_dir(p: &str) -> Result<Validation, CustomUserError> {
    let pb = PathBuf::from(p.trim());
    if !pb.exists() {
        return Ok(Validation::Invalid("Path does not exist".into()));
    }
    if !pb.is_dir() {
        return Ok(Validation::Invalid("Path is not a directory".into()));
    }
    Ok(Validation::Valid)
}

fn validate_output(p: &str) -> Result<Validation, CustomUserError> {
    if p.trim().is_empty() {
        return Ok(Validation::Invalid("Output path is empty".into()));
    }
    Ok(Validation::Valid)
}

/// Category directories the wizard would fail on, reported up front.
fn missing_categories(input: &std::path::Path, cfg: &pak::PackConfig) -> Vec<String> {
    cfg.categories
        .iter()
        .filter(|c| !input.join(c.as_str()).is_dir())
        .cloned()
        .collect()
}

pub fn run() -> pak::PakResult<()> {
    println!("RI_0 archive wizard\n");

    let input = Text::new("Input directory")
        .with_default("./dat")
        .with_validator(validate_dir)
        .prompt()
        .map(|s| PathBuf::from(s.trim()))
        .map_err(prompt_err)?;

    let output = Text::new("Output archive")
        .with_default("./ri.dat")
        .with_validator(validate_output)
        .prompt()
        .map(|s| PathBuf::from(s.trim()))
        .map_err(prompt_err)?;

    let cfg = pak::PackConfig::default();
    let missing = missing_categories(&input, &cfg);

    println!("\nBuild summary:");
    println!("  input     : {}", input.display());
    println!("  output    : {}", output.display());
    println!("  categories: {}", cfg.categories.join(", "));
    println!("  skip ext  : .{}", cfg.excluded_extension);
    if !missing.is_empty() {
        println!("  missing   : {} (build will fail)", missing.join(", "));
    }

    let proceed = Confirm::new("Proceed?")
        .with_default(missing.is_empty())
        .prompt()
        .map_err(prompt_err)?;
    if !proceed {
        return Ok(());
    }

    let stats = pak::build(&input, &output, &cfg)?;
    println!(
        "\nWrote {} entries ({} bytes) to {}",
        stats.entries,
        stats.total_len,
        output.display()
    );
    Ok(())
}
