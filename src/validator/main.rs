//! Standalone validator for category configuration files.
//!
//! Checks that every category can be rendered as a hashtag and carried in
//! inline button callback data.

use std::process::ExitCode;

use clap::Parser;

use submission_bot::config::{CategoryConfig, MAX_CALLBACK_DATA_LEN};

/// Category configuration validator.
#[derive(Parser, Debug)]
#[command(name = "validate_categories")]
#[command(about = "Validates category configuration files for the submission bot")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file to validate.
    #[arg(short, long, default_value = "categories.json")]
    file: String,

    /// Generate an example configuration file at the specified path.
    #[arg(long)]
    generate_example: Option<String>,

    /// Show detailed information for each category.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(output_path) = args.generate_example {
        return generate_example(&output_path);
    }

    validate_config(&args.file, args.verbose)
}

fn generate_example(output_path: &str) -> ExitCode {
    let example = CategoryConfig::default();

    match example.save_to_file(output_path) {
        Ok(()) => {
            println!("✓ Example configuration written to: {output_path}");
            println!("\nThe file contains {} categories.", example.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write example file: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate_config(path: &str, verbose: bool) -> ExitCode {
    println!("Validating: {path}\n");

    let config = match CategoryConfig::load_from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let results = config.validate_all();
    let mut errors = 0;

    for (result, category) in results.iter().zip(config.categories.iter().map(Some).chain(std::iter::repeat(None))) {
        if verbose && let Some(category) = category {
            println!(
                "{} ({} of {MAX_CALLBACK_DATA_LEN} callback bytes)",
                category.hashtag(),
                category.callback_data().len()
            );
        }

        match result {
            Ok(()) => {
                if verbose {
                    println!("  ✓ OK");
                }
            }
            Err(e) => {
                errors += 1;
                println!("  ✗ Error: {e}");
            }
        }
    }

    println!();

    let total = config.len();
    if errors == 0 {
        println!("✓ All {total} categories are valid!");
        ExitCode::SUCCESS
    } else {
        println!("✗ Validation failed: {errors} error(s) in {total} categories");
        ExitCode::FAILURE
    }
}
