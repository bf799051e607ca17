//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{Axis, DriverConfig, INPUT_EVENT_SIZE};

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    control_path: String,
    input: String,
    handle: i32,
    axis_codes: [u16; 3],
    capacity: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(summarize(&config)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn summarize(config: &DriverConfig) -> ConfigSummary {
    ConfigSummary {
        version: format!("{:?}", config.version),
        control_path: config.device.control_path.display().to_string(),
        input: match &config.device.input_path {
            Some(path) => path.display().to_string(),
            None => format!("name:{}", config.device.input_name),
        },
        handle: config.sensor.handle.0,
        axis_codes: [config.axes.x, config.axes.y, config.axes.z],
        capacity: config.reader.capacity,
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &DriverConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    // three axis records plus a sync make one full sample
    if config.reader.capacity < 4 {
        warnings.push(format!(
            "reader.capacity = {} holds less than one full sample ({} bytes per record)",
            config.reader.capacity, INPUT_EVENT_SIZE
        ));
    }

    if config.scale.x != config.scale.y || config.scale.y != config.scale.z {
        warnings.push("Axes use different conversion scales".to_string());
    }

    for axis in Axis::ALL {
        if config.scale.get(axis) < 0.0 {
            warnings.push(format!("Scale for {axis:?} is negative - axis is inverted"));
        }
    }

    if config.device.input_path.is_none() {
        warnings.push(format!(
            "device.input_path not set - input node is discovered by name '{}'",
            config.device.input_name
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Control node: {}", summary.control_path);
            println!("  Input: {}", summary.input);
            println!("  Handle: {}", summary.handle);
            println!("  Axis codes: {:?}", summary.axis_codes);
            println!("  Reader capacity: {}", summary.capacity);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
