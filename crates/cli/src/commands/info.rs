//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use contracts::{Axis, DriverConfig};

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    device: DeviceInfo,
    sensor: SensorInfo,
    axes: Vec<AxisInfo>,
    reader_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    probe: Option<ProbeInfo>,
}

#[derive(Serialize)]
struct DeviceInfo {
    control_path: String,
    input_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_path: Option<String>,
}

#[derive(Serialize)]
struct SensorInfo {
    handle: i32,
    status: contracts::SensorStatus,
}

#[derive(Serialize)]
struct AxisInfo {
    axis: Axis,
    code: u16,
    scale: f32,
    /// Rate at full raw range (deg/s)
    full_scale_dps: f64,
}

/// Live device information
#[derive(Serialize, Default)]
struct ProbeInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    input_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reported_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    calibration: Option<[i32; 3]>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let config = super::run::load_config(args.config.as_deref())?;
    info!(probe = args.probe, "Loading configuration info");

    let mut info = build_config_info(&config);
    if args.probe {
        info.probe = Some(probe(&config));
    }

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn full_scale_dps(scale: f32) -> f64 {
    (f64::from(scale) * 32768.0).to_degrees()
}

fn build_config_info(config: &DriverConfig) -> ConfigInfo {
    let codes = [config.axes.x, config.axes.y, config.axes.z];
    let axes = Axis::ALL
        .iter()
        .map(|&axis| AxisInfo {
            axis,
            code: codes[axis.index()],
            scale: config.scale.get(axis),
            full_scale_dps: full_scale_dps(config.scale.get(axis)),
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", config.version),
        device: DeviceInfo {
            control_path: config.device.control_path.display().to_string(),
            input_name: config.device.input_name.clone(),
            input_path: config
                .device
                .input_path
                .as_ref()
                .map(|p| p.display().to_string()),
        },
        sensor: SensorInfo {
            handle: config.sensor.handle.0,
            status: config.sensor.status,
        },
        axes,
        reader_capacity: config.reader.capacity,
        probe: None,
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn probe(config: &DriverConfig) -> ProbeInfo {
    use driver::linux::{input_device_name, resolve_input_path};
    use driver::{DeviceControl, L3g4200dControl};

    let mut probe = ProbeInfo::default();

    match resolve_input_path(&config.device) {
        Ok(path) => {
            match input_device_name(&path) {
                Ok(name) => probe.reported_name = Some(name),
                Err(e) => probe.errors.push(format!("EVIOCGNAME {}: {e}", path.display())),
            }
            probe.input_node = Some(path.display().to_string());
        }
        Err(e) => probe.errors.push(format!("input node: {e}")),
    }

    let mut control = L3g4200dControl::new(&config.device.control_path);
    match control.open().and_then(|_| control.read_calibration()) {
        Ok(offsets) => probe.calibration = Some(offsets.to_array()),
        Err(e) => probe.errors.push(format!("calibration: {e}")),
    }
    control.close();

    for error in &probe.errors {
        warn!(error = %error, "probe step failed");
    }
    probe
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn probe(_config: &DriverConfig) -> ProbeInfo {
    ProbeInfo {
        errors: vec!["device probing requires Linux".to_string()],
        ..Default::default()
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 L3G4200D Gyro Configuration                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🔌 Device");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Control node: {}", info.device.control_path);
    println!("   ├─ Input name: {}", info.device.input_name);
    match &info.device.input_path {
        Some(path) => println!("   └─ Input node: {}", path),
        None => println!("   └─ Input node: (discover by name)"),
    }

    println!("\n🧭 Sensor");
    println!("   ├─ Handle: {}", info.sensor.handle);
    println!("   ├─ Status: {:?}", info.sensor.status);
    println!("   └─ Reader capacity: {} records", info.reader_capacity);

    println!("\n📐 Axes");
    for (i, axis) in info.axes.iter().enumerate() {
        let prefix = if i == info.axes.len() - 1 { "└─" } else { "├─" };
        println!(
            "   {} {:?}: code {}, scale {:.6e} rad/s, full scale {:.0} deg/s",
            prefix, axis.axis, axis.code, axis.scale, axis.full_scale_dps
        );
    }

    if let Some(probe) = &info.probe {
        println!("\n🔍 Probe");
        println!(
            "   ├─ Input node: {}",
            probe.input_node.as_deref().unwrap_or("-")
        );
        println!(
            "   ├─ Reported name: {}",
            probe.reported_name.as_deref().unwrap_or("-")
        );
        match probe.calibration {
            Some([x, y, z]) => println!("   └─ Calibration: x={x}, y={y}, z={z}"),
            None => println!("   └─ Calibration: unavailable"),
        }
        for error in &probe.errors {
            println!("   ⚠ {}", error);
        }
    }

    println!();
}
