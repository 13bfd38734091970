//! Substation Telemetry Simulation
//!
//! Generates realistic three-phase feeder telemetry and POSTs it to a
//! running GridWarden instance. Simulates a healthy window, a fault
//! injection window of the chosen type, and recovery:
//! - Short circuits (lg, ll, llg, lll)
//! - Open conductor (open)
//! - High-impedance leakage (leak)
//!
//! # Usage
//! ```bash
//! ./simulation --target http://localhost:8080 --scenario lg --cycles 120
//! ```

use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

use gridwarden::types::TelemetryReading;

// ============================================================================
// Feeder Constants
// ============================================================================

/// Nominal phase voltage (V)
const BASE_VOLTAGE: f64 = 230.0;
/// Baseline feeder load (kW)
const BASE_LOAD_KW: f64 = 20.0;
/// Baseline power factor
const BASE_PF: f64 = 0.92;
/// Healthy phase current at baseline load (A)
const BASE_CURRENT: f64 = 31.5;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "grid-simulation")]
#[command(about = "Three-phase telemetry simulation for GridWarden testing")]
#[command(version)]
struct Args {
    /// GridWarden base URL
    #[arg(short, long, default_value = "http://localhost:8080")]
    target: String,

    /// Fault scenario: healthy, lg, ll, llg, lll, open, leak
    #[arg(short, long, default_value = "lg")]
    scenario: String,

    /// Total readings to post
    #[arg(short, long, default_value = "60")]
    cycles: u32,

    /// Milliseconds between readings
    #[arg(short, long, default_value = "500")]
    interval_ms: u64,

    /// Substation id stamped onto readings
    #[arg(long, default_value = "SUB-01")]
    substation: String,

    /// Line id stamped onto readings
    #[arg(long, default_value = "LINE-A")]
    line: String,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

// ============================================================================
// Simulation Phases
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Healthy operation (0-50%)
    Healthy,
    /// Fault injection window (50-70%)
    Fault,
    /// Return to normal (70-100%)
    Recovery,
}

impl Phase {
    fn from_progress(progress: f64) -> Self {
        match progress {
            p if p < 0.50 => Phase::Healthy,
            p if p < 0.70 => Phase::Fault,
            _ => Phase::Recovery,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Phase::Healthy => "Healthy Operation",
            Phase::Fault => "Fault Injection",
            Phase::Recovery => "Recovery (Return to Normal)",
        }
    }
}

// ============================================================================
// Reading Generator
// ============================================================================

struct Generator {
    rng: StdRng,
    noise_v: Normal<f64>,
    noise_i: Normal<f64>,
    substation: String,
    line: String,
}

impl Generator {
    fn new(args: &Args) -> Self {
        let rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            noise_v: Normal::new(0.0, 1.5).expect("valid distribution"),
            noise_i: Normal::new(0.0, 0.4).expect("valid distribution"),
            substation: args.substation.clone(),
            line: args.line.clone(),
        }
    }

    fn healthy(&mut self) -> TelemetryReading {
        let v = |rng: &mut StdRng, n: &Normal<f64>| BASE_VOLTAGE + n.sample(rng);
        let i = |rng: &mut StdRng, n: &Normal<f64>| BASE_CURRENT + n.sample(rng);
        TelemetryReading {
            substation_id: self.substation.clone(),
            line_id: self.line.clone(),
            load_kw: BASE_LOAD_KW + self.noise_i.sample(&mut self.rng),
            power_factor: BASE_PF,
            voltage_a: v(&mut self.rng, &self.noise_v),
            voltage_b: v(&mut self.rng, &self.noise_v),
            voltage_c: v(&mut self.rng, &self.noise_v),
            current_a: i(&mut self.rng, &self.noise_i),
            current_b: i(&mut self.rng, &self.noise_i),
            current_c: i(&mut self.rng, &self.noise_i),
        }
    }

    /// Overlay the scenario's electrical signature on a healthy reading.
    fn faulted(&mut self, scenario: &str) -> TelemetryReading {
        let mut r = self.healthy();
        match scenario {
            "lg" => {
                r.voltage_a = 95.0 + self.noise_v.sample(&mut self.rng) * 5.0;
                r.current_a = 16_000.0 + self.noise_i.sample(&mut self.rng) * 500.0;
            }
            "ll" => {
                r.voltage_a = 170.0 + self.noise_v.sample(&mut self.rng) * 5.0;
                r.voltage_b = 170.0 + self.noise_v.sample(&mut self.rng) * 5.0;
                r.current_a = 11_000.0 + self.noise_i.sample(&mut self.rng) * 400.0;
                r.current_b = 11_000.0 + self.noise_i.sample(&mut self.rng) * 400.0;
            }
            "llg" => {
                r.voltage_a = 120.0 + self.noise_v.sample(&mut self.rng) * 5.0;
                r.voltage_b = 120.0 + self.noise_v.sample(&mut self.rng) * 5.0;
                r.current_a = 13_000.0 + self.noise_i.sample(&mut self.rng) * 400.0;
                r.current_b = 13_000.0 + self.noise_i.sample(&mut self.rng) * 400.0;
            }
            "lll" => {
                for (v, i) in [
                    (&mut r.voltage_a, &mut r.current_a),
                    (&mut r.voltage_b, &mut r.current_b),
                    (&mut r.voltage_c, &mut r.current_c),
                ] {
                    *v = 40.0 + self.noise_v.sample(&mut self.rng) * 3.0;
                    *i = 18_000.0 + self.noise_i.sample(&mut self.rng) * 600.0;
                }
            }
            "open" => {
                r.current_a = (0.05 + self.noise_i.sample(&mut self.rng).abs() * 0.05).min(0.4);
            }
            "leak" => {
                r.voltage_a = 218.0 + self.noise_v.sample(&mut self.rng);
                r.current_a = 120.0 + self.noise_i.sample(&mut self.rng) * 10.0;
            }
            _ => {}
        }
        r
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let known = ["healthy", "lg", "ll", "llg", "lll", "open", "leak"];
    if !known.contains(&args.scenario.as_str()) {
        anyhow::bail!(
            "unknown scenario `{}`: expected one of {}",
            args.scenario,
            known.join(", ")
        );
    }

    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/telemetry", args.target.trim_end_matches('/'));
    let mut generator = Generator::new(&args);

    eprintln!(
        "grid-simulation: {} cycles of `{}` against {}",
        args.cycles, args.scenario, url
    );

    let mut last_phase = None;
    for cycle in 0..args.cycles {
        let progress = f64::from(cycle) / f64::from(args.cycles.max(1));
        let phase = if args.scenario == "healthy" {
            Phase::Healthy
        } else {
            Phase::from_progress(progress)
        };
        if last_phase != Some(phase) {
            eprintln!("--- phase: {} ---", phase.name());
            last_phase = Some(phase);
        }

        let reading = match phase {
            Phase::Fault => generator.faulted(&args.scenario),
            _ => generator.healthy(),
        };

        match client.post(&url).json(&reading).send().await {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                let decision = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| {
                        Some(format!(
                            "{} / {}",
                            v["data"]["command"].as_str()?,
                            v["data"]["status"].as_str()?
                        ))
                    })
                    .unwrap_or_else(|| body.chars().take(80).collect());
                println!("[{cycle:>4}] {status} {decision}");
            }
            Err(e) => {
                eprintln!("[{cycle:>4}] request failed: {e}");
            }
        }

        tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
    }

    Ok(())
}
