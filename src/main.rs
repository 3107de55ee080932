// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use anyhow::{anyhow, bail, Context, Result};
use cantus::{CoreConfig, HarmonicContext, Harmony, RationalPitch};
use serde::Serialize;
use std::env;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("CANTUS - Just-intonation pitch selection");
    println!();
    println!("Usage: cantus [--config PATH] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  bridge <INTERVAL> [LENGTH]                  Find a scale bridge and fill it (default length 2)");
    println!("  harmony <SIZE> <PIVOT> [--prev P] [--next P]  Build a transitional harmony");
    println!("  imitate <H1,H2,..> <P1,P2,..>               Imitate a melody inside a harmony");
    println!("  --help                                      Show this help message");
    println!();
    println!("Pitches are ratios such as 3/2 or 5. Results are printed as YAML.");
    println!("Set RUST_LOG (e.g. RUST_LOG=debug) for more detail.");
}

fn parse_pitch(arg: &str) -> Result<RationalPitch> {
    arg.parse()
        .map_err(|e| anyhow!("Invalid pitch '{}': {}", arg, e))
}

fn parse_pitch_list(arg: &str) -> Result<Vec<RationalPitch>> {
    arg.split(',').map(|s| parse_pitch(s.trim())).collect()
}

fn print_yaml<T: Serialize>(value: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(value).context("Failed to serialize result")?;
    print!("{}", yaml);
    Ok(())
}

fn run_bridge(context: &HarmonicContext, args: &[String]) -> Result<()> {
    let Some(interval) = args.first() else {
        bail!("bridge requires a target interval");
    };
    let interval = parse_pitch(interval)?;
    let length: usize = match args.get(1) {
        Some(arg) => arg
            .parse()
            .map_err(|_| anyhow!("Invalid melody length: {}", arg))?,
        None => 2,
    };
    let result = context.bridge_melody(interval, length)?;
    print_yaml(&result)
}

fn run_harmony(context: &HarmonicContext, args: &[String]) -> Result<()> {
    if args.len() < 2 {
        bail!("harmony requires a size and a pivot pitch");
    }
    let size: usize = args[0]
        .parse()
        .map_err(|_| anyhow!("Invalid harmony size: {}", args[0]))?;
    let pivot = parse_pitch(&args[1])?;

    let mut previous = None;
    let mut next = None;
    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        let value = rest
            .next()
            .ok_or_else(|| anyhow!("{} requires a pitch", flag))?;
        match flag.as_str() {
            "--prev" => previous = Some(parse_pitch(value)?),
            "--next" => next = Some(parse_pitch(value)?),
            other => bail!("Unknown harmony option: {}", other),
        }
    }

    let result = context.find_transitional_harmony(size, pivot, previous, next)?;
    print_yaml(&result)
}

fn run_imitate(context: &HarmonicContext, args: &[String]) -> Result<()> {
    if args.len() < 2 {
        bail!("imitate requires a harmony and a melody");
    }
    let harmony: Harmony = parse_pitch_list(&args[0])?.into_iter().collect();
    let melody = parse_pitch_list(&args[1])?;
    let result = context.imitate(&melody, &harmony)?;
    print_yaml(&result)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .cloned()
                .ok_or_else(|| anyhow!("--config requires a path"))?;
            args.remove(i + 1);
            args.remove(i);
            CoreConfig::load(&path)?
        }
        None => CoreConfig::default(),
    };

    let Some(command) = args.first() else {
        println!("CANTUS - Just-intonation pitch selection");
        println!("Run with --help for usage information");
        return Ok(());
    };

    if command == "--help" || command == "-h" {
        print_usage();
        return Ok(());
    }

    let context = HarmonicContext::new(config).context("Failed to build harmonic context")?;
    let rest = &args[1..];
    match command.as_str() {
        "bridge" => run_bridge(&context, rest)?,
        "harmony" => run_harmony(&context, rest)?,
        "imitate" => run_imitate(&context, rest)?,
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
