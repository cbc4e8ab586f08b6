use std::fs;

use crate::combat::{simulate_battle, volleys_csv, BattleInput, BattleSummary};
use crate::config::Settings;
use crate::data::{validate_catalog_file, UnitRegistry, ValidationSeverity};
use crate::parallel::{check_run_count, sweep_seeds, DEFAULT_SWEEP_RUNS};
use crate::server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Simulate,
    Sweep,
    Units,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("simulate") => Some(Command::Simulate),
        Some("sweep") => Some(Command::Sweep),
        Some("units") => Some(Command::Units),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String], settings: &Settings) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(settings),
        Some(Command::Simulate) => handle_simulate(args, settings),
        Some(Command::Sweep) => handle_sweep(args, settings),
        Some(Command::Units) => handle_units(settings),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: broadside <serve|simulate|sweep|units|validate>");
            2
        }
    }
}

fn handle_serve(settings: &Settings) -> i32 {
    match server::run_server(settings) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_simulate(args: &[String], settings: &Settings) -> i32 {
    let Some(path) = args.get(2).filter(|arg| !arg.starts_with("--")) else {
        eprintln!("usage: broadside simulate <battle.json> [--table|--csv]");
        return 2;
    };
    let as_table = args.iter().any(|arg| arg == "--table");
    let as_csv = args.iter().any(|arg| arg == "--csv");

    let Some((input, registry)) = load_battle(path, settings) else {
        return 1;
    };
    let result = match simulate_battle(&input, &registry) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("simulation rejected: {err}");
            return 1;
        }
    };

    if as_csv {
        match volleys_csv(&result) {
            Ok(csv) => print!("{csv}"),
            Err(err) => {
                eprintln!("failed to export volleys: {err}");
                return 1;
            }
        }
    } else if as_table {
        let summary = BattleSummary::from_result(&result);
        println!("winner\trounds\tattacker_damage\tdefender_damage\tsalvage_primary\tsalvage_secondary");
        println!(
            "{:?}\t{}\t{}\t{}\t{}\t{}",
            result.winner,
            summary.rounds,
            summary.attacker.damage,
            summary.defender.damage,
            result.salvage.primary,
            result.salvage.secondary
        );
    } else {
        match serde_json::to_string_pretty(&result) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize battle result: {err}");
                return 1;
            }
        }
    }

    0
}

fn handle_sweep(args: &[String], settings: &Settings) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: broadside sweep <battle.json> [runs]");
        return 2;
    };
    let runs = match check_run_count(parse_u32_arg(args.get(3), "runs", DEFAULT_SWEEP_RUNS)) {
        Ok(runs) => runs,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };
    let Some((input, registry)) = load_battle(path, settings) else {
        return 1;
    };

    match sweep_seeds(&input, runs, &registry, &settings.worker_pool()) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize sweep summary: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("sweep failed: {err}");
            1
        }
    }
}

fn handle_units(settings: &Settings) -> i32 {
    let registry = match settings.load_registry() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let units: Vec<_> = registry.profiles().collect();
    match serde_json::to_string_pretty(&units) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize unit catalog: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: broadside validate <catalog.json|catalog.yaml>");
        return 2;
    };

    match validate_catalog_file(path) {
        Ok(report) if !report.has_errors() => {
            for diag in &report.diagnostics {
                if diag.severity == ValidationSeverity::Warning {
                    eprintln!("- {diag}");
                }
            }
            println!("validation passed: {path}");
            0
        }
        Ok(report) => {
            eprintln!(
                "validation failed: {} issue(s)",
                report.count(ValidationSeverity::Error)
            );
            for diag in report
                .diagnostics
                .iter()
                .filter(|diag| diag.severity == ValidationSeverity::Error)
            {
                eprintln!("- {diag}");
            }
            1
        }
        Err(err) => {
            eprintln!("validation failed: {err}");
            1
        }
    }
}

fn load_battle(path: &str, settings: &Settings) -> Option<(BattleInput, UnitRegistry)> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("unable to read '{path}': {err}");
            return None;
        }
    };
    let input: BattleInput = match serde_json::from_str(&raw) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("unable to parse battle input '{path}': {err}");
            return None;
        }
    };
    match settings.load_registry() {
        Ok(registry) => Some((input, registry)),
        Err(err) => {
            eprintln!("{err}");
            None
        }
    }
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
