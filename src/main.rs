//! landed-cost CLI
//!
//! Compute landed costs of import shipments from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Calculate a shipment described in a JSON file
//! landed-cost calc --input shipment.json
//!
//! # Start from presets, output JSON, and keep it in a history file
//! landed-cost calc --input shipment.json --preset china-fob --format json \
//!     --save history.json --owner alice --name "Quote 42"
//!
//! # How sensitive is the quote to the USD rate?
//! landed-cost shock --input shipment.json --shocks -0.1,0.1
//! ```
//!
//! Set `RUST_LOG=debug` to trace each calculation step.

use chrono::{Duration, Utc};
use landed_cost_engine::calculation::engine::CostEngine;
use landed_cost_engine::core::currency::{ExchangeRate, RateTable};
use landed_cost_engine::core::incoterm::Incoterm;
use landed_cost_engine::core::preset::Preset;
use landed_cost_engine::core::shipment::{normalize_lines, ForeignLineItem, ShipmentInput};
use landed_cost_engine::history::record::{CalculationRecord, OwnerId};
use landed_cost_engine::history::stats::HistoryStats;
use landed_cost_engine::history::store::{CalculationStore, JsonFileStore};
use landed_cost_engine::report::cost_report::CostReport;
use landed_cost_engine::report::format::brl;
use landed_cost_engine::simulation::fx_shock::{run_shocks, shocked_rate};
use landed_cost_engine::simulation::random_input::{generate_batch, InputConfig};
use log::{info, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::process;

/// Quotes older than this are still used, but flagged.
const MAX_RATE_AGE_HOURS: i64 = 24;

const USAGE: &str = r#"landed-cost — import landed cost and tax calculator

USAGE:
    landed-cost <COMMAND> [OPTIONS]

COMMANDS:
    calc        Calculate the landed cost of a shipment
    incoterms   Show which costs each Incoterm already includes
    presets     List shipment presets
    history     List saved calculations
    generate    Generate random shipments (for testing)
    shock       Recalculate under exchange-rate shocks
    help        Show this message

OPTIONS (calc):
    --input <FILE>      Path to JSON shipment file
    --format <FORMAT>   Output format: text (default) or json
    --preset <ID>       Overlay a preset (repeatable, applied in order)
    --save <FILE>       Append the result to a JSON history file
    --owner <ID>        Owner of the saved calculation (with --save)
    --name <NAME>       Name of the calculation

OPTIONS (history):
    --store <FILE>      JSON history file
    --owner <ID>        Only this owner's calculations
    --stats             Totals, average and Incoterm breakdown instead of a list
    --format <FORMAT>   text (default) or json

OPTIONS (generate):
    --count <N>         Number of shipments (default: 5)
    --output <FILE>     Write to file instead of stdout

OPTIONS (shock):
    --input <FILE>      Path to JSON shipment file
    --shocks <LIST>     Comma-separated relative shocks (default: -0.10,-0.05,0.05,0.10)
    --format <FORMAT>   text (default) or json

EXAMPLES:
    landed-cost calc --input shipment.json
    landed-cost calc --input shipment.json --preset usa-cif --preset electronics
    landed-cost history --store history.json --owner alice
    landed-cost history --store history.json --owner alice --stats
    landed-cost generate --count 20 --output shipments.json"#;

fn print_usage() {
    eprintln!("{}", USAGE);
}

/// JSON schema for an input shipment.
///
/// `foreign_expenses` may be in USD or BRL and are converted with the
/// shipment's own exchange rate before calculation.
#[derive(serde::Deserialize)]
struct ShipmentFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(flatten)]
    shipment: ShipmentInput,
    #[serde(default)]
    foreign_expenses: Vec<ForeignLineItem>,
}

#[derive(serde::Serialize)]
struct HistoryEntryOutput {
    id: String,
    name: String,
    incoterm: String,
    final_cost: String,
    created_at: String,
}

#[derive(serde::Serialize)]
struct ShockOutput {
    shock: String,
    rate: Option<String>,
    final_cost: Option<String>,
    impact: Option<String>,
    error: Option<String>,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Parse `--flag value` pairs. Flags may repeat; unknown flags abort.
fn parse_options(args: &[String], allowed: &[&str]) -> HashMap<String, Vec<String>> {
    let mut options: HashMap<String, Vec<String>> = HashMap::new();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        if !allowed.contains(&flag) {
            eprintln!("Unknown option: {}", flag);
            process::exit(1);
        }
        i += 1;
        let value = args.get(i).cloned().unwrap_or_else(|| {
            eprintln!("{} requires a value", flag);
            process::exit(1);
        });
        options.entry(flag.to_string()).or_default().push(value);
        i += 1;
    }
    options
}

fn single<'a>(options: &'a HashMap<String, Vec<String>>, flag: &str) -> Option<&'a str> {
    options
        .get(flag)
        .and_then(|values| values.last())
        .map(String::as_str)
}

fn load_shipment(path: &str) -> (Option<String>, ShipmentInput, Vec<ForeignLineItem>) {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: ShipmentFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "incoterm": "FOB",
  "exchange_rate": "5.4174",
  "goods_value": "72500.00",
  "international_freight": "6510.08",
  "international_insurance": "43.69",
  "rates": {{ "duty": "35", "pis": "2.62", "cofins": "12.57", "icms": "18" }},
  "customs_processing_fee": "154.23",
  "marine_surcharge": "2840.35",
  "local_expenses": [{{ "label": "warehousing", "amount": "31072.59" }}],
  "foreign_expenses": [{{ "label": "origin fees", "amount": "1335.30", "currency": "USD" }}]
}}"#
        );
        process::exit(1);
    });
    (file.name, file.shipment, file.foreign_expenses)
}

/// Apply presets, then fold converted foreign expenses into the local list.
fn prepare_input(
    mut input: ShipmentInput,
    foreign: &[ForeignLineItem],
    presets: &[String],
) -> ShipmentInput {
    for id in presets {
        let preset = Preset::find(id).unwrap_or_else(|| fail(format!("unknown preset '{}'", id)));
        info!("applying preset {}", preset.id);
        input = preset.apply(input);
    }
    if let Some(quoted_at) = input.rate_quoted_at {
        let quote =
            ExchangeRate::usd_brl(input.exchange_rate, quoted_at).unwrap_or_else(|e| fail(e));
        if quote.is_stale(Utc::now(), Duration::hours(MAX_RATE_AGE_HOURS)) {
            warn!(
                "exchange rate {} was quoted {} hours ago",
                quote.rate,
                quote.age(Utc::now()).num_hours()
            );
        }
    }
    if !foreign.is_empty() {
        let rates = RateTable::usd_brl(input.exchange_rate).unwrap_or_else(|e| fail(e));
        let lines = normalize_lines(foreign, &rates).unwrap_or_else(|e| fail(e));
        input.local_expenses.extend(lines);
    }
    input
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e))
}

fn cmd_calc(args: &[String]) {
    let options = parse_options(
        args,
        &["--input", "--format", "--preset", "--save", "--owner", "--name"],
    );
    let path =
        single(&options, "--input").unwrap_or_else(|| fail("--input <FILE> is required"));
    let format = single(&options, "--format").unwrap_or("text");
    let presets = options.get("--preset").cloned().unwrap_or_default();

    let (file_name, input, foreign) = load_shipment(path);
    let input = prepare_input(input, &foreign, &presets);
    let result = CostEngine::calculate(&input).unwrap_or_else(|e| fail(e));

    let name = single(&options, "--name")
        .map(str::to_string)
        .or(file_name)
        .unwrap_or_else(|| format!("{} shipment", input.incoterm));

    if let Some(store_path) = single(&options, "--save") {
        let owner = single(&options, "--owner")
            .unwrap_or_else(|| fail("--save requires --owner <ID>"));
        let mut store = JsonFileStore::open(store_path).unwrap_or_else(|e| fail(e));
        let record = CalculationRecord::new(
            OwnerId::new(owner),
            name.clone(),
            input.clone(),
            result.clone(),
        );
        let id = store.save(record).unwrap_or_else(|e| fail(e));
        eprintln!("Saved calculation {} → {}", id, store_path);
    }

    let report = CostReport::new(name, input, result, Utc::now());
    if format == "json" {
        println!("{}", to_json(&report));
    } else {
        println!("{}", report);
    }
}

fn cmd_incoterms() {
    println!("{:<6}{:<34}{:<10}{:<10}", "TERM", "NAME", "FREIGHT", "INSURANCE");
    for term in Incoterm::ALL {
        let inclusion = term.cost_inclusion();
        let label = |included: bool| if included { "included" } else { "added" };
        println!(
            "{:<6}{:<34}{:<10}{:<10}",
            term.code(),
            term.description(),
            label(inclusion.includes_freight),
            label(inclusion.includes_insurance)
        );
    }
}

fn cmd_presets() {
    for preset in Preset::all() {
        println!("{:<14}{:<28}{}", preset.id, preset.name, preset.description);
    }
}

fn cmd_history(args: &[String]) {
    let show_stats = args.iter().any(|arg| arg == "--stats");
    let args: Vec<String> = args.iter().filter(|arg| *arg != "--stats").cloned().collect();
    let options = parse_options(&args, &["--store", "--owner", "--format"]);
    let path = single(&options, "--store").unwrap_or_else(|| fail("--store <FILE> is required"));
    let owner = OwnerId::new(
        single(&options, "--owner").unwrap_or_else(|| fail("--owner <ID> is required")),
    );
    let format = single(&options, "--format").unwrap_or("text");

    let store = JsonFileStore::open(path).unwrap_or_else(|e| fail(e));
    let records = store.list_for_owner(&owner);

    if show_stats {
        let stats = HistoryStats::from_records(&records, Utc::now());
        if format == "json" {
            println!("{}", to_json(&stats));
        } else {
            println!("{}", stats);
        }
        return;
    }

    if format == "json" {
        let entries: Vec<HistoryEntryOutput> = records
            .iter()
            .map(|record| HistoryEntryOutput {
                id: record.id().to_string(),
                name: record.name().to_string(),
                incoterm: record.input().incoterm.to_string(),
                final_cost: record.result().final_cost().round_dp(2).to_string(),
                created_at: record.created_at().to_rfc3339(),
            })
            .collect();
        println!("{}", to_json(&entries));
    } else if records.is_empty() {
        println!("No saved calculations for {}.", owner);
    } else {
        for record in &records {
            println!(
                "{}  {}  {:<4} {:>20}  {}",
                record.created_at().format("%d/%m/%Y %H:%M"),
                record.id(),
                record.input().incoterm,
                brl(record.result().final_cost()),
                record.name()
            );
        }
        println!("\nTotal: {}", records.len());
    }
}

fn cmd_generate(args: &[String]) {
    let options = parse_options(args, &["--count", "--output"]);
    let count: usize = match single(&options, "--count") {
        Some(value) => value
            .parse()
            .unwrap_or_else(|_| fail("--count requires a number")),
        None => 5,
    };

    let inputs = generate_batch(&InputConfig::default(), count);
    let json = to_json(&inputs);

    if let Some(path) = single(&options, "--output") {
        fs::write(path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!("Generated {} shipments → {}", inputs.len(), path);
    } else {
        println!("{}", json);
    }
}

fn cmd_shock(args: &[String]) {
    let options = parse_options(args, &["--input", "--shocks", "--format"]);
    let path =
        single(&options, "--input").unwrap_or_else(|| fail("--input <FILE> is required"));
    let shocks: Vec<Decimal> = single(&options, "--shocks")
        .unwrap_or("-0.10,-0.05,0.05,0.10")
        .split(',')
        .map(|s| {
            s.trim()
                .parse()
                .unwrap_or_else(|_| fail(format!("invalid shock '{}'", s)))
        })
        .collect();

    let (_, input, foreign) = load_shipment(path);
    let input = prepare_input(input, &foreign, &[]);
    let results = run_shocks(&input, &shocks).unwrap_or_else(|e| fail(e));

    if single(&options, "--format") == Some("json") {
        let output: Vec<ShockOutput> = shocks
            .iter()
            .zip(&results)
            .map(|(shock, result)| match result {
                Ok(r) => ShockOutput {
                    shock: shock.to_string(),
                    rate: Some(r.shocked_rate.to_string()),
                    final_cost: Some(r.shocked_final_cost.round_dp(2).to_string()),
                    impact: Some(r.impact.round_dp(2).to_string()),
                    error: None,
                },
                Err(e) => ShockOutput {
                    shock: shock.to_string(),
                    rate: shocked_rate(input.exchange_rate, *shock)
                        .map(|rate| rate.to_string())
                        .ok(),
                    final_cost: None,
                    impact: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        println!("{}", to_json(&output));
        return;
    }

    println!("Baseline rate: {}", input.exchange_rate);
    for (shock, result) in shocks.iter().zip(&results) {
        let shock_percent = shock.to_f64().unwrap_or(f64::NAN) * 100.0;
        match result {
            Ok(r) => println!(
                "  {:>+7.2}%  rate {:<10.4} final {:>20}  impact {:>18} ({:+.2}%)",
                shock_percent,
                r.shocked_rate,
                brl(r.shocked_final_cost),
                brl(r.impact),
                r.impact_percent()
            ),
            Err(e) => println!("  {:>+7.2}%  rejected: {}", shock_percent, e),
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "calc" => cmd_calc(rest),
        "incoterms" => cmd_incoterms(),
        "presets" => cmd_presets(),
        "history" => cmd_history(rest),
        "generate" => cmd_generate(rest),
        "shock" => cmd_shock(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
