//! # GeoSPT CLI
//!
//! Command-line front end over `spt_core`: loads sounding bundles, prints
//! compliance reviews and statistics, and writes reports.
//!
//! Logging goes to stderr through `tracing`; `GEOSPT_LOG` takes an
//! `EnvFilter` directive (default `warn`, `--verbose` gives `debug`).

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::Parser;

use spt_core::calculations::statistics::{
    analyze, identify_impenetrable_layers, resistance_profile, summary_statistics, RiskLevel,
};
use spt_core::config::SptConfig;
use spt_core::file_io::{load_bundle, save_bundle};
use spt_core::pdf::render_report_pdf;
use spt_core::report::assemble_report;
use spt_core::soil::{suggest_classification, SoilDescriptor};
use spt_core::validation::{review_sounding, ItemReport};

mod cli;

use cli::{ClassifyArgs, Cli, Commands, DuplicateArgs, ReportArgs, StatsArgs, ValidateArgs};

const RULE: &str = "═══════════════════════════════════════";

fn main() {
    if let Err(error) = run() {
        eprintln!("geospt error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate(args) => validate(&args),
        Commands::Stats(args) => stats(&args, &config),
        Commands::Report(args) => report(&args, &config),
        Commands::Classify(args) => classify(&args),
        Commands::Duplicate(args) => duplicate(&args),
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_env("GEOSPT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SptConfig> {
    match path {
        Some(path) => SptConfig::load_from(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => SptConfig::load().context("failed to load settings"),
    }
}

fn validate(args: &ValidateArgs) -> anyhow::Result<()> {
    let bundle = load_bundle(&args.bundle)?;
    let review = review_sounding(&bundle.sounding, &bundle.samples, &bundle.layers);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&review)?);
        return Ok(());
    }

    let compliance = &review.compliance;
    println!("{RULE}");
    println!("  NBR 6484:2020 COMPLIANCE - {}", bundle.sounding.code_str());
    println!("{RULE}");
    println!();
    println!("Score:    {}/100 {}", compliance.score, status_icon(compliance.conforme));
    println!("Status:   {}", bundle.sounding.status);
    println!();
    print_messages("Errors", &compliance.errors);
    print_messages("Warnings", &compliance.warnings);

    print_items("Samples", &review.samples);
    print_items("Layers", &review.layers);

    println!("{RULE}");
    println!(
        "  RESULT: {} ({} errors, {} warnings)",
        if review.all_valid() { "CONFORME" } else { "NÃO CONFORME" },
        review.error_count(),
        review.warning_count()
    );
    println!("{RULE}");
    Ok(())
}

fn stats(args: &StatsArgs, config: &SptConfig) -> anyhow::Result<()> {
    let bundle = load_bundle(&args.bundle)?;
    let samples = &bundle.samples;

    let summary = summary_statistics(samples);
    let profile = resistance_profile(samples);
    let impenetrable = identify_impenetrable_layers(samples);
    let analysis = analyze(samples, bundle.sounding.water_table_depth(), &config.analysis)?;

    if args.json {
        let out = serde_json::json!({
            "summary": summary,
            "resistance_profile": profile,
            "impenetrable": impenetrable,
            "analysis": analysis,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{RULE}");
    println!("  SPT STATISTICS - {}", bundle.sounding.code_str());
    println!("{RULE}");
    println!();
    println!("Samples:    {}", summary.count);
    println!("NSPT:       min {} / max {}", summary.min, summary.max);
    println!("            mean {:.1} / median {:.1}", summary.mean, summary.median);
    println!("Max depth:  {:.2} m", summary.max_depth_m);
    println!();
    println!("Resistance profile:");
    println!("  Muito baixa (≤4):  {}", profile.very_low);
    println!("  Baixa (5-10):      {}", profile.low);
    println!("  Média (11-30):     {}", profile.medium);
    println!("  Alta (31-50):      {}", profile.high);
    println!("  Muito alta (>50):  {}", profile.very_high);
    println!();

    if !impenetrable.is_empty() {
        println!("Impenetrable:");
        for layer in &impenetrable {
            println!(
                "  #{} at {:.2} m: NSPT {} in {:.0} cm",
                layer.sample_number, layer.depth_m, layer.nspt, layer.penetration_cm
            );
        }
        println!();
    }

    println!("Soft layers:");
    if analysis.soft_layers.is_empty() {
        println!("  none");
    }
    for run in &analysis.soft_layers {
        println!(
            "  {:.2} - {:.2} m ({:.2} m, mean NSPT {:.1})",
            run.depth_from_m, run.depth_to_m, run.thickness_m, run.mean_nspt
        );
    }
    println!();

    match &analysis.foundation {
        Some(run) => println!(
            "Foundation: {:.2} m (mean NSPT {:.1}) {}",
            run.depth_from_m,
            run.mean_nspt,
            status_icon(true)
        ),
        None => println!("Foundation: no competent stratum {}", status_icon(false)),
    }
    if let Some(stress) = &analysis.admissible_stress {
        println!(
            "  σ_adm = {:.1} kPa (q_ult = {:.1} kPa, FS = {})",
            stress.admissible_stress_kpa, stress.bearing_capacity_kpa, stress.safety_factor
        );
    }

    if !analysis.liquefaction.is_empty() {
        println!();
        println!("Liquefaction risk:");
        for risk in &analysis.liquefaction {
            let level = match risk.level {
                RiskLevel::Alto => "ALTO",
                RiskLevel::Moderado => "moderado",
            };
            println!(
                "  {:.2} m: N {} (corr. {:.1}) {}",
                risk.depth_m, risk.nspt, risk.corrected_nspt, level
            );
        }
    }

    if !analysis.refusals.is_empty() {
        println!();
        println!("Refusal (limit {} blows):", config.analysis.blow_limit);
        for refusal in &analysis.refusals {
            println!(
                "  #{} at {:.2} m: {}",
                refusal.sample_number, refusal.depth_m, refusal.reason
            );
        }
    }
    Ok(())
}

fn report(args: &ReportArgs, config: &SptConfig) -> anyhow::Result<()> {
    let bundle = load_bundle(&args.bundle)?;
    let doc = assemble_report(&bundle, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    }

    if let Some(out) = &args.pdf {
        let pdf = render_report_pdf(&doc)?;
        fs::write(out, &pdf).with_context(|| format!("failed to write {}", out.display()))?;
        println!("Wrote {} ({} bytes)", out.display(), pdf.len());
    } else if !args.json {
        println!("{}", doc.title);
        println!("  Sounding:  {}", doc.header.sounding.code);
        println!("  Samples:   {}", doc.samples.len());
        println!("  Layers:    {}", doc.layers.len());
        println!("  Photos:    {}", doc.photos.len());
        println!("  File name: {}", doc.metadata.file_name);
        println!();
        println!("Use --pdf <OUT> to render or --json to inspect the document.");
    }
    Ok(())
}

fn classify(args: &ClassifyArgs) -> anyhow::Result<()> {
    let suggestions = suggest_classification(args.nspt, args.hint.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    println!("NSPT {}:", args.nspt);
    for suggestion in &suggestions {
        let descriptor = match suggestion.descriptor {
            Some(SoilDescriptor::Compactness(c)) => c.display_name(),
            Some(SoilDescriptor::Consistency(c)) => c.display_name(),
            None => "-",
        };
        println!(
            "  {:>3}%  {} ({})",
            suggestion.probability, suggestion.soil_type, descriptor
        );
    }
    Ok(())
}

fn duplicate(args: &DuplicateArgs) -> anyhow::Result<()> {
    let bundle = load_bundle(&args.bundle)?;
    let copy = bundle.duplicate(&args.code)?;
    save_bundle(&copy, &args.out)?;

    println!(
        "{} -> {} ({})",
        bundle.sounding.code_str(),
        copy.sounding.code_str(),
        args.out.display()
    );
    Ok(())
}

fn print_messages(heading: &str, messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    println!("{heading}:");
    for message in messages {
        println!("  - {message}");
    }
    println!();
}

fn print_items(heading: &str, items: &[ItemReport]) {
    if items.is_empty() {
        return;
    }
    println!("{heading}:");
    for item in items {
        println!("  #{:<3} {}", item.number, status_icon(item.result.valido));
        for error in &item.result.errors {
            println!("       error: {error}");
        }
        for warning in &item.result.warnings {
            println!("       warn:  {warning}");
        }
    }
    println!();
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[FAIL]" }
}
