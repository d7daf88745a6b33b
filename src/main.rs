use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use content_guard::{
    analyzer_from_config, dashboard, logging, BatchRunner, Config, Decision, DecisionLedger,
    Priority, Verdict,
};

#[derive(Parser)]
#[command(name = "content-guard", version, about = "Screen text for sensitive data, policy violations and negative sentiment")]
struct Cli {
    /// Decision ledger CSV file
    #[arg(long, global = true, env = "CONTENT_GUARD_LEDGER")]
    ledger: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one text and print the verdict
    Analyze {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Analyze one text and record a moderator decision for it
    Decide {
        text: String,
        /// safe | violation (approve / reject also accepted)
        #[arg(long)]
        decision: Decision,
    },
    /// Analyze a CSV column and write the merged report
    Batch {
        input: PathBuf,
        #[arg(short, long, default_value = "batch_report_processed.csv")]
        output: PathBuf,
        /// Column holding the text to analyze
        #[arg(long)]
        column: Option<String>,
    },
    /// Show decision analytics from the ledger
    Stats {
        #[arg(long)]
        recent: Option<usize>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose)?;

    let mut config = Config::from_env();
    if let Some(ledger) = cli.ledger {
        config.ledger_path = ledger;
    }

    match cli.command {
        Command::Analyze { text, json } => run_analyze(&config, &text, json),
        Command::Decide { text, decision } => run_decide(&config, &text, decision),
        Command::Batch { input, output, column } => {
            let column = column.unwrap_or_else(|| config.text_column.clone());
            run_batch(&config, &input, &output, &column)
        }
        Command::Stats { recent, json } => {
            run_stats(&config, recent.unwrap_or(config.recent_limit), json)
        }
    }
}

fn run_analyze(config: &Config, text: &str, json: bool) -> Result<()> {
    let analyzer = analyzer_from_config(config)?;
    let verdict = analyzer.analyze(text);

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_verdict(&verdict);
    }

    Ok(())
}

fn run_decide(config: &Config, text: &str, decision: Decision) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Enter text first.");
    }

    let analyzer = analyzer_from_config(config)?;
    let verdict = analyzer.analyze(text);
    print_verdict(&verdict);

    let ledger = DecisionLedger::new(&config.ledger_path);
    ledger
        .append(text, &verdict.flags, verdict.priority, decision)
        .with_context(|| format!("Could not record decision in {:?}", config.ledger_path))?;

    match decision {
        Decision::Safe => println!("✅ Logged: SAFE"),
        Decision::Violation => println!("❌ Logged: VIOLATION"),
    }

    Ok(())
}

fn run_batch(config: &Config, input: &Path, output: &Path, column: &str) -> Result<()> {
    println!("📂 Bulk CSV Processor");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let analyzer = analyzer_from_config(config)?;
    let report = BatchRunner::new(&analyzer).process_file(input, output, column)?;

    println!("✓ {}", report.summary());
    println!("📥 Report written to {:?}", output);

    Ok(())
}

fn run_stats(config: &Config, recent: usize, json: bool) -> Result<()> {
    let ledger = DecisionLedger::new(&config.ledger_path);
    let dash = dashboard(&ledger, recent)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dash)?);
        return Ok(());
    }

    println!("📊 Operational Insights");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if dash.summary.total == 0 {
        println!("No data available. Use 'analyze'/'decide' or 'batch' to generate data!");
        return Ok(());
    }

    println!("✓ {}", dash.summary.summary());

    println!("\nDistribution of Decisions");
    for (decision, count) in &dash.summary.decision_ratio {
        println!("  {:<12} {:>6}", decision, count);
    }

    println!("\nRecent Activity Log");
    for entry in &dash.recent {
        println!(
            "  {}  {:<9} {:<8} {}",
            entry.timestamp,
            entry.decision,
            entry.priority,
            truncate(&entry.original_text, 60)
        );
    }

    Ok(())
}

fn print_verdict(verdict: &Verdict) {
    let icon = match verdict.priority {
        Priority::Critical => "🚨",
        Priority::High => "🔴",
        Priority::Medium => "🟠",
        Priority::Low => "🟢",
    };

    println!("{} Priority:       {}", icon, verdict.priority);
    println!("   Sentiment:      {:.2}", verdict.sentiment);
    println!("   Flags Detected: {}", verdict.flag_count());

    if verdict.is_clean() {
        println!("✅ Clean Content");
    } else {
        println!("❌ Violations: {}", verdict.flags.join(", "));
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max_chars {
        single_line
    } else {
        let cut: String = single_line.chars().take(max_chars).collect();
        format!("{}…", cut)
    }
}
