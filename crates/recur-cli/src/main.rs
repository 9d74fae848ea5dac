//! `recur` CLI: parse, expand, and validate RFC 5545 recurrence rules.
//!
//! ## Usage
//!
//! ```sh
//! # Print the canonical form of a rule
//! recur parse "freq=weekly;byday=mo,we;interval=1"
//!
//! # First 5 occurrences, one per line
//! recur expand "FREQ=MONTHLY;BYDAY=TU;BYSETPOS=3" --start 20260217T140000 --limit 5
//!
//! # Zoned start, with EXDATE / RDATE values read in the same zone
//! recur expand "FREQ=DAILY" --start 20260307T023000 --tz America/New_York \
//!     --exdate 20260309T023000 --dst-policy skip --json
//!
//! # Only occurrences in [from, to)
//! recur expand "FREQ=DAILY" --start 20260101 --from 20260301 --to 20260308
//!
//! # Check a rule against its DTSTART (exit status 1 on violations)
//! recur validate "FREQ=DAILY;UNTIL=20250101" --start 20260101T090000Z
//! ```
//!
//! Logging goes to stderr. `RUST_LOG` takes precedence; otherwise `-v` enables
//! debug output and `-vv` trace output.

use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use recur_engine::{
    DstPolicy, ParentContext, RecurrenceRule, RecurrenceSet, StreamOptions, Temporal,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "recur",
    version,
    about = "RFC 5545 recurrence rule (RRULE) tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical serialization of a rule
    Parse {
        /// RRULE text, with or without the "RRULE:" prefix
        rule: String,
        /// Print the rule's parts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Expand a rule into its occurrences
    Expand {
        /// RRULE text, with or without the "RRULE:" prefix
        rule: String,
        #[command(flatten)]
        start: StartArgs,
        /// Maximum number of occurrences printed
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        /// Exclude this value (repeatable)
        #[arg(long = "exdate", value_name = "VALUE")]
        exdates: Vec<String>,
        /// Add this value (repeatable)
        #[arg(long = "rdate", value_name = "VALUE")]
        rdates: Vec<String>,
        /// Only print occurrences at or after this value
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Only print occurrences strictly before this value
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// What to do with wall-clock times that fall in a DST gap
        #[arg(long, value_enum, default_value_t = DstPolicyArg::WallClock)]
        dst_policy: DstPolicyArg,
        /// Print a JSON array instead of one occurrence per line
        #[arg(long)]
        json: bool,
    },
    /// Check a rule against its DTSTART and recurrence overrides
    Validate {
        /// RRULE text, with or without the "RRULE:" prefix
        rule: String,
        #[command(flatten)]
        start: StartArgs,
        /// A recurrence override of the owning component (repeatable)
        #[arg(long = "override", value_name = "VALUE")]
        overrides: Vec<String>,
        /// Print violations as JSON objects
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct StartArgs {
    /// DTSTART, e.g. 20260217T140000, 2026-02-17T14:00:00, 20260217T220000Z or 20260217
    #[arg(short, long)]
    start: String,
    /// IANA timezone for floating date-times (e.g. America/New_York)
    #[arg(long, env = "RECUR_TZ")]
    tz: Option<String>,
}

impl StartArgs {
    fn value(&self, text: &str) -> Result<Temporal> {
        Temporal::parse(text, self.tz.as_deref())
            .with_context(|| format!("Failed to read date/time '{}'", text))
    }

    fn start(&self) -> Result<Temporal> {
        self.value(&self.start)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DstPolicyArg {
    Skip,
    ShiftForward,
    WallClock,
}

impl From<DstPolicyArg> for DstPolicy {
    fn from(arg: DstPolicyArg) -> Self {
        match arg {
            DstPolicyArg::Skip => DstPolicy::Skip,
            DstPolicyArg::ShiftForward => DstPolicy::ShiftForward,
            DstPolicyArg::WallClock => DstPolicy::WallClock,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Parse { rule, json } => {
            let rule = parse_rule(&rule)?;
            if json {
                let value = serde_json::json!({
                    "rule": rule.to_string(),
                    "frequency": rule.frequency(),
                    "interval": rule.interval(),
                    "count": rule.count(),
                    "until": rule.until().map(Temporal::to_ical),
                    "by_rules": rule.by_rules().iter().map(ToString::to_string).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", rule);
            }
        }
        Commands::Expand {
            rule,
            start,
            limit,
            exdates,
            rdates,
            from,
            to,
            dst_policy,
            json,
        } => {
            let rule = parse_rule(&rule)?;
            let exdates = read_values(&start, &exdates)?;
            let rdates = read_values(&start, &rdates)?;

            let set = RecurrenceSet::new(start.start()?)
                .with_rule(rule)
                .with_options(StreamOptions {
                    dst_policy: dst_policy.into(),
                })
                .with_additions(&rdates)
                .and_then(|set| set.with_exceptions(&exdates))
                .context("EXDATE/RDATE values must be comparable with --start")?;
            debug!(
                additions = set.additions().len(),
                exceptions = set.exceptions().len(),
                "built recurrence set"
            );

            let occurrences: Vec<Temporal> = match (from, to) {
                (Some(from), Some(to)) => {
                    let from = start.value(&from)?;
                    let to = start.value(&to)?;
                    set.between(&from, &to)
                        .context("--from/--to must be comparable with --start")?
                        .into_iter()
                        .take(limit)
                        .collect()
                }
                _ => set.iter().take(limit).collect(),
            };

            if json {
                let values: Vec<String> = occurrences.iter().map(ToString::to_string).collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                for value in &occurrences {
                    println!("{}", value);
                }
            }
        }
        Commands::Validate {
            rule,
            start,
            overrides,
            json,
        } => {
            let mut rule = parse_rule(&rule)?;
            for value in read_values(&start, &overrides)? {
                rule.add_recurrence_override(value);
            }
            let errors = rule.errors(&ParentContext::new(start.start()?));

            if json {
                println!("{}", serde_json::to_string_pretty(&errors)?);
            } else if errors.is_empty() {
                println!("valid");
            } else {
                for error in &errors {
                    println!("{}", error);
                }
            }
            if !errors.is_empty() {
                process::exit(1);
            }
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_rule(text: &str) -> Result<RecurrenceRule> {
    recur_engine::parse(text).with_context(|| format!("Failed to parse rule '{}'", text))
}

fn read_values(start: &StartArgs, values: &[String]) -> Result<Vec<Temporal>> {
    values.iter().map(|value| start.value(value)).collect()
}
