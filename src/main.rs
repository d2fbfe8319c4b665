//! seomend - Iterative SEO remediation
//!
//! Command-line front end: dry-runs the remediation loop against simulated
//! sites, and inspects or exports the run log.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use seomend::reporting::{render_summary, ExportFormat, RunExporter};
use seomend::{
    IterationRecord, ProjectConfig, RemediationController, RemediationObserver, RunLog, Scenario,
    SeoError, SiteLock, StopReason,
};

#[derive(Parser)]
#[command(name = "seomend")]
#[command(version = "0.1.0")]
#[command(about = "Iterative SEO remediation: analyze, fix, re-analyze until the score target is met", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory holding .seomend/ (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the remediation loop against a simulated site
    Run {
        /// Scenario file (TOML) describing the simulated site
        #[arg(short, long)]
        scenario: PathBuf,

        /// Score at which to stop (50-100)
        #[arg(long)]
        target_score: Option<f64>,

        /// Maximum iterations (1-10)
        #[arg(short, long)]
        max_iterations: Option<u32>,

        /// Minimum improvement per iteration before stopping
        #[arg(long)]
        min_improvement: Option<f64>,

        /// Restrict fixes to this type. Can be specified multiple times.
        #[arg(long = "fix-type", value_name = "TYPE")]
        fix_types: Vec<String>,

        /// Maximum changes per iteration
        #[arg(long)]
        max_changes: Option<usize>,

        /// Skip the pre-remediation backup
        #[arg(long)]
        skip_backup: bool,

        /// Do not append the result to the run log
        #[arg(long)]
        no_log: bool,

        /// Output the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show logged runs
    History {
        /// Show last N runs (defaults to history.maxEntries)
        #[arg(short, long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        last: Option<usize>,

        /// Only runs for this site
        #[arg(long)]
        site: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Empty the run log
        #[arg(long, conflicts_with_all = ["last", "site", "json"])]
        clear: bool,
    },

    /// Export logged runs
    Export {
        /// Export format: json, jsonl, or csv
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or validate project configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the default settings file
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration files
    Validate,

    /// Show configuration file paths
    Paths,
}

/// Prints each iteration as it completes.
struct ConsoleObserver;

impl RemediationObserver for ConsoleObserver {
    fn on_start(&self, site_id: &str, initial_score: f64, target_score: f64) {
        println!(
            "{} {} starting at {:.1} (target {:.1})",
            "Remediating".cyan().bold(),
            site_id,
            initial_score,
            target_score
        );
    }

    fn on_iteration(&self, record: &IterationRecord) {
        let delta = format!("{:+.1}", record.improvement());
        let delta = if record.improvement() > 0.0 {
            delta.green()
        } else {
            delta.yellow()
        };
        println!(
            "   iteration {}: {:.1} -> {:.1} ({}) fixes {}/{}",
            record.iteration_number(),
            record.score_before(),
            record.score_after(),
            delta,
            record.fixes_successful(),
            record.fixes_attempted()
        );
    }
}

fn fail(err: &SeoError) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);
    if err.is_precondition() {
        eprintln!("   Nothing was changed on the site.");
    }
    std::process::exit(err.exit_code());
}

fn load_config(project_path: &Path) -> ProjectConfig {
    ProjectConfig::load(project_path).unwrap_or_else(|e| fail(&e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "seomend=debug,info"
    } else {
        "seomend=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Resolve project path
    let project_path = cli.project.canonicalize().unwrap_or(cli.project.clone());

    if !project_path.exists() {
        eprintln!(
            "{} Project directory does not exist: {}",
            "Error:".red().bold(),
            project_path.display()
        );
        std::process::exit(1);
    }

    match cli.command {
        Commands::Run {
            scenario,
            target_score,
            max_iterations,
            min_improvement,
            fix_types,
            max_changes,
            skip_backup,
            no_log,
            json,
        } => {
            let project_config = load_config(&project_path);

            // CLI flags override settings.json
            let mut config = project_config.remediation.clone();
            if let Some(score) = target_score {
                config = config.with_target_score(score);
            }
            if let Some(max) = max_iterations {
                config = config.with_max_iterations(max);
            }
            if let Some(threshold) = min_improvement {
                config = config.with_min_improvement(threshold);
            }
            if !fix_types.is_empty() {
                config = config.with_fix_types(fix_types);
            }
            if let Some(max) = max_changes {
                config = config.with_max_changes(max);
            }
            if skip_backup {
                config = config.with_skip_backup(true);
            }
            if let Err(e) = config.validate() {
                fail(&e);
            }

            let scenario = Scenario::load(&scenario).unwrap_or_else(|e| fail(&e));

            let locks_dir = ProjectConfig::locks_dir(&project_path);
            let lock =
                SiteLock::acquire(&locks_dir, &scenario.site_id).unwrap_or_else(|e| fail(&e));
            tracing::debug!(
                site_id = lock.site_id(),
                path = %lock.path().display(),
                "Site lock acquired"
            );

            let mut controller = RemediationController::new(scenario.dependencies());
            if !json {
                controller = controller.with_observer(Arc::new(ConsoleObserver));
            }

            let result = controller
                .run(&scenario.site_id, &config)
                .await
                .unwrap_or_else(|e| fail(&e));

            if project_config.history.enabled && !no_log {
                let log = RunLog::new(ProjectConfig::runs_path(&project_path));
                if let Err(e) = log.append(&result) {
                    tracing::warn!("Failed to log run: {e}");
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let status = if result.stopped_reason.is_success() {
                    "OK".green().bold()
                } else if result.stopped_reason == StopReason::Error {
                    "FAILED".red().bold()
                } else {
                    "STOPPED".yellow().bold()
                };
                println!("\n{} {}", status, render_summary(&result).trim_end());
            }
        }

        Commands::History {
            last,
            site,
            json,
            clear,
        } => {
            let project_config = load_config(&project_path);
            let log = RunLog::new(ProjectConfig::runs_path(&project_path));

            if clear {
                log.clear()?;
                println!("{} Run log cleared", "OK".green().bold());
                return Ok(());
            }

            let limit = last.unwrap_or(project_config.history.max_entries);
            let runs = match site {
                Some(ref site) => {
                    let mut runs = log.for_site(site)?;
                    runs.reverse();
                    runs.truncate(limit);
                    runs
                }
                None => log.recent(limit)?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else if runs.is_empty() {
                println!("{} No runs logged yet", "Note:".yellow());
            } else {
                for run in &runs {
                    println!(
                        "{}  {}  {:.1} -> {:.1}  {} ({} iteration(s))",
                        run.finished_at.format("%Y-%m-%d %H:%M:%S"),
                        run.site_id.bold(),
                        run.initial_score,
                        run.final_score,
                        run.stopped_reason,
                        run.iterations_completed
                    );
                }
            }
        }

        Commands::Export { format, output } => {
            let format: ExportFormat = match format.parse() {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    std::process::exit(1);
                }
            };

            let runs = RunLog::new(ProjectConfig::runs_path(&project_path)).load()?;
            let data = RunExporter::export(&runs, format)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, data)?;
                    println!(
                        "{} Exported {} run(s) to {}",
                        "OK".green().bold(),
                        runs.len(),
                        path.display()
                    );
                }
                None => println!("{data}"),
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                let config = load_config(&project_path);
                if json {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                } else {
                    let r = &config.remediation;
                    println!("{}", "Remediation".cyan().bold());
                    println!("   Target score: {}", r.target_score);
                    println!("   Max iterations: {}", r.max_iterations);
                    println!("   Min improvement: {}", r.min_improvement_threshold);
                    println!(
                        "   Fix types: {}",
                        r.fix_types
                            .as_ref()
                            .map(|t| t.iter().cloned().collect::<Vec<_>>().join(", "))
                            .unwrap_or_else(|| "all".to_string())
                    );
                    println!("   Max changes per iteration: {}", r.max_changes_per_iteration);
                    println!("   Skip backup: {}", r.skip_backup);
                    println!("{}", "History".cyan().bold());
                    println!("   Enabled: {}", config.history.enabled);
                    println!("   Max entries: {}", config.history.max_entries);
                }
            }

            ConfigAction::Init { force } => {
                let path = ProjectConfig::settings_path(&project_path);
                if path.exists() && !force {
                    eprintln!(
                        "{} {} already exists (use --force to overwrite)",
                        "Error:".red().bold(),
                        path.display()
                    );
                    std::process::exit(1);
                }
                ProjectConfig::default()
                    .save(&project_path)
                    .unwrap_or_else(|e| fail(&e));
                println!("{} Wrote {}", "OK".green().bold(), path.display());
            }

            ConfigAction::Validate => {
                let config = load_config(&project_path);
                match config.validate() {
                    Ok(()) => println!("{} Configuration is valid", "OK".green().bold()),
                    Err(e) => fail(&e),
                }
            }

            ConfigAction::Paths => {
                println!(
                    "Settings: {}",
                    ProjectConfig::settings_path(&project_path).display()
                );
                println!(
                    "Run log:  {}",
                    ProjectConfig::runs_path(&project_path).display()
                );
                println!(
                    "Locks:    {}",
                    ProjectConfig::locks_dir(&project_path).display()
                );
            }
        },
    }

    Ok(())
}
