use clap::{Parser, Subcommand};
use pn_app::{AppError, AppResult, project_service, resolve_plant};
use pn_network::{
    BalancePolicy, EquationSet, Network, ReportContext, Resolution, ResolveOptions,
    write_bindings, write_topology,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pn-cli")]
#[command(about = "PlantNet CLI - Plant equipment network topology resolver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate plant file syntax and structure
    Validate {
        /// Path to the plant YAML or JSON file
        project_path: PathBuf,
    },
    /// List bundles in a plant
    Bundles {
        /// Path to the plant YAML or JSON file
        project_path: PathBuf,
    },
    /// Resolve the network and print its topology
    Resolve {
        /// Path to the plant YAML or JSON file
        project_path: PathBuf,
        /// Fail when junction equations and unknown flows disagree
        #[arg(long)]
        deny_imbalance: bool,
    },
    /// Print port bindings and topology of the resolved network
    Dump {
        /// Path to the plant YAML or JSON file
        project_path: PathBuf,
        #[arg(long)]
        deny_imbalance: bool,
    },
    /// Run steps and print the flattened equations of the last one
    Equations {
        /// Path to the plant YAML or JSON file
        project_path: PathBuf,
        #[arg(long)]
        deny_imbalance: bool,
        /// Number of steps to run
        #[arg(long, default_value_t = 1)]
        steps: usize,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Bundles { project_path } => cmd_bundles(&project_path),
        Commands::Resolve {
            project_path,
            deny_imbalance,
        } => cmd_resolve(&project_path, options(deny_imbalance)),
        Commands::Dump {
            project_path,
            deny_imbalance,
        } => cmd_dump(&project_path, options(deny_imbalance)),
        Commands::Equations {
            project_path,
            deny_imbalance,
            steps,
        } => cmd_equations(&project_path, options(deny_imbalance), steps),
    }
}

fn options(deny_imbalance: bool) -> ResolveOptions {
    ResolveOptions {
        balance_policy: if deny_imbalance {
            BalancePolicy::Deny
        } else {
            BalancePolicy::Warn
        },
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating plant: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Plant is valid");
    Ok(())
}

fn cmd_bundles(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let bundles = project_service::list_bundles(&project);

    if bundles.is_empty() {
        println!("No bundles found in plant");
    } else {
        println!("Bundles in plant:");
        for bundle in bundles {
            let fluid = bundle
                .fluid
                .map(|f| format!("{:?}", f))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {} ({}) - {} paths ({} closed), {} components",
                bundle.name, fluid, bundle.path_count, bundle.closed_paths, bundle.component_count
            );
        }
    }
    Ok(())
}

fn load_and_resolve(project_path: &Path, options: ResolveOptions) -> AppResult<Network> {
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    let Resolution { network, warnings } = resolve_plant(&project, options)?;
    for warning in &warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(network)
}

fn cmd_resolve(project_path: &Path, options: ResolveOptions) -> AppResult<()> {
    let network = load_and_resolve(project_path, options)?;
    println!(
        "✓ Resolved {} logical paths in {} bundles ({} junctions, {} valves)",
        network.paths().len(),
        network.bundles().len(),
        network.junctions().len(),
        network.valves().len()
    );

    let mut ctx = ReportContext::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_topology(&mut ctx, &mut out, &network)?;
    out.flush()?;
    Ok(())
}

fn cmd_dump(project_path: &Path, options: ResolveOptions) -> AppResult<()> {
    let network = load_and_resolve(project_path, options)?;

    let mut ctx = ReportContext::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_bindings(&mut ctx, &mut out, network.graph())?;
    write_topology(&mut ctx, &mut out, &network)?;
    out.flush()?;
    Ok(())
}

fn cmd_equations(project_path: &Path, options: ResolveOptions, steps: usize) -> AppResult<()> {
    if steps == 0 {
        return Err(AppError::Network("at least one step is required".to_string()));
    }
    let mut network = load_and_resolve(project_path, options)?;

    let mut last = None;
    for step in 1..=steps {
        let outcome = network.step()?;
        for warning in &outcome.warnings {
            eprintln!("warning (step {}): {}", step, warning);
        }
        last = Some(outcome.equations);
    }

    if let Some(set) = last {
        print_equations(&network, &set)?;
    }
    Ok(())
}

fn print_equations(network: &Network, set: &EquationSet) -> AppResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let graph = network.graph();

    writeln!(out, "# equations ({} unknowns)", set.len())?;
    for eq in &set.equations {
        write!(
            out,
            "  [{:>3}] {} * {}",
            eq.unknown,
            eq.coeffo,
            graph.output_label(eq.output)
        )?;
        for term in &eq.terms {
            let upstream = set.unknowns[term.unknown];
            write!(out, " - {} * {}", term.coeff, graph.output_label(upstream))?;
        }
        writeln!(out, " = {}", eq.co)?;
    }
    out.flush()?;
    Ok(())
}
