use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use gqlbind::{compile, resolve_options, to_json, BindError, Bindings, CompilerOptions, DescriptorPool};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gqlbind")]
#[command(about = "Derive GraphQL binding declarations from protobuf descriptor sets", long_about = None)]
struct Cli {
    /// Raise log verbosity (`-v` debug, `-vv` trace); `RUST_LOG` overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower a descriptor set and print the bindings as JSON
    Lower {
        #[command(flatten)]
        source: Source,

        /// Output `.json` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Lower a descriptor set and only report problems
    Check {
        #[command(flatten)]
        source: Source,
    },

    /// Print every registration name, one per line
    Ledger {
        #[command(flatten)]
        source: Source,
    },
}

#[derive(Args)]
struct Source {
    /// Descriptor set JSON (`protoc --descriptor_set_out` converted to JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Directive namespace, e.g. `graphql` for `[graphql.skip]`
    #[arg(long)]
    namespace: Option<String>,

    /// Module qualifying types from files without a `goPackage` option
    #[arg(long)]
    default_module: Option<String>,
}

impl Source {
    /// Load the descriptor set; flags win over the set's own parameter.
    fn load(&self) -> Result<(DescriptorPool, CompilerOptions), BindError> {
        let text = fs::read_to_string(&self.input)?;
        let pool = DescriptorPool::from_json(&text)?;

        let mut options = resolve_options(&pool, CompilerOptions::default())?;
        if let Some(namespace) = &self.namespace {
            options.directive_namespace = namespace.clone();
        }
        if let Some(default_module) = &self.default_module {
            options.default_module = default_module.clone();
        }
        debug!("options: {:?}", options);
        Ok((pool, options))
    }

    fn lower(&self) -> Result<Bindings, BindError> {
        let (pool, options) = self.load()?;
        compile(&pool, &options)
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .try_init();
}

fn run(command: &Commands) -> Result<(), BindError> {
    match command {
        Commands::Lower { source, output } => {
            let bindings = source.lower()?;
            let json = to_json(&bindings)?;
            if let Some(out_path) = output {
                fs::write(out_path, &json)?;
                info!("Bindings written to {}", out_path.display());
            } else {
                println!("{}", json);
            }
            Ok(())
        }

        Commands::Check { source } => {
            let bindings = source.lower()?;
            println!(
                "{}: {} inputs, {} outputs, {} unions, {} enums, {} services",
                source.input.display(),
                bindings.inputs.len(),
                bindings.outputs.len(),
                bindings.oneofs.len(),
                bindings.enums.len(),
                bindings.services.len()
            );
            Ok(())
        }

        Commands::Ledger { source } => {
            let bindings = source.lower()?;
            for name in &bindings.ledger {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            for problem in e.errors() {
                error!("{}", problem);
            }
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
