//! named-fmt CLI
//!
//! Usage:
//!   named-fmt [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --context <FILE>   Context file with values and options (TOML format)
//!   -s, --set <KEY=VALUE>  Bind a value, dotted keys create nested tables
//!   --missing <POLICY>     throw-error, replace-with-fallback or ignore
//!   --fallback <TEXT>      Substitute TEXT for unresolved keys
//!   --open <C>, --close <C> Parameter delimiters
//!   --deferred             Print the composite template and its values
//!   --keys                 List parameter keys instead of rendering
//!   -d, --debug            Log render steps to stderr
//!   -h, --help             Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use named_fmt::context::single_char;
use named_fmt::{
    list_parameter_keys, render_deferred, render_with_config, Context, MissingKeyPolicy,
    RenderConfig, RenderError,
};

#[derive(Parser)]
#[command(name = "named-fmt")]
#[command(about = "Fill named {key} placeholders in a template")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Context file with values and options (TOML format)
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// Bind a value as key=value; may be repeated
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// What to do with keys that have no value
    #[arg(long, value_name = "POLICY")]
    missing: Option<MissingKeyPolicy>,

    /// Text substituted for keys that have no value
    #[arg(long, value_name = "TEXT")]
    fallback: Option<String>,

    /// Opening parameter delimiter
    #[arg(long, value_name = "C")]
    open: Option<String>,

    /// Closing parameter delimiter
    #[arg(long, value_name = "C")]
    close: Option<String>,

    /// Print the composite template followed by its numbered values
    #[arg(long)]
    deferred: bool,

    /// List parameter keys, one per line
    #[arg(long, conflicts_with = "deferred")]
    keys: bool,

    /// Log render steps to stderr (level via RUST_LOG)
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    // Load context
    let mut context = match &cli.context {
        Some(path) => match Context::from_file(path) {
            Ok(c) => c,
            Err(e) => fail(&format!(
                "Error loading context '{}': {}",
                path.display(),
                e
            )),
        },
        None => Context::default(),
    };

    for binding in &cli.set {
        if let Err(e) = context.bind(binding) {
            fail(&format!("Error: {}", e));
        }
    }

    if let Some(open) = &cli.open {
        context.delimiters.open = single_char(open).unwrap_or_else(|e| fail(&e.to_string()));
    }
    if let Some(close) = &cli.close {
        context.delimiters.close = single_char(close).unwrap_or_else(|e| fail(&e.to_string()));
    }

    // Read template
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => fail(&format!("Error reading file '{}': {}", path.display(), e)),
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => fail(&format!("Error reading from stdin: {}", e)),
            }
        }
    };

    let mut config = context.render_config();
    if let Some(fallback) = &cli.fallback {
        config = config.with_fallback(fallback.as_str());
    }
    if let Some(policy) = cli.missing {
        config = config.with_policy(policy);
    }

    if let Err(e) = run(&cli, &context, &config, &source) {
        eprint!("{}", e.report(&source, &filename));
        process::exit(1);
    }
}

fn run(
    cli: &Cli,
    context: &Context,
    config: &RenderConfig,
    source: &str,
) -> Result<(), RenderError> {
    if cli.keys {
        for key in list_parameter_keys(source, config.delimiters) {
            println!("{}", key?);
        }
        return Ok(());
    }

    let resolver = context.resolver();
    if cli.deferred {
        let composite = render_deferred(source, &resolver, config)?;
        println!("{}", composite.format);
        for (index, value) in composite.values.iter().enumerate() {
            println!("{}: {}", index, value);
        }
    } else {
        print!("{}", render_with_config(source, &resolver, config)?);
    }
    Ok(())
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}
