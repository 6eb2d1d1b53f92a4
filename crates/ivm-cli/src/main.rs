//! Intrinsic VM - CLI
//!
//! Invoke one intrinsic on fixture snippets from the command line:
//!
//! ```text
//! ivm is-array "([1, 2])"
//! ivm call "(function(a, b) { return a + b; })" undefined 2 3
//! ```

use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ivm_core::{Interpreter, IntrinsicCallable, IntrinsicId, TaggedValue, VmConfig};
use ivm_fixture::Factory;

#[derive(Parser)]
#[command(name = "ivm")]
#[command(about = "Invoke a VM intrinsic through compiled bytecode")]
#[command(version)]
struct Cli {
    /// Intrinsic to invoke, e.g. `is-array` or `IsArray`
    #[arg(required_unless_present = "list")]
    intrinsic: Option<IntrinsicId>,

    /// Arguments, each a fixture snippet such as `42`, `({ x: 1 })` or `new Date()`
    #[arg(allow_hyphen_values = true)]
    args: Vec<String>,

    /// List every intrinsic with its arity
    #[arg(long)]
    list: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,

    /// Print the forwarding program before running it
    #[arg(long)]
    disassemble: bool,

    /// Bound on nested `call` invocations
    #[arg(long)]
    max_call_depth: Option<usize>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if cli.list {
        print_intrinsics();
        return Ok(());
    }
    let Some(id) = cli.intrinsic else {
        bail!("no intrinsic given");
    };
    if !id.is_supported() {
        bail!("intrinsic `{}` is not invocable from bytecode", id);
    }

    let mut config = VmConfig::default();
    if let Some(depth) = cli.max_call_depth {
        config.max_call_depth = depth;
    }

    let factory = Factory::new();
    let args = cli
        .args
        .iter()
        .map(|script| {
            factory
                .new_object(script)
                .with_context(|| format!("invalid argument `{}`", script))
        })
        .collect::<Result<Vec<TaggedValue>>>()?;

    let interpreter = Interpreter::new(config);
    let callable = IntrinsicCallable::new(&interpreter, id);
    if cli.disassemble {
        let program = callable
            .program(args.len())
            .with_context(|| format!("{} failed to compile", id))?;
        print!("{}", program);
    }
    let result = callable
        .try_call(args)
        .with_context(|| format!("{} failed", id))?;
    println!("{}", result);
    Ok(())
}

fn print_intrinsics() {
    for id in IntrinsicId::ALL {
        let support = if id.is_supported() { "" } else { "  (not invocable)" };
        println!(
            "{:<12} %{:<11} {}{}",
            id.name(),
            id.runtime_name(),
            id.arity(),
            support
        );
    }
}
