use clap::Parser;
use formula_substitution::{Engine, EvalContext};
use itertools::Itertools;

/// Simple runner: substitute `{=...}` formula placeholders in a text.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Text containing `{=expression}` placeholders
    text: String,
    /// Wildcard binding, e.g. --var x=5 (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,
    /// Wildcard bindings as a JSON object, e.g. '{"x": 5, "y": 2.5}'
    #[arg(long, value_name = "JSON")]
    context: Option<String>,
    /// Validate only; print one error per offending placeholder
    #[arg(long)]
    check: bool,
    /// Splice error messages in place instead of aborting on the first error
    #[arg(long)]
    lenient: bool,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    // Build the evaluation context from --context JSON and --var pairs.
    let mut ctx: EvalContext = match args.context.as_deref() {
        Some(json) => match serde_json::from_str(json) {
            Ok(ctx) => ctx,
            Err(e) => {
                eprintln!("Invalid context JSON: {e}");
                std::process::exit(1);
            }
        },
        None => EvalContext::new(),
    };
    for pair in &args.vars {
        let Some((name, value)) = pair.split_once('=') else {
            eprintln!("Invalid --var '{pair}': expected NAME=VALUE");
            std::process::exit(1);
        };
        match value.parse::<f64>() {
            Ok(v) => {
                ctx.bind(name, v);
            }
            Err(_) => {
                eprintln!("Invalid --var '{pair}': '{value}' is not a number");
                std::process::exit(1);
            }
        }
    }

    let engine = Engine::with_builtins();

    if args.check {
        match engine.validate(&args.text) {
            Ok(()) => println!("ok"),
            Err(errors) => {
                eprintln!("{}", errors.iter().join("\n"));
                std::process::exit(1);
            }
        }
        return;
    }

    if args.lenient {
        println!("{}", engine.substitute_lenient(&args.text, &ctx));
        return;
    }

    match engine.substitute(&args.text, &ctx) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
