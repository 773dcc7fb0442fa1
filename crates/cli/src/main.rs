use std::process::ExitCode;

use clap::Parser as CommandLine;
use parser::consts::DEFAULT_MAX_DEPTH;
use repl::{Options, Repl};

mod repl;

/// Parse SELECT statements and print them back in canonical form.
#[derive(CommandLine, Debug)]
#[command(name = "selectql", version)]
struct Args {
    /// A query, or a path to a `.sql` file. Starts a REPL when omitted.
    input: Option<String>,

    /// Print the token stream before parsing.
    #[arg(long)]
    tokens: bool,

    /// Print the outline of the syntax tree before the rendered statement.
    #[arg(long)]
    ast: bool,

    /// Maximum nesting of parenthesized or negated conditions.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = match args.verbose {
        true => "debug",
        false => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let repl = Repl::new(Options {
        show_tokens: args.tokens,
        show_ast: args.ast,
        max_depth: args.max_depth,
    });

    let Some(input) = args.input else {
        repl.run();
        return ExitCode::SUCCESS;
    };

    const FILE_EXT: &str = ".sql";
    let looks_like_file = input.to_lowercase().ends_with(FILE_EXT);

    let result = match looks_like_file {
        true => repl.eval_file(&input),
        false => repl.eval_command(&input),
    };

    repl.report(&result);

    match result.is_ok() {
        true => ExitCode::SUCCESS,
        false => ExitCode::FAILURE,
    }
}
