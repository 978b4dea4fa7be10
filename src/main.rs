use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::info;

use loxide::context::Context;
use loxide::interpreter::Interpreter;
use loxide::parser::Parser;
use loxide::scanner::Scanner;

#[derive(ClapParser, Debug)]
#[command(version, about = "Tree-walking interpreter for a small scripting language", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a file, printing each token's debug tuple
    Tokenize { filename: PathBuf },

    /// Runs a script file, or starts a REPL when no file is given
    Run { filename: Option<PathBuf> },
}

fn read_file(filename: &PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);

    std::fs::read_to_string(filename).context(format!("Failed to read file {:?}", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Write to file with the module path (crate prefix stripped) and line.
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("loxide::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .init();

    info!("Logger initialized, writing to app.log");

    Ok(())
}

/// Print collected static diagnostics to stderr.
fn report_static_errors(ctx: &Context) {
    for error in ctx.static_errors() {
        eprintln!("{}", error);
    }
}

/// Run one chunk of source through the full pipeline, labelling each stage.
/// Returns `false` when static errors prevented execution.
fn run_source<W: Write>(source: &str, ctx: &mut Context, interpreter: &mut Interpreter<W>) -> bool {
    ctx.set_stage("scanning");
    let tokens = Scanner::new(source, ctx).scan_tokens();

    if ctx.has_static_errors() {
        report_static_errors(ctx);
        return false;
    }

    ctx.set_stage("parsing");
    let statements = Parser::new(&tokens, ctx).parse();

    if ctx.has_static_errors() {
        report_static_errors(ctx);
        return false;
    }

    ctx.set_stage("executing");
    interpreter.interpret(&statements, ctx);

    for error in ctx.runtime_errors() {
        eprintln!("{}", error);
    }

    true
}

fn run_file(filename: &PathBuf) -> Result<()> {
    let source = read_file(filename)?;

    let mut ctx = Context::new();
    let mut interpreter = Interpreter::new();

    if !run_source(&source, &mut ctx, &mut interpreter) {
        std::process::exit(65);
    }

    if ctx.has_runtime_errors() {
        std::process::exit(70);
    }

    Ok(())
}

fn run_repl() -> Result<()> {
    let exit_commands = ["quit", "exit"];

    println!("Enter quit or exit to leave the repl");

    // The interpreter and its global scope persist across lines; the
    // diagnostics collector is cleared between them.
    let mut ctx = Context::new();
    let mut interpreter = Interpreter::new();

    let stdin = io::stdin();

    loop {
        print!("lox> ");
        io::stdout().flush()?;

        let mut line = String::new();

        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let line = line.trim_end();

        if exit_commands.contains(&line) {
            break;
        }

        run_source(line, &mut ctx, &mut interpreter);
        ctx.clear();
    }

    Ok(())
}

fn tokenize_file(filename: &PathBuf) -> Result<()> {
    let source = read_file(filename)?;

    let mut ctx = Context::new();
    ctx.set_stage("scanning");

    let tokens = Scanner::new(&source, &mut ctx).scan_tokens();

    for token in &tokens {
        println!("{}", token);
    }

    if ctx.has_static_errors() {
        report_static_errors(&ctx);
        std::process::exit(65);
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match &args.command {
        Commands::Tokenize { filename } => tokenize_file(filename),

        Commands::Run {
            filename: Some(filename),
        } => run_file(filename),

        Commands::Run { filename: None } => run_repl(),
    }
}
