// src/main.rs

// graph_compiler
// Validates, folds, samples and lowers single-variable expressions.

use clap::{Parser as ClapParser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use graph_compiler::{
    evaluator::{finite_samples, Evaluator, SampleRange},
    functions::{BinaryFunc, UnaryFunc, CONSTANTS},
    generate_tac, parse, prepare,
    pretty::render_tree,
    diagnostics::LogOnly,
    Diagnostic, Node, SymbolTable, TacSession,
};

#[derive(ClapParser, Debug)]
#[command(version, about = "Single-variable expression compiler", long_about = None)]
struct Cli {
    /// Lower bound of the sampling range.
    #[arg(long, default_value_t = -10.0, allow_negative_numbers = true, global = true)]
    min: f64,
    /// Upper bound of the sampling range.
    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true, global = true)]
    max: f64,
    /// Distance between sample points.
    #[arg(long, default_value_t = 0.1, global = true)]
    step: f64,

    /// With no command, starts an interactive session.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample an expression over the range and print `x y` pairs.
    Eval {
        #[arg(allow_hyphen_values = true)]
        expr: String,
    },
    /// Print the three-address code for an expression.
    Ir {
        #[arg(allow_hyphen_values = true)]
        expr: String,
    },
    /// Print the optimized syntax tree of an expression.
    Tree {
        #[arg(allow_hyphen_values = true)]
        expr: String,
    },
    /// Run a file of session commands, one per line.
    Run { file: PathBuf },
}

/// State carried between commands.
struct Session {
    symbols: SymbolTable,
    range: SampleRange,
    tac: TacSession,
}

enum Flow {
    Continue,
    Quit,
}

fn show_help() {
    println!("\n--- Commands ---\n");
    let commands = [
        ("<expr>", "validate, fold and sample an expression in x"),
        ("let NAME = <expr>", "store a constant (the expression may not use x)"),
        ("def NAME = <expr>", "store a function of x, referenced by NAME"),
        ("vars", "list variables"),
        ("funcs", "list functions"),
        ("show NAME", "print the tree of a stored function"),
        ("ir <expr>", "print three-address code"),
        ("tree <expr>", "print the optimized tree"),
        ("clear", "remove all variables and functions"),
        ("quit", "leave the session"),
    ];
    for (command, description) in commands.iter() {
        println!("  {:<20} {}", command, description);
    }
    let names: Vec<&str> = UnaryFunc::ALL.iter().map(|f| f.name()).collect();
    println!("\n  Functions: {}, {}, {}", names.join(", "), BinaryFunc::Max.name(), BinaryFunc::Min.name());
    println!("  Derivative: deriv(<expr>) or d(<expr>)");
    println!("  Constants: pi, e\n");
}

/// Parses, validates and folds an expression, turning diagnostics into an error.
fn compile_expression(input: &str) -> Result<Node, String> {
    let node = parse(input).map_err(|e| e.to_string())?;
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    prepare(node, &mut diagnostics).ok_or_else(|| join_diagnostics(&diagnostics))
}

fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; ")
}

fn is_reserved(name: &str) -> bool {
    name == "x"
        || CONSTANTS.contains_key(name)
        || UnaryFunc::from_name(name).is_some()
        || BinaryFunc::from_name(name).is_some()
        || name == "deriv"
        || name == "d"
}

/// Splits `NAME = EXPR`, checking that NAME is a usable identifier.
fn split_binding(rest: &str) -> Result<(&str, &str), String> {
    let (name, expr) = rest
        .split_once('=')
        .ok_or_else(|| "expected NAME = <expr>".to_string())?;
    let name = name.trim();
    let valid = name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !valid {
        return Err(format!("'{}' is not a valid name", name));
    }
    if is_reserved(name) {
        return Err(format!("'{}' is reserved", name));
    }
    Ok((name, expr))
}

// Session helper function to orchestrate one command.
fn process_input(input: &str, session: &mut Session) -> Result<Flow, String> {
    let (word, rest) = match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    };

    match word {
        "quit" | "exit" => return Ok(Flow::Quit),
        "help" => show_help(),
        "vars" => {
            if session.symbols.variable_count() == 0 {
                println!("No variables defined.");
            }
            for (name, value) in session.symbols.variables() {
                println!("  {} = {:.4}", name, value);
            }
        }
        "funcs" => {
            if session.symbols.function_count() == 0 {
                println!("No functions defined.");
            }
            for (name, body) in session.symbols.functions() {
                println!("  {}(x) = {}", name, body);
            }
        }
        "show" => {
            let body = session
                .symbols
                .lookup_function(rest)
                .ok_or_else(|| format!("Function '{}' not found.", rest))?;
            print!("{}", render_tree(body));
        }
        "clear" => {
            session.symbols.clear();
            println!("All variables and functions cleared.");
        }
        "let" => {
            let (name, expr) = split_binding(rest)?;
            let node = compile_expression(expr)?;
            if node.depends_on_var() {
                return Err("let requires an expression that does not use x".to_string());
            }
            let value = Evaluator::new(&session.symbols, &mut LogOnly).evaluate(&node, 0.0);
            session.symbols.store_variable(name, value).map_err(|e| e.to_string())?;
            println!("{} = {}", name, value);
        }
        "def" => {
            let (name, expr) = split_binding(rest)?;
            let node = compile_expression(expr)?;
            println!("{}(x) = {}", name, node);
            session.symbols.store_function(name, node).map_err(|e| e.to_string())?;
        }
        "ir" => {
            let node = compile_expression(rest)?;
            session.tac.reset();
            let mut out = String::new();
            let result = generate_tac(&node, &mut out, &mut session.tac);
            print!("{}", out);
            println!("result: {}", result);
        }
        "tree" => {
            let node = compile_expression(rest)?;
            print!("{}", render_tree(&node));
        }
        _ => {
            let node = compile_expression(input)?;
            sample_and_print(&node, &session.symbols, &session.range);
        }
    }
    Ok(Flow::Continue)
}

fn sample_and_print(node: &Node, symbols: &SymbolTable, range: &SampleRange) {
    // Runtime reports surface through the log.
    let samples = Evaluator::new(symbols, &mut LogOnly).sample(node, range);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for sample in finite_samples(&samples) {
        if writeln!(out, "{:.6} {:.6}", sample.x, sample.y).is_err() {
            return;
        }
    }
    let skipped = samples.len() - finite_samples(&samples).count();
    if skipped > 0 {
        eprintln!("({} of {} points undefined)", skipped, samples.len());
    }
}

// Interactive session
fn repl(session: &mut Session) {
    println!("graph_compiler session");
    println!("Enter expressions in x, 'help', or 'quit'");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        if std::io::stdout().flush().is_err() {
            break;
        }
        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input_str = input.trim();
        if input_str.is_empty() {
            continue;
        }

        match process_input(input_str, session) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => println!("Error: {}", e),
        }
    }
}

/// Runs every line of a command file, stopping at the first error.
fn run_script(path: &Path, session: &mut Session) -> Result<(), String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file '{}': {}", path.display(), e))?;

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match process_input(line, session) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => return Err(format!("line {}: {}", index + 1, e)),
        }
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let range = match SampleRange::new(cli.min, cli.max, cli.step) {
        Ok(range) => range,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    let mut session = Session {
        symbols: SymbolTable::new(),
        range,
        tac: TacSession::new(),
    };

    let result = match cli.command {
        None => {
            repl(&mut session);
            Ok(())
        }
        Some(Command::Run { file }) => run_script(&file, &mut session),
        Some(Command::Eval { expr }) => process_input(&expr, &mut session).map(|_| ()),
        Some(Command::Ir { expr }) => process_input(&format!("ir {}", expr), &mut session).map(|_| ()),
        Some(Command::Tree { expr }) => process_input(&format!("tree {}", expr), &mut session).map(|_| ()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
