//! Rubby Language CLI
//!
//! Command-line interface for inspecting how Rubby source is tokenized and
//! parsed.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

use rubby_lang::{parse, tokenize, Diagnostic, RubbyError, VERSION};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() == 1 {
        // No arguments: start REPL
        println!("Rubby v{} - Parser REPL", VERSION);
        println!("Type 'exit' to quit\n");
        repl();
        return;
    }

    let mut show_tokens = false;
    let mut show_help = false;
    let mut filename: Option<&String> = None;

    for arg in &args[1..] {
        match arg.as_str() {
            "--tokens" | "-t" => show_tokens = true,
            // Printing the tree is the default action for a file
            "--ast" | "-a" => {}
            "--help" | "-h" => show_help = true,
            _ if arg.starts_with('-') => {
                eprintln!("Unknown flag: {}", arg);
                print_usage();
                process::exit(1);
            }
            _ => filename = Some(arg),
        }
    }

    if show_help {
        print_help();
        return;
    }

    let Some(file) = filename else {
        eprintln!("Error: No input file specified");
        print_usage();
        process::exit(1);
    };

    let result = if show_tokens {
        show_file_tokens(file)
    } else {
        show_file_ast(file)
    };

    if let Err(message) = result {
        eprint!("{}", message);
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: rubby [OPTIONS] [script]");
    eprintln!("       rubby --help");
}

fn print_help() {
    println!("Rubby v{} - Lexer and parser for the Rubby language", VERSION);
    println!();
    println!("USAGE:");
    println!("    rubby [OPTIONS] [script]");
    println!();
    println!("OPTIONS:");
    println!("    -t, --tokens    Show tokenization output (lexer only)");
    println!("    -a, --ast       Show the parsed syntax tree (default)");
    println!("    -h, --help      Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("    rubby script.rby           Print the syntax tree of a script");
    println!("    rubby --tokens script.rby  Show tokens from lexer");
    println!("    rubby                      Start interactive REPL");
}

fn read_source(filename: &str) -> Result<String, String> {
    fs::read_to_string(filename).map_err(|e| format!("Failed to read file '{}': {}\n", filename, e))
}

fn render(error: RubbyError, source: &str) -> String {
    Diagnostic::with_source(error, source).format()
}

/// Show tokens from lexing a file
fn show_file_tokens(filename: &str) -> Result<(), String> {
    let source = read_source(filename)?;
    let tokens = tokenize(&source, Some(filename)).map_err(|e| render(e, &source))?;

    println!("Tokens for '{}':", filename);
    println!("{}", "=".repeat(60));

    for (i, token) in tokens.iter().enumerate() {
        println!(
            "{:4}: {:28} | {:?} @ {}",
            i,
            format!("{:?}", token.token_type),
            token.lexeme,
            token.location
        );
    }

    println!("{}", "=".repeat(60));
    println!("Total tokens: {}", tokens.len());

    Ok(())
}

/// Print the statements parsed from a file
fn show_file_ast(filename: &str) -> Result<(), String> {
    let source = read_source(filename)?;
    let ast = parse(&source, Some(filename)).map_err(|e| render(e, &source))?;

    for statement in &ast.statements {
        println!("{:#?}", statement);
    }

    Ok(())
}

/// A trimmed REPL line as a complete source line; comments need their newline
fn repl_source(input: &str) -> String {
    format!("{}\n", input)
}

/// Start an interactive REPL (Read-Parse-Print Loop)
fn repl() {
    let mut line_number = 1;

    loop {
        print!("rubby:{} > ", line_number);
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break, // EOF
            Ok(_) => {
                let input = input.trim();

                if input == "exit" || input == "quit" {
                    break;
                }

                if input.is_empty() {
                    continue;
                }

                match parse(&repl_source(input), Some("<repl>")) {
                    Ok(ast) => {
                        for statement in &ast.statements {
                            println!("{:#?}", statement);
                        }
                    }
                    Err(e) => eprint!("{}", render(e, input)),
                }

                line_number += 1;
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }

    println!("\nGoodbye!");
}
