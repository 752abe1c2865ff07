use clap::Parser;
use cli_table::{Cell, Style, Table, print_stdout};
use colored::Colorize;
use engine::Error;
use engine::engine::Database;
use engine::sql::QueryResult;
use rustyline::error::ReadlineError;

const DEMO_TABLE: &str = "CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR, email VARCHAR UNIQUE)";

/// Interactive console for the in-memory database
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Start without the demo `users` table
    #[arg(long)]
    no_demo: bool,

    /// Print results as plain text instead of a grid
    #[arg(long)]
    plain: bool,
}

fn main() {
    let args = Args::parse();
    let mut db = Database::new();

    if !args.no_demo
        && let Err(e) = db.execute_sql(DEMO_TABLE)
    {
        eprintln!("Failed to create demo table: {}", e);
    }

    let mut rl = match rustyline::DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to start line editor: {}", e);
            return;
        }
    };

    println!("Simple RDBMS - Interactive Mode");
    println!("Type 'exit' to quit\n");

    loop {
        match rl.readline("sql> ") {
            Ok(line) => {
                let input = line.trim();
                if input.eq_ignore_ascii_case("exit") {
                    println!("Goodbye!");
                    break;
                }
                if input.is_empty() {
                    continue;
                }
                if let Err(e) = rl.add_history_entry(input) {
                    eprintln!("Failed to save history: {}", e);
                }

                match db.execute_sql(input) {
                    Ok(result) => print_result(result, args.plain),
                    Err(Error::UnknownCommand) => println!("{}", "Unknown command".yellow()),
                    Err(e) => println!("{} {}", "Error:".red().bold(), e),
                }
                println!();
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Failed to read line: {}", e);
                break;
            }
        }
    }
}

fn print_result(result: QueryResult, plain: bool) {
    match result {
        QueryResult::Message(msg) => println!("{}", msg.green()),
        QueryResult::Data(resp) if plain || resp.is_empty() => println!("{}", resp),
        QueryResult::Data(resp) => {
            let table = resp
                .values()
                .map(|row| {
                    row.iter()
                        .map(|field| match field {
                            Some(value) => value.to_string().cell(),
                            None => "NULL".dimmed().to_string().cell(),
                        })
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
                .table()
                .title(
                    resp.columns
                        .iter()
                        .map(|col| col.cell().bold(true))
                        .collect::<Vec<_>>(),
                );

            if let Err(e) = print_stdout(table) {
                eprintln!("Failed to print table: {}", e);
            }
            println!("{} row(s)", resp.len());
        }
    }
}
