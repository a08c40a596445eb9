//! Weft CLI
//!
//! Line-oriented scripting over a text-completion service.

use weftc::{check_file, dump_file, run_file};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "run" => {
            let mut trace = false;
            let mut file_path = None;
            for arg in args.iter().skip(2) {
                if arg == "--trace" || arg == "-t" {
                    trace = true;
                } else if !arg.starts_with('-') && file_path.is_none() {
                    file_path = Some(arg.as_str());
                }
            }
            let Some(path) = file_path else {
                eprintln!("error: missing file path");
                eprintln!("Usage: weft run <file.weft> [--trace]");
                std::process::exit(1);
            };
            if run_file(path, trace).is_err() {
                std::process::exit(1);
            }
        }
        "check" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: weft check <file.weft>");
                std::process::exit(1);
            };
            if check_file(path).is_err() {
                std::process::exit(1);
            }
        }
        "dump" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: weft dump <file.weft>");
                std::process::exit(1);
            };
            if dump_file(path).is_err() {
                std::process::exit(1);
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("error: unknown command `{other}`");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("WEFT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    println!("Usage: weft <command> [arguments]");
    println!();
    println!("Commands:");
    println!("  run <file.weft> [--trace]   Execute a script");
    println!("  check <file.weft>           Load and classify without executing");
    println!("  dump <file.weft>            Print the classified program and symbols");
    println!();
    println!("Environment:");
    println!("  WEFT_LOG                    Tracing filter (e.g. weft_eval=debug)");
}
