//! `function-msgraph`: render one function invocation offline.
//!
//! Usage:
//!   function-msgraph --directory <fixture.json> [--config <config.toml>]
//!
//! The request document is read from stdin and the response written to
//! stdout.

use function_msgraph::cli::{build_function, init_tracing, load_config, parse_args, run};
use std::io::{self, Read, Write};

fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_filter);

    let function = match build_function(&args, config) {
        Ok(function) => function,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match runtime.block_on(run(&function, buf.trim())) {
        Ok(response) => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{response}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
