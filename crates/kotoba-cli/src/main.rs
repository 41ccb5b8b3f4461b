mod common;
mod config;
mod loader;
mod pipeline;
mod repl;

use std::fs;
use std::path::Path;

use clap::Parser;
use owo_colors::OwoColorize;
use kotoba_interpreter::Interpreter;
use tracing::info;

use crate::common::{render_runtime_error, render_syntax_error};
use crate::config::{Cli, Emit};
use crate::loader::FileLoader;

/// Log to stderr. KOTOBA_LOG wins over the -v level.
fn init_tracing(default_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("KOTOBA_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
        .with(filter)
        .init();
}

fn fail(msg: String) -> ! {
    eprintln!("{}: {}", "error".red().bold(), msg.red());
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.default_log_level());

    let Some(path) = cli.file.as_deref() else {
        let cwd = std::env::current_dir().ok();
        repl::start_repl(cli.search_path(cwd.as_deref()));
        return;
    };
    if !path.exists() {
        fail(format!("File not found: {}", path.display()));
    }
    let src = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => fail(format!("Failed to read {}: {}", path.display(), e)),
    };

    match cli.emit {
        Emit::Parse => {
            let tree = pipeline::parse(&src).unwrap_or_else(|e| {
                render_syntax_error(&src, &e);
                std::process::exit(1);
            });
            print_json(&tree);
        }
        Emit::Ast => {
            let program = compile_or_exit(&src);
            print_json(&program);
        }
        Emit::Run => {
            let program = compile_or_exit(&src);
            let script_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let search_path = cli.search_path(Some(&script_dir));
            info!(file = %path.display(), modules = ?search_path, "running script");
            let mut interp = Interpreter::new().with_loader(FileLoader::new(search_path));
            if let Err(e) = interp.run(&program) {
                render_runtime_error(&e);
                std::process::exit(1);
            }
        }
    }
}

fn compile_or_exit(src: &str) -> kotoba_syntax::ast::Node {
    pipeline::compile(src).unwrap_or_else(|e| {
        render_syntax_error(src, &e);
        std::process::exit(1);
    })
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("Failed to serialize output: {}", e)),
    }
}
