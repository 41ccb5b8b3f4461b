use std::io::{self, Write};
use std::path::PathBuf;

use owo_colors::OwoColorize;
use kotoba_interpreter::{Env, Interpreter, Result, Value};
use kotoba_lexer::Lexer;
use kotoba_syntax::ast::Node;
use kotoba_syntax::token::TokenKind;

use crate::common::{render_runtime_error, render_syntax_error};
use crate::loader::FileLoader;
use crate::pipeline;

pub fn start_repl(search_path: Vec<PathBuf>) {
    println!("{}", "Kotoba REPL. Type :help for help, :quit to exit.".bold().green());

    let mut interpreter = Interpreter::new().with_loader(FileLoader::new(search_path));
    let mut env = Env::new_root();

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { "言葉> ".cyan().to_string() } else { "... > ".cyan().to_string() };
        print!("{}", prompt);
        let _ = io::stdout().flush();

        let mut line = String::new();
        let n = match io::stdin().read_line(&mut line) {
            Ok(n) => n,
            Err(_) => { println!("<input error>"); break; }
        };
        if n == 0 { // EOF
            println!("\nさようなら.");
            break;
        }
        let trimmed = line.trim_end();

        if buffer.is_empty() && trimmed.starts_with(':') {
            match trimmed {
                ":quit" | ":q" | ":exit" => { println!("さようなら."); break; }
                ":help" | ":h" => {
                    println!("{}\n  {}  {}\n  {}  {}",
                        "Commands:".bold(),
                        ":help".yellow(), "Show this help",
                        ":quit".yellow(), "Exit the REPL");
                    println!("  {}  {}\n  {}  {}\n  {}  {}",
                        ":vars".yellow(), "List visible bindings",
                        ":builtins".yellow(), "List native functions",
                        ":reset".yellow(), "Clear bindings and the module cache");
                    println!("Type code to evaluate. Input continues until every '{{' and '(' is closed.");
                    continue;
                }
                ":vars" => { print_vars(&env); continue; }
                ":builtins" => { print_builtins(&interpreter); continue; }
                ":reset" => { interpreter.reset(); env = Env::new_root(); println!("{}", "State reset.".yellow()); continue; }
                _ => { println!("{}", "Unknown command. Type :help.".red()); continue; }
            }
        }

        buffer.push_str(&line);

        if !is_complete(&buffer) {
            continue;
        }

        match pipeline::compile(&buffer) {
            Ok(program) => match eval_input(&mut interpreter, &env, &program) {
                Ok(Some(val)) if val != Value::Unit => println!("{}", format!("{}", val).bright_blue()),
                Ok(_) => {}
                Err(e) => render_runtime_error(&e),
            },
            Err(e) => render_syntax_error(&buffer, &e),
        }

        buffer.clear();
    }
}

/// Run one REPL entry. Bare expressions are evaluated so their value can be shown.
fn eval_input(interpreter: &mut Interpreter, env: &Env, program: &Node) -> Result<Option<Value>> {
    let statements = match program {
        Node::Program { statements } => statements.as_slice(),
        other => std::slice::from_ref(other),
    };
    let mut last = None;
    for stmt in statements {
        last = match stmt {
            Node::Literal { .. }
            | Node::Identifier { .. }
            | Node::BinaryExpression { .. }
            | Node::CallExpression { .. }
            | Node::NewExpression { .. } => Some(interpreter.evaluate(stmt, env)?),
            _ => interpreter.execute(std::slice::from_ref(stmt), env)?,
        };
    }
    Ok(last)
}

fn print_vars(env: &Env) {
    let vars = env.visible();
    if vars.is_empty() { println!("{}", "<no vars>".dimmed()); return; }
    for (k, v, exported) in vars {
        let flag = if exported { " [公開]" } else { "" };
        println!("{} = {}{}", k.yellow(), format!("{}", v).bright_blue(), flag.dimmed());
    }
}

fn print_builtins(interp: &Interpreter) {
    for n in interp.builtin_names() { println!("{}", n.yellow()); }
}

fn is_complete(input: &str) -> bool {
    let mut lexer = Lexer::new(input);
    // A lexing error is reported by the real compile, not buffered forever.
    let tokens = match lexer.tokenize() { Ok(t) => t, Err(_) => return true };
    let mut paren = 0i32;
    let mut brace = 0i32;
    for tk in tokens.iter() {
        match &tk.kind {
            TokenKind::LParen => paren += 1,
            TokenKind::RParen => paren -= 1,
            TokenKind::LBrace => brace += 1,
            TokenKind::RBrace => brace -= 1,
            _ => {}
        }
    }
    paren <= 0 && brace <= 0
}
