use owo_colors::OwoColorize;

use kotoba_interpreter::RuntimeError;
use kotoba_syntax::error::Error;

/// Print a syntax error with the offending source line and a caret.
pub fn render_syntax_error(source: &str, err: &Error) {
    eprintln!("{}: {}", err.kind.label().red().bold(), err.msg.red());
    if let (Some(line), Some(col)) = (err.line, err.col) {
        eprintln!("  --> line {}, column {}", line, col);
        if let Some(src_line) = source.lines().nth(line.saturating_sub(1)) {
            let line_num_str = format!("{:3} | ", line);
            eprintln!("     |");
            eprintln!("{}{}", line_num_str.bright_black(), src_line);

            let mut marker = " ".repeat(line_num_str.len());
            // Columns count characters, and CJK text is double width in a terminal.
            let width: usize = src_line.chars().take(col.saturating_sub(1)).map(display_width).sum();
            marker.push_str(&" ".repeat(width));
            marker.push('^');
            eprintln!("{}{}", marker.red(), " error here".red());
            eprintln!("     |");
        }
    }
    provide_error_suggestions(&err.msg);
}

pub fn render_runtime_error(err: &RuntimeError) {
    eprintln!("{}: {}", err.label().red().bold(), err.to_string().red());
    provide_error_suggestions(&err.to_string());
}

fn display_width(c: char) -> usize {
    if c.is_ascii() {
        1
    } else {
        2
    }
}

pub fn provide_error_suggestions(err_msg: &str) {
    if err_msg.contains("Undefined variable") {
        eprintln!("{}", "Help: Did you forget to declare this name with 宣言 or 定義?".yellow());
        eprintln!("    {}", "Example: 宣言 x は 42".bright_black());
    } else if err_msg.contains("Unknown class") {
        eprintln!("{}", "Help: Classes must be declared with 構造 before 生成 or 継承 uses them.".yellow());
        eprintln!("    {}", "Example: 構造 犬 { 宣言 名前 は 「ポチ」 }".bright_black());
    } else if err_msg.contains("cannot apply '+'") {
        eprintln!("{}", "Help: '+' adds two numbers or joins two strings.".yellow());
        eprintln!("    {}", "Use 連結 to join values of different types: (「数: 」, 1) を 連結".bright_black());
    } else if err_msg.contains("cannot apply") {
        eprintln!("{}", "Help: Arithmetic and ordering work only on numbers (and strings for < >).".yellow());
    } else if err_msg.contains("expected") && err_msg.contains("args") {
        eprintln!("{}", "Help: Function called with the wrong number of arguments.".yellow());
        eprintln!("    {}", "Pass several arguments as a group: (a, b) を 関数名".bright_black());
    } else if err_msg.contains("Uncaught exception") {
        eprintln!("{}", "Help: Wrap the code in 試み { ... } 捕捉 ( e ) { ... } to handle it.".yellow());
    } else if err_msg.contains("Stack overflow") {
        eprintln!("{}", "Help: Calls nest too deeply. Check that recursion reaches its stopping case.".yellow());
    } else if err_msg.contains("cyclic import") {
        eprintln!("{}", "Help: Two modules import each other. Move the shared part into a third module.".yellow());
    } else if err_msg.contains("not found (searched") {
        eprintln!("{}", "Help: Modules are looked up as <dir>/<name>.ktb.".yellow());
        eprintln!("    {}", "Add directories with -I <dir> or KOTOBA_PATH=dir1:dir2".bright_black());
    } else if err_msg.contains("after 'を'") {
        eprintln!("{}", "Help: 'を' must be followed by a function name, 返却, 投げる or 判別.".yellow());
    } else if err_msg.contains("Unterminated string") {
        eprintln!("{}", "Help: String is missing its closing quote.".yellow());
        eprintln!("    {}", "Make sure every 「 has a matching 」 and every \" a matching \"".bright_black());
    } else if err_msg.contains("Unexpected '='") {
        eprintln!("{}", "Help: Bind with は and compare with ==.".yellow());
        eprintln!("    {}", "Example: 宣言 x は 1".bright_black());
    } else if err_msg.contains("Expected '}'") {
        eprintln!("{}", "Help: A block is missing its closing '}'.".yellow());
    } else if err_msg.contains("Expected") {
        eprintln!("{}", "Help: Missing required syntax element.".yellow());
    }
}
