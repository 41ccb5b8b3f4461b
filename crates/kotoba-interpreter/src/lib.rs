//! Kotoba interpreter: executes lowered AST nodes with a tree-walking interpreter.
//!
//! Statements run against a chain of shared, mutable scopes ([`Env`]). Script
//! output goes through an [`OutputSink`], native functions come from a
//! [`Builtins`] registry, and `取込` is served by a [`ModuleLoader`]. All three
//! are supplied by the embedder.

pub mod builtins;
pub mod env;
pub mod error;
mod eval;
mod flow;
pub mod interpreter;
pub mod module;
pub mod output;
mod stack;
pub mod value;

pub use builtins::{Builtins, CallContext, NativeFn};
pub use env::Env;
pub use error::{Result, RuntimeError};
pub use interpreter::Interpreter;
pub use module::{Exports, MemoryModules, ModuleLoader, NoModules};
pub use output::{CaptureSink, OutputSink, StdoutSink};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use kotoba_lexer::Lexer;
    use kotoba_parser::Parser;
    use kotoba_syntax::ast::Node;

    fn compile(input: &str) -> Node {
        let tokens = Lexer::new(input).tokenize().expect("Lexing should succeed");
        let tree = Parser::new(tokens).parse_program().expect("Parsing should succeed");
        kotoba_lower::lower(&tree).expect("Lowering should succeed")
    }

    fn run_program(input: &str) -> (Result<Option<Value>>, Vec<String>) {
        let sink = CaptureSink::new();
        let mut interpreter = Interpreter::new().with_output(sink.clone());
        let result = interpreter.run(&compile(input));
        (result, sink.lines())
    }

    fn expect_value(input: &str, expected: Value) {
        match run_program(input).0 {
            Ok(Some(actual)) => assert_eq!(actual, expected, "Program: {}", input),
            Ok(None) => panic!("Expected value but got None for: {}", input),
            Err(e) => panic!("Program failed: {}\nInput: {}", e, input),
        }
    }

    fn expect_output(input: &str, expected: &[&str]) {
        let (result, lines) = run_program(input);
        if let Err(e) = result {
            panic!("Program failed: {}\nInput: {}", e, input);
        }
        assert_eq!(lines, expected, "Program: {}", input);
    }

    fn expect_error(input: &str) -> RuntimeError {
        match run_program(input).0 {
            Ok(_) => panic!("Expected error but program succeeded: {}", input),
            Err(e) => e,
        }
    }

    #[test]
    fn test_greeting_end_to_end() {
        let (result, lines) = run_program("関数 挨拶 ( 名前 ) {\n名前 を 表示\n名前 を 返却\n}\n「Kevin」 を 挨拶 を 返却");
        assert_eq!(lines, vec!["Kevin"]);
        assert_eq!(result.unwrap(), Some(Value::from("Kevin")));
    }

    #[test]
    fn test_literal_values_and_display() {
        expect_value("42 を 返却", Value::Number(42.0));
        expect_value("真 を 返却", Value::Bool(true));
        expect_value("「こんにちは」 を 返却", Value::from("こんにちは"));
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Bool(false).to_string(), "偽");
        assert_eq!(Value::Unit.to_string(), "<無>");
    }

    #[test]
    fn test_arithmetic_operations() {
        expect_value("1 + 2 * 3 を 返却", Value::Number(7.0));
        expect_value("(1 + 2) * 3 を 返却", Value::Number(9.0));
        expect_value("7 - 10 を 返却", Value::Number(-3.0));
        expect_value("1 / 4 を 返却", Value::Number(0.25));
        expect_value("1 / 0 を 返却", Value::Number(f64::INFINITY));
    }

    #[test]
    fn test_string_concatenation_and_mixed_add() {
        expect_value("「a」 + 「b」 を 返却", Value::from("ab"));
        assert!(matches!(expect_error("1 + 「b」 を 返却"), RuntimeError::TypeError(_)));
        assert!(matches!(expect_error("「a」 * 2 を 返却"), RuntimeError::TypeError(_)));
    }

    #[test]
    fn test_comparison_operations() {
        expect_value("5 > 3 を 返却", Value::Bool(true));
        expect_value("3 >= 3 を 返却", Value::Bool(true));
        expect_value("「a」 < 「b」 を 返却", Value::Bool(true));
        expect_value("1 == 1 を 返却", Value::Bool(true));
        expect_value("「x」 != 「x」 を 返却", Value::Bool(false));
        expect_value("1 == 「1」 を 返却", Value::Bool(false));
        assert!(matches!(expect_error("1 < 「b」 を 返却"), RuntimeError::TypeError(_)));
    }

    #[test]
    fn test_if_else_and_truthiness() {
        expect_output("0 なら { 「t」 を 表示 } 他 { 「f」 を 表示 }", &["f"]);
        expect_output("「」 なら { 「t」 を 表示 } 他 { 「f」 を 表示 }", &["f"]);
        expect_output("「x」 なら { 「t」 を 表示 }", &["t"]);
        expect_output(
            "宣言 x は 2\nx == 1 なら { 「one」 を 表示 } 他 x == 2 なら { 「two」 を 表示 } 他 { 「many」 を 表示 }",
            &["two"],
        );
    }

    #[test]
    fn test_enum_ordinals() {
        let env = Env::new_root();
        let mut interpreter = Interpreter::new().with_output(CaptureSink::new());
        interpreter.run_with_env(&compile("列挙 色 { 赤, 緑, 青 }"), &env).unwrap();
        match env.get("色") {
            Some(Value::Enum(e)) => {
                assert_eq!(e.ordinal("赤"), Some(0));
                assert_eq!(e.ordinal("緑"), Some(1));
                assert_eq!(e.ordinal("青"), Some(2));
            }
            other => panic!("Expected enum, got {:?}", other),
        }
        expect_value("列挙 色 { 赤, 緑, 青 }\n色.青 を 返却", Value::Number(2.0));
        assert!(matches!(expect_error("列挙 色 { 赤 }\n色.紫 を 返却"), RuntimeError::UndefinedVariable(_)));
    }

    #[test]
    fn test_pattern_matching_first_match_wins() {
        for (subject, expected) in [("1", "one"), ("2", "two"), ("3", "other")] {
            let source = format!(
                "宣言 x は {}\nx を 判別 {{ 1 場合 {{ 「one」 を 表示 }} 2 場合 {{ 「two」 を 表示 }} 他 {{ 「other」 を 表示 }} }}",
                subject
            );
            expect_output(&source, &[expected]);
        }
    }

    #[test]
    fn test_pattern_guards() {
        expect_output(
            "宣言 x は 5\nx を 判別 { 5 場合 もし x > 10 { 「big」 を 表示 } 5 場合 { 「five」 を 表示 } 他 { 「other」 を 表示 } }",
            &["five"],
        );
        expect_output("「z」 を 判別 { 「a」 場合 { 「a」 を 表示 } }", &[]);
    }

    #[test]
    fn test_try_catch() {
        expect_output("試み { 「boom」 を 投げる } 捕捉 ( e ) { e を 表示 }", &["boom"]);
        expect_output(
            "関数 爆発 () { 「boom」 を 投げる\n「unreached」 を 表示 }\n試み { () を 爆発 } 捕捉 ( e ) { e を 表示 }",
            &["boom"],
        );
        match expect_error("「boom」 を 投げる") {
            RuntimeError::Exception(v) => assert_eq!(v, Value::from("boom")),
            other => panic!("Expected exception, got {:?}", other),
        }
        // Interpreter errors are not catchable
        assert!(matches!(
            expect_error("試み { 未定義 を 表示 } 捕捉 ( e ) { 「caught」 を 表示 }"),
            RuntimeError::UndefinedVariable(_)
        ));
        // A throw inside the catch block propagates
        assert!(matches!(
            expect_error("試み { 1 を 投げる } 捕捉 ( e ) { e + 1 を 投げる }"),
            RuntimeError::Exception(Value::Number(n)) if n == 2.0
        ));
    }

    #[test]
    fn test_loop_declarations_do_not_leak() {
        expect_value("定義 i は 0\ni < 3 繰返 { 宣言 内 は i\n定義 i は i + 1 }\ni を 返却", Value::Number(3.0));
        match expect_error("定義 i は 0\ni < 3 繰返 { 宣言 内 は i\n定義 i は i + 1 }\n内 を 表示") {
            RuntimeError::UndefinedVariable(name) => assert_eq!(name, "内"),
            other => panic!("Expected undefined variable, got {:?}", other),
        }
    }

    #[test]
    fn test_parameters_do_not_touch_outer_bindings() {
        expect_value(
            "宣言 名前 は 「outer」\n関数 f ( 名前 ) { 名前 を 返却 }\n「inner」 を f\n名前 を 返却",
            Value::from("outer"),
        );
        expect_value("関数 f ( a, b ) { a - b を 返却 }\n(10, 4) を f を 返却", Value::Number(6.0));
        assert!(matches!(expect_error("関数 f ( a ) { }\n() を f"), RuntimeError::TypeError(_)));
    }

    #[test]
    fn test_closures_observe_mutation() {
        expect_value("定義 数 は 0\n関数 読む () { 数 を 返却 }\n定義 数 は 5\n() を 読む を 返却", Value::Number(5.0));
        expect_value(
            "定義 数 は 0\n関数 増やす () { 定義 数 は 数 + 1 }\n() を 増やす\n() を 増やす\n数 を 返却",
            Value::Number(2.0),
        );
        expect_value("宣言 数 は 0\n関数 影 () { 宣言 数 は 99 }\n() を 影\n数 を 返却", Value::Number(0.0));
    }

    #[test]
    fn test_recursion() {
        expect_value(
            "関数 階乗 ( n ) { n <= 1 なら { 1 を 返却 }\nn * (n - 1 を 階乗) を 返却 }\n5 を 階乗 を 返却",
            Value::Number(120.0),
        );
    }

    #[test]
    fn test_classes_and_inheritance() {
        let source = "構造 動物 {\n宣言 名前 は 「無名」\n宣言 声 は 「...」\n関数 鳴く () { (自身.名前, 「: 」, 自身.声) を 連結 を 返却 }\n}\n構造 犬 継承 動物 {\n宣言 声 は 「ワン」\n}\n宣言 ポチ は 生成 犬\n宣言 ポチ.名前 は 「ポチ」\n() を ポチ.鳴く を 返却";
        expect_value(source, Value::from("ポチ: ワン"));
        expect_output("構造 点 { 宣言 x は 1 }\n宣言 p は 生成 点\np を 表示\np.x を 表示", &["点 { x: 1 }", "1"]);
        expect_value("構造 点 { 宣言 x は 1 }\n生成 点 == 生成 点 を 返却", Value::Bool(true));
    }

    #[test]
    fn test_static_methods() {
        let source = "構造 計数器 {\n宣言 値 は 0\n静的 計数器.作成 { 生成 計数器 を 返却 }\n}\n静的 計数器.種類 { 「計数器」 を 返却 }\n宣言 c は () を 計数器.作成\n(c.値, () を 計数器.種類) を 連結 を 返却";
        expect_value(source, Value::from("0計数器"));
        assert!(matches!(expect_error("静的 幽霊.作成 { }"), RuntimeError::UnknownClass(_)));
    }

    #[test]
    fn test_static_method_must_name_its_class() {
        let err = expect_error("構造 甲 { 静的 乙.作成 { 1 を 返却 } }");
        match err {
            RuntimeError::TypeError(msg) => assert!(msg.contains("乙.作成"), "{}", msg),
            other => panic!("Expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_var_members_become_fields() {
        let source = "定義 名前 は 「global」\n構造 人 { 定義 名前 は 「field」 }\n宣言 p は 生成 人\n(名前, 「/」, p.名前) を 連結 を 返却";
        expect_value(source, Value::from("global/field"));
    }

    #[test]
    fn test_return_in_class_body_is_rejected() {
        assert!(matches!(expect_error("構造 甲 { 1 を 返却 }"), RuntimeError::TypeError(_)));
        assert!(matches!(expect_error("構造 甲 { 真 なら { 1 を 返却 } }\n生成 甲"), RuntimeError::TypeError(_)));
    }

    #[test]
    fn test_self_referencing_instances() {
        let node = "構造 節 { 宣言 自身.次 は 自身 }\n";
        expect_value(&format!("{}宣言 n は 生成 節\nn を 連結 を 返却", node), Value::from("節 { 次: <循環> }"));
        expect_output(&format!("{}宣言 n は 生成 節\nn を 表示", node), &["節 { 次: <循環> }"]);
        expect_value(&format!("{}宣言 a は 生成 節\n宣言 b は 生成 節\na == b を 返却", node), Value::Bool(true));

        let value = run_program(&format!("{}宣言 n は 生成 節\nn を 返却", node)).0.unwrap().unwrap();
        assert!(format!("{:?}", value).contains("節"));
    }

    #[test]
    fn test_unbounded_recursion_is_a_stack_overflow() {
        match expect_error("関数 f ( n ) { n を f }\n1 を f") {
            RuntimeError::StackOverflow { depth } => assert_eq!(depth, interpreter::DEFAULT_MAX_CALL_DEPTH),
            other => panic!("Expected stack overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_call_depth_limit() {
        let countdown = "関数 数え ( n ) { n <= 0 なら { 0 を 返却 }\nn - 1 を 数え を 返却 }\n";
        let mut interpreter = Interpreter::new().with_output(CaptureSink::new()).with_max_call_depth(10);
        let ok = compile(&format!("{}9 を 数え を 返却", countdown));
        assert_eq!(interpreter.run(&ok).unwrap(), Some(Value::Number(0.0)));
        let too_deep = compile(&format!("{}10 を 数え を 返却", countdown));
        assert!(matches!(interpreter.run(&too_deep), Err(RuntimeError::StackOverflow { depth: 10 })));
        // the depth counter unwinds with the error
        assert_eq!(interpreter.run(&ok).unwrap(), Some(Value::Number(0.0)));
        assert!(matches!(
            interpreter.run(&compile("構造 環 { 宣言 次 は 生成 環 }\n生成 環")),
            Err(RuntimeError::StackOverflow { .. })
        ));
    }

    #[test]
    fn test_type_checks() {
        expect_output("検査 1 は 数値\n検査 「a」 は string\n「ok」 を 表示", &["ok"]);
        expect_output("構造 動物 { }\n構造 犬 継承 動物 { }\n宣言 d は 生成 犬\n検査 d は 動物\n検査 d は 実体\n「ok」 を 表示", &["ok"]);
        assert!(matches!(expect_error("検査 1 は 文字列"), RuntimeError::TypeError(_)));
    }

    #[test]
    fn test_builtins() {
        expect_value("「あいう」 を 長さ を 返却", Value::Number(3.0));
        expect_value("(「abc」, 「b」) を 含む を 返却", Value::Bool(true));
        expect_value("(1, 「と」, 真) を 連結 を 返却", Value::from("1と真"));
        assert!(matches!(expect_error("1 を 長さ"), RuntimeError::TypeError(_)));

        let (result, lines) = run_program("公開 x は 1\n宣言 y は 「a」\n() を 調査");
        result.unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("x = 1 [公開]"));
        assert!(lines[0].contains("y = a"));
    }

    #[test]
    fn test_custom_builtin_registry() {
        fn double(_ctx: &mut CallContext<'_>, args: Vec<Value>) -> Result<Value> {
            match args.as_slice() {
                [Value::Number(n)] => Ok(Value::Number(n * 2.0)),
                _ => Err(RuntimeError::type_error("倍 expects a number")),
            }
        }
        let mut builtins = Builtins::empty();
        builtins.register("倍", double);
        let mut interpreter = Interpreter::new().with_builtins(builtins);
        assert_eq!(interpreter.builtin_names(), vec!["倍".to_string()]);
        assert_eq!(interpreter.run(&compile("4 を 倍 を 返却")).unwrap(), Some(Value::Number(8.0)));
        assert!(matches!(interpreter.run(&compile("1 を 表示")), Err(RuntimeError::UndefinedVariable(_))));
    }

    #[test]
    fn test_runtime_errors() {
        match expect_error("未定義 を 表示") {
            RuntimeError::UndefinedVariable(name) => assert_eq!(name, "未定義"),
            other => panic!("Expected undefined variable, got {:?}", other),
        }
        assert!(matches!(expect_error("宣言 p は 生成 幽霊"), RuntimeError::UnknownClass(_)));
        assert!(matches!(expect_error("構造 犬 継承 幽霊 { }"), RuntimeError::UnknownClass(_)));
        match expect_error("1 + 2") {
            RuntimeError::UnknownNodeKind(kind) => assert_eq!(kind, "BinaryExpression"),
            other => panic!("Expected unknown node kind, got {:?}", other),
        }
        let nested = Node::Program { statements: vec![Node::Program { statements: vec![] }] };
        assert!(matches!(Interpreter::new().run(&nested), Err(RuntimeError::UnknownNodeKind(_))));
    }

    #[test]
    fn test_top_level_return_stops_program() {
        let (result, lines) = run_program("1 を 返却\n「unreached」 を 表示");
        assert_eq!(result.unwrap(), Some(Value::Number(1.0)));
        assert!(lines.is_empty());
        assert_eq!(run_program("「x」 を 表示").0.unwrap(), None);
    }

    #[test]
    fn test_imports() {
        let modules = MemoryModules::new()
            .with_module("数学", compile("公開 円周率 は 3\n関数 二倍 ( x ) { x * 2 を 返却 }"));
        let mut interpreter = Interpreter::new().with_loader(modules);
        let program = compile("取込 数学\n取込 数学\n円周率 を 二倍 を 返却");
        assert_eq!(interpreter.run(&program).unwrap(), Some(Value::Number(6.0)));
        let exports = interpreter.load_module("数学").unwrap();
        assert!(exports.contains_key("円周率"));
        assert!(exports.contains_key("二倍"));

        assert!(matches!(Interpreter::new().run(&compile("取込 数学")), Err(RuntimeError::Module(_))));
    }

    #[test]
    fn test_cyclic_import_is_an_error() {
        let modules = MemoryModules::new()
            .with_module("甲", compile("取込 乙"))
            .with_module("乙", compile("取込 甲"));
        let mut interpreter = Interpreter::new().with_loader(modules);
        match interpreter.run(&compile("取込 甲")) {
            Err(RuntimeError::Module(msg)) => assert!(msg.contains("cyclic")),
            other => panic!("Expected module error, got {:?}", other),
        }
    }

    #[test]
    fn test_env_scoping() {
        let root = Env::new_root();
        root.define("x", Value::Number(1.0));
        let child = root.child();
        child.define("x", Value::Number(2.0));
        assert_eq!(root.get("x"), Some(Value::Number(1.0)));
        child.set_or_define("y", Value::Bool(true));
        assert_eq!(root.get("y"), None);
        let grandchild = child.child();
        grandchild.set_or_define("x", Value::Number(3.0));
        assert_eq!(child.get("x"), Some(Value::Number(3.0)));
        assert_eq!(root.get("x"), Some(Value::Number(1.0)));
        let visible: Vec<String> = grandchild.visible().into_iter().map(|(n, _, _)| n).collect();
        assert_eq!(visible, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_sealed_scope_keeps_var_local() {
        let root = Env::new_root();
        root.define("x", Value::Number(1.0));
        let sealed = root.sealed_child();
        sealed.set_or_define("x", Value::Number(2.0));
        assert_eq!(sealed.get("x"), Some(Value::Number(2.0)));
        assert_eq!(root.get("x"), Some(Value::Number(1.0)));
        // reads still see outer bindings
        root.define("y", Value::Bool(true));
        assert_eq!(sealed.get("y"), Some(Value::Bool(true)));
    }
}
