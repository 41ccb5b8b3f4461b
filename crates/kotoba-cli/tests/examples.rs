use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.parent().unwrap().parent().unwrap().to_path_buf()
}

fn kotoba() -> Command {
    let mut cmd = Command::cargo_bin("kotoba").unwrap();
    cmd.env_remove("KOTOBA_PATH").env_remove("KOTOBA_LOG");
    cmd
}

#[test]
fn runs_greet_demo() {
    let root = workspace_root();
    let mut cmd = kotoba();
    cmd.arg(root.join("demos/greet.ktb"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("こんにちは、Kevin"))
        .stdout(predicate::str::contains("5! = 120"));
}

#[test]
fn runs_classes_demo() {
    let root = workspace_root();
    let mut cmd = kotoba();
    cmd.arg(root.join("demos/classes.ktb"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ポチ: ワン"))
        .stdout(predicate::str::contains("青 = 2"));
}

#[test]
fn runs_match_demo() {
    let root = workspace_root();
    let mut cmd = kotoba();
    cmd.arg(root.join("demos/match.ktb"));
    cmd.assert()
        .success()
        .stdout(predicate::str::diff("one\ntwo\nother\n合格\n"));
}

#[test]
fn uncaught_type_error_exits_nonzero_after_caught_exception() {
    let root = workspace_root();
    let mut cmd = kotoba();
    cmd.arg(root.join("demos/errors.ktb"));
    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("5\n捕捉: ゼロ除算"))
        .stdout(predicate::str::contains("ここには来ない").not())
        .stderr(predicate::str::contains("Type error"));
}

#[test]
fn imports_from_script_directory() {
    let root = workspace_root();
    let mut cmd = kotoba();
    cmd.arg(root.join("demos/modules/main.ktb"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("6.28"))
        .stdout(predicate::str::contains("円周率 = 3.14"));
}

#[test]
fn module_path_flag_and_env_are_searched() {
    let lib_dir = tempfile::tempdir().unwrap();
    std::fs::write(lib_dir.path().join("util.ktb"), "公開 挨拶文 は 「やあ」\n").unwrap();
    let script_dir = tempfile::tempdir().unwrap();
    let script = script_dir.path().join("main.ktb");
    std::fs::write(&script, "取込 util\n挨拶文 を 表示\n").unwrap();

    kotoba().arg(&script).assert().failure().stderr(predicate::str::contains("module 'util' not found"));

    kotoba()
        .arg("-I")
        .arg(lib_dir.path())
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("やあ"));

    kotoba()
        .env("KOTOBA_PATH", lib_dir.path())
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("やあ"));
}

#[test]
fn cyclic_import_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.ktb"), "取込 b\n").unwrap();
    std::fs::write(dir.path().join("b.ktb"), "取込 a\n").unwrap();
    let main = dir.path().join("main.ktb");
    std::fs::write(&main, "取込 a\n").unwrap();

    kotoba().arg(&main).assert().failure().stderr(predicate::str::contains("cyclic import"));
}

#[test]
fn runaway_recursion_reports_stack_overflow() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.ktb");
    std::fs::write(&path, "関数 f ( n ) { n を f }\n1 を f\n").unwrap();

    kotoba()
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Stack overflow"));
}

#[test]
fn emits_ast_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ast.ktb");
    std::fs::write(&path, "宣言 x は 1\n").unwrap();

    kotoba()
        .arg("--emit")
        .arg("ast")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"VariableDeclaration\""))
        .stdout(predicate::str::contains("\"kind\": \"let\""));

    kotoba()
        .arg("--emit")
        .arg("parse")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"宣言\""));
}

#[test]
fn parse_error_is_nonzero() {
    let bad = "関数 x (\n"; // malformed on purpose
    let tmp_dir = tempfile::tempdir().unwrap();
    let bad_path = tmp_dir.path().join("bad.ktb");
    std::fs::write(&bad_path, bad).unwrap();

    let mut cmd = kotoba();
    cmd.arg(bad_path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn missing_file_is_nonzero() {
    kotoba()
        .arg("does-not-exist.ktb")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn repl_evaluates_piped_input() {
    assert_cmd::Command::from_std(kotoba())
        .write_stdin("宣言 x は 20\nx + 22\n:quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("42"));
}
