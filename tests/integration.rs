//! End-to-end tests over real files on disk: document declarations through
//! the public `Engine` API and assert on the bytes left behind.

use docweave::narrative::{FileNarrativeProvider, FixedNarrativeProvider};
use docweave::{Engine, Error, MutationReason, Narrative};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

fn fixed_provider() -> FixedNarrativeProvider {
    FixedNarrativeProvider::new(Narrative {
        what: "Does X".to_string(),
        why: "Because Y".to_string(),
        guardrails: vec!["Do not Z".to_string()],
    })
}

#[test]
fn python_docstring_holds_all_five_pieces() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "app.py",
        "import os\n\n\ndef resolve(x):\n    return helper(x)\n",
    );
    let engine = Engine::with_defaults().unwrap();

    let result = engine.document(&path, 4, &fixed_provider()).unwrap();
    assert!(result.success);

    let after = read(&path);
    assert!(after.contains("    \"\"\""));
    assert!(after.contains("    What:"));
    assert!(after.contains("      Does X"));
    assert!(after.contains("      Because Y"));
    assert!(after.contains("      - Do not Z"));
    assert!(after.contains("      calls: helper"));
    assert!(after.contains("      imports: os"));
    // Temp dirs have no tracked history, so the sentinel appears.
    assert!(after.contains("        - no history available"));
    assert!(after.ends_with("    return helper(x)\n"));

    let block = engine.inspect(&path, 4).unwrap();
    assert!(block.is_some());
}

#[test]
fn documenting_twice_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "app.py", "def f():\n    return 1\n");
    let engine = Engine::with_defaults().unwrap();

    engine.document(&path, 1, &fixed_provider()).unwrap();
    let first = read(&path);
    assert_eq!(first.matches("What:").count(), 1);

    engine.document(&path, 1, &fixed_provider()).unwrap();
    let second = read(&path);
    assert_eq!(first, second);
}

#[test]
fn existing_narrative_survives_metadata_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "app.py",
        concat!(
            "import os\n\n\n",
            "def resolve(x):\n",
            "    \"\"\"\n",
            "    What:\n",
            "      Old prose stays.\n",
            "    Why:\n",
            "      It matters.\n",
            "    Metadata:\n",
            "      calls: stale_name\n",
            "    \"\"\"\n",
            "    return helper(x)\n",
        ),
    );
    let engine = Engine::with_defaults().unwrap();

    // The provider must never be consulted for an already-documented
    // declaration; a poisoned narrative proves it.
    let poisoned = FixedNarrativeProvider::new(Narrative {
        what: "MUST NOT APPEAR".to_string(),
        why: "MUST NOT APPEAR".to_string(),
        guardrails: Vec::new(),
    });
    let result = engine.document(&path, 4, &poisoned).unwrap();
    assert!(result.success);

    let after = read(&path);
    assert!(after.contains("Old prose stays."));
    assert!(after.contains("It matters."));
    assert!(!after.contains("MUST NOT APPEAR"));
    assert!(!after.contains("stale_name"));
    assert!(after.contains("calls: helper"));
    assert!(after.contains("imports: os"));
}

#[test]
fn rust_doc_lines_land_above_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "lib.rs", "fn main() {\n    helper();\n}\n\nfn helper() {}\n");
    let engine = Engine::with_defaults().unwrap();

    let result = engine.document(&path, 1, &fixed_provider()).unwrap();
    assert!(result.success);

    let after = read(&path);
    assert!(after.starts_with("/// What:"));
    assert!(after.contains("///   Does X"));
    assert!(after.contains("///   calls: helper"));
    assert!(after.contains("fn main() {"));
    assert!(after.contains("fn helper() {}"));
}

#[test]
fn rust_documenting_twice_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "lib.rs",
        "#[inline]\nfn run() {\n    helper();\n}\n\nfn helper() {}\n",
    );
    let engine = Engine::with_defaults().unwrap();

    let summary = engine.document_file(&path, &fixed_provider()).unwrap();
    assert_eq!(summary.documented, 2);
    let first = read(&path);
    assert_eq!(first.matches("What:").count(), 2);
    assert!(first.contains("#[inline]"));

    engine.document_file(&path, &fixed_provider()).unwrap();
    let second = read(&path);
    assert_eq!(first, second);
}

#[test]
fn rust_attribute_does_not_orphan_existing_doc() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "lib.rs", "/// Original prose\n#[inline]\nfn run() {}\n");
    let engine = Engine::with_defaults().unwrap();

    let poisoned = FixedNarrativeProvider::new(Narrative {
        what: "MUST NOT APPEAR".to_string(),
        why: "MUST NOT APPEAR".to_string(),
        guardrails: Vec::new(),
    });
    let result = engine.document(&path, 3, &poisoned).unwrap();
    assert!(result.success);

    let after = read(&path);
    assert!(after.contains("Original prose"));
    assert!(!after.contains("MUST NOT APPEAR"));
    assert_eq!(after.matches("Metadata:").count(), 1);
    // The attribute stays glued to the header, below the doc block.
    assert!(after.contains("#[inline]\nfn run() {}"));
}

#[test]
fn rust_narrative_survives_metadata_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "lib.rs",
        concat!(
            "/// What:\n",
            "///   Old prose stays.\n",
            "/// Why:\n",
            "///   It matters.\n",
            "fn run() {\n",
            "    helper();\n",
            "}\n",
            "\n",
            "fn helper() {}\n",
        ),
    );
    let engine = Engine::with_defaults().unwrap();

    let poisoned = FixedNarrativeProvider::new(Narrative {
        what: "MUST NOT APPEAR".to_string(),
        why: "MUST NOT APPEAR".to_string(),
        guardrails: Vec::new(),
    });
    let result = engine.document(&path, 5, &poisoned).unwrap();
    assert!(result.success);

    let after = read(&path);
    assert!(after.contains("Old prose stays."));
    assert!(after.contains("It matters."));
    assert!(!after.contains("MUST NOT APPEAR"));
    assert!(after.contains("calls: helper"));
}

#[test]
fn rust_invalid_composition_never_reaches_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let content = "fn f() {}\n";
    let path = write_file(&dir, "lib.rs", content);
    let engine = Engine::with_defaults().unwrap();
    let adapter = engine.registry().get_by_path(&path).unwrap();

    let broken = "fn f( {\n}\n".to_string();
    let composed = docweave::mutate::ComposedMutation::new(&path, broken);
    let outcome = composed.validate(|candidate| adapter.validate_syntax(candidate));
    assert!(matches!(outcome, Err(Error::SyntaxInvalid { .. })));
    assert_eq!(read(&path), content);
}

#[test]
fn javascript_block_comment_lands_above_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "app.js",
        "function greet(name) {\n  return format(name);\n}\n",
    );
    let engine = Engine::with_defaults().unwrap();

    let result = engine.document(&path, 1, &fixed_provider()).unwrap();
    assert!(result.success);

    let after = read(&path);
    assert!(after.starts_with("/**\n"));
    assert!(after.contains(" * What:"));
    assert!(after.contains(" *   calls: format"));
    assert!(after.contains(" */\nfunction greet(name) {"));
}

#[test]
fn go_line_comments_land_above_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "main.go",
        "package main\n\nfunc Greet() string {\n\treturn format()\n}\n",
    );
    let engine = Engine::with_defaults().unwrap();

    let result = engine.document(&path, 3, &fixed_provider()).unwrap();
    assert!(result.success);

    let after = read(&path);
    assert!(after.contains("// What:\n"));
    assert!(after.contains("//   calls: format"));
    assert!(after.contains("func Greet() string {"));
}

#[test]
fn go_directive_comment_survives_documentation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "main.go",
        "package main\n\n//go:noinline\nfunc Run() {}\n",
    );
    let engine = Engine::with_defaults().unwrap();

    let result = engine.document(&path, 4, &fixed_provider()).unwrap();
    assert!(result.success);

    let after = read(&path);
    assert!(after.contains("//go:noinline\nfunc Run() {}"));
    assert_eq!(after.matches("What:").count(), 1);
    // The doc run sits above the directive, never absorbing it.
    assert!(after.contains("// What:"));
}

#[test]
fn crlf_files_keep_their_line_endings() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "app.py", "def f():\r\n    return 1\r\n");
    let engine = Engine::with_defaults().unwrap();

    let result = engine.document(&path, 1, &fixed_provider()).unwrap();
    assert!(result.success);

    let after = read(&path);
    assert!(after.contains("What:"));
    // Every newline in the committed file is still CRLF.
    assert!(after.split("\r\n").all(|segment| !segment.contains('\n')));
}

#[test]
fn off_by_one_line_is_a_skip_not_a_crash() {
    let dir = tempfile::tempdir().unwrap();
    let content = "x = 1\n\ndef f():\n    return 1\n";
    let path = write_file(&dir, "app.py", content);
    let engine = Engine::with_defaults().unwrap();

    let result = engine.document(&path, 2, &fixed_provider()).unwrap();
    assert!(!result.success);
    assert_eq!(result.reason, MutationReason::DeclarationNotFound);
    assert_eq!(read(&path), content);
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "notes.txt", "def f():\n    pass\n");
    let engine = Engine::with_defaults().unwrap();

    let err = engine.document(&path, 1, &fixed_provider()).unwrap_err();
    assert!(matches!(err, Error::Unsupported { .. }));
}

#[test]
fn document_file_reaches_every_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "app.py",
        "def alpha():\n    return 1\n\n\ndef beta():\n    return alpha()\n",
    );
    let narratives = write_file(
        &dir,
        "narratives.json",
        r#"{
            "alpha": {"what": "First", "why": "Because"},
            "beta": {"what": "Second", "why": "Because"}
        }"#,
    );
    let provider = FileNarrativeProvider::load(&narratives).unwrap();
    let engine = Engine::with_defaults().unwrap();

    let summary = engine.document_file(&path, &provider).unwrap();
    assert_eq!(summary.documented, 2);
    assert_eq!(summary.skipped, 0);

    let after = read(&path);
    assert_eq!(after.matches("What:").count(), 2);
    assert!(after.contains("First"));
    assert!(after.contains("Second"));
    // Bottom-up processing must leave both bodies intact.
    assert!(after.contains("    return 1"));
    assert!(after.contains("    return alpha()"));
}

#[test]
fn missing_narrative_entry_skips_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "app.py",
        "def alpha():\n    return 1\n\n\ndef beta():\n    return 2\n",
    );
    let narratives = write_file(
        &dir,
        "narratives.json",
        r#"{"alpha": {"what": "First", "why": "Because"}}"#,
    );
    let provider = FileNarrativeProvider::load(&narratives).unwrap();
    let engine = Engine::with_defaults().unwrap();

    let summary = engine.document_file(&path, &provider).unwrap();
    assert_eq!(summary.documented, 1);
    assert_eq!(summary.skipped, 1);

    let after = read(&path);
    assert!(after.contains("First"));
    assert!(after.contains("def beta():\n    return 2"));
}

#[test]
fn invalid_composition_never_reaches_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let content = "def f():\n    return 1\n";
    let path = write_file(&dir, "app.py", content);
    let engine = Engine::with_defaults().unwrap();
    let adapter = engine.registry().get_by_path(&path).unwrap();

    let broken = "def f(:\n    return 1\n".to_string();
    let composed = docweave::mutate::ComposedMutation::new(&path, broken);
    let outcome = composed.validate(|candidate| adapter.validate_syntax(candidate));
    assert!(matches!(outcome, Err(Error::SyntaxInvalid { .. })));
    assert_eq!(read(&path), content);
}

#[test]
fn metadata_query_is_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "app.py",
        "import sys\nimport os\n\n\ndef work():\n    b()\n    a()\n    b()\n",
    );
    let engine = Engine::with_defaults().unwrap();

    let first = engine.metadata(&path, "work").unwrap();
    let second = engine.metadata(&path, "work").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.calls, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(first.imports, vec!["os".to_string(), "sys".to_string()]);
}
