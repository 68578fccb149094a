//! Run the harness binary against shell scripts standing for the halo2 tools.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Copies the circuit source as its "verification key", honoring the `-vk` option.
const FAKE_KEYGEN: &str = r#"circuit="$1"
shift
vk="data/vk.bin"
while [ "$#" -gt 0 ]; do
    case "$1" in
        -vk) vk="$2"; shift 2 ;;
        *) shift ;;
    esac
done
cp "$circuit" "$vk"
"#;

/// Writes the source of `SimpleAdd.gate.ts` for its own test and garbage for any other.
const FAKE_REFERENCE_TEST: &str = r#"case "$1" in
    tests::gate::test_simple_add) cp ../work/circuits/SimpleAdd.gate.ts vk.bin ;;
    *) echo "reference" > vk.bin ;;
esac
"#;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("halo2_vk_harness_test")
        .join("fake_tools_run")
        .join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap_or_else(|e| panic!("Could not remove dir {dir:?}: {e}"));
    }
    fs::create_dir_all(dir.join("work").join("circuits"))
        .unwrap_or_else(|e| panic!("Could not create dir {dir:?}: {e}"));
    fs::create_dir_all(dir.join("reference")).unwrap();
    fs::write(dir.join("fake_keygen.sh"), FAKE_KEYGEN).unwrap();
    fs::write(dir.join("fake_reference_test.sh"), FAKE_REFERENCE_TEST).unwrap();

    dir
}

fn write_circuit(dir: &Path, file_name: &str, source: &str) {
    fs::write(dir.join("work").join("circuits").join(file_name), source).unwrap();
}

fn run_harness(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_halo2-vk-harness"))
        .current_dir(dir)
        .args(["--work-directory", "work"])
        .args(args)
        .env(
            "KEYGEN_COMMAND",
            format!("sh {}", dir.join("fake_keygen.sh").display()),
        )
        .env("CIRCUIT_SCAFFOLD", "")
        .env(
            "REFERENCE_TEST_COMMAND",
            format!("sh {}", dir.join("fake_reference_test.sh").display()),
        )
        .env("REFERENCE_WORK_DIRECTORY", "../reference")
        .env("REFERENCE_VK_PATH", "../reference/vk.bin")
        .env_remove("RUN_MODE")
        .output()
        .expect("failed to run halo2-vk-harness")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn scan_reports_constant_folding_mismatches() {
    let dir = temp_dir("scan_reports_constant_folding_mismatches");
    write_circuit(&dir, "SimpleAdd.ts", "add(witness(1), witness(2));");
    write_circuit(&dir, "RangeCheck.gate.ts", "rangeCheck(witness(3), constant(8));");

    let output = run_harness(&dir, &[]);

    let stdout = stdout(&output);
    assert_eq!(Some(1), output.status.code(), "stdout: {stdout}");
    assert!(stdout.contains("passed: [simple_add]"), "stdout: {stdout}");
    assert!(stdout.contains("failed: [range_check]"), "stdout: {stdout}");
    assert_eq!(
        "rangeCheck(witness(3), 8);",
        fs::read_to_string(
            dir.join("work")
                .join("circuits")
                .join("constant.RangeCheck.gate.ts")
        )
        .unwrap()
    );

    let second_output = run_harness(&dir, &[]);
    let second_stdout = self::stdout(&second_output);
    assert!(
        second_stdout.contains("passed: [simple_add]\nfailed: [range_check]\n"),
        "generated variants should not be tested, stdout: {second_stdout}"
    );
}

#[test]
fn scan_succeeds_when_every_key_matches() {
    let dir = temp_dir("scan_succeeds_when_every_key_matches");
    write_circuit(&dir, "SimpleAdd.ts", "add(witness(1), witness(2));");
    write_circuit(&dir, "MulAdd.ts", "mulAdd(witness(1), witness(2), witness(3));");

    let output = run_harness(&dir, &["--remove-transformed"]);

    let stdout = stdout(&output);
    assert_eq!(Some(0), output.status.code(), "stdout: {stdout}");
    assert!(stdout.contains("passed: [mul_add, simple_add]"), "stdout: {stdout}");
    assert!(stdout.contains("failed: []"), "stdout: {stdout}");
    assert!(!dir.join("work/circuits/constant.SimpleAdd.ts").exists());
}

#[test]
fn single_target_never_sets_the_failure_exit_code() {
    let dir = temp_dir("single_target_never_sets_the_failure_exit_code");
    write_circuit(&dir, "RangeCheck.gate.ts", "rangeCheck(witness(3), constant(8));");
    write_circuit(&dir, "SimpleAdd.ts", "add(witness(1), witness(2));");

    let output = run_harness(&dir, &["RangeCheck.gate"]);

    let stdout = stdout(&output);
    assert_eq!(Some(0), output.status.code(), "stdout: {stdout}");
    assert!(stdout.contains("Testing range_check"), "stdout: {stdout}");
    assert!(stdout.contains("range_check: failed"), "stdout: {stdout}");
    assert!(!stdout.contains("simple_add"), "stdout: {stdout}");
}

#[test]
fn reference_protocol_compares_with_the_reference_tests() {
    let dir = temp_dir("reference_protocol_compares_with_the_reference_tests");
    write_circuit(&dir, "SimpleAdd.gate.ts", "add(witness(1), witness(2));");
    write_circuit(&dir, "MulAdd.range.ts", "mulAdd(witness(1), witness(2), witness(3));");
    write_circuit(&dir, "IsZero.ts", "isZero(witness(0));");

    let output = run_harness(&dir, &["--protocol", "reference"]);

    let stdout = stdout(&output);
    assert_eq!(Some(1), output.status.code(), "stdout: {stdout}");
    assert!(stdout.contains("passed: [simple_add]"), "stdout: {stdout}");
    assert!(stdout.contains("failed: [is_zero, mul_add]"), "stdout: {stdout}");
    assert!(stdout.contains("malformed input"), "stdout: {stdout}");
}

#[test]
fn unreadable_circuit_is_reported_as_failed() {
    let dir = temp_dir("unreadable_circuit_is_reported_as_failed");
    write_circuit(&dir, "Alpha.ts", "add(witness(1), witness(2));");
    fs::write(dir.join("work/circuits/Beta.ts"), [0xff, 0xfe, 0x00]).unwrap();
    write_circuit(&dir, "Gamma.ts", "mul(witness(1), witness(2));");

    let output = run_harness(&dir, &[]);

    let stdout = stdout(&output);
    assert_eq!(Some(1), output.status.code(), "stdout: {stdout}");
    assert!(stdout.contains("passed: [alpha, gamma]"), "stdout: {stdout}");
    assert!(stdout.contains("failed: [beta]"), "stdout: {stdout}");
    assert!(stdout.contains("malformed input"), "stdout: {stdout}");

    let single_output = run_harness(&dir, &["Beta"]);
    assert_eq!(Some(0), single_output.status.code());
}
