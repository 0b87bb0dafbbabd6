//! Integration tests for the mxq binary.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn mxq_cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mxq"))
}

fn run_ok(args: &[&str]) -> String {
    let output = mxq_cli().args(args).output().expect("Failed to run mxq");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "mxq {:?} failed:\nstdout: {}\nstderr: {}",
        args,
        stdout,
        stderr
    );
    stdout
}

#[test]
fn test_types_table() {
    let stdout = run_ok(&["types"]);
    for name in ["f32", "e8m23", "e5m10", "e8m7", "e4m3", "q8"] {
        assert!(stdout.contains(name), "missing {name} in:\n{stdout}");
    }
}

#[test]
fn test_types_json() {
    let stdout = run_ok(&["types", "--json"]);
    let table: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let rows = table.as_array().unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[2]["name"], "e5m10");
    assert_eq!(rows[2]["size"], 2);
    assert_eq!(rows[5]["id"], "q8");
}

#[test]
fn test_scalar_e4m3_patterns() {
    let stdout = run_ok(&["scalar", "--type", "e4m3", "1.0", "-2.0", "1000"]);
    assert!(stdout.contains("0x38"), "{stdout}");
    assert!(stdout.contains("0xC0"), "{stdout}");
    assert!(stdout.contains("0x78"), "{stdout}");
}

#[test]
fn test_scalar_alias_and_q8_rejection() {
    let stdout = run_ok(&["scalar", "-t", "bf16", "1.0"]);
    assert!(stdout.contains("0x3F80"), "{stdout}");

    let output = mxq_cli()
        .args(["scalar", "--type", "q8", "1.0"])
        .output()
        .expect("Failed to run mxq");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("mxq q8"));
}

#[test]
fn test_q8_ones_block() {
    let ones: Vec<String> = vec!["1.0".to_string(); 32];
    let mut args = vec!["q8"];
    args.extend(ones.iter().map(String::as_str));

    let stdout = run_ok(&args);
    assert!(stdout.contains("0.992188"), "{stdout}");
    assert!(stdout.contains("max error:  0.00781"), "{stdout}");
    assert!(stdout.contains("blocks: 1  bytes: 33"), "{stdout}");
}

#[test]
fn test_q8_rejects_misaligned_length() {
    let output = mxq_cli()
        .args(["q8", "1.0", "2.0", "3.0"])
        .output()
        .expect("Failed to run mxq");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("multiple of block size"), "{stderr}");
}

#[test]
fn test_q8_generate_config_then_use_it() {
    let dir = TempDir::new().unwrap();

    let output = mxq_cli()
        .current_dir(dir.path())
        .args(["q8", "--generate-config"])
        .output()
        .expect("Failed to run mxq");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Generated mxq.json"));

    let config_path = dir.path().join("mxq.json");
    let mut config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(config["q8"]["block_size"], 32);

    config["q8"]["block_size"] = 4.into();
    fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();

    let values_path = dir.path().join("values.json");
    fs::write(&values_path, "[1, 2, 3, 4, -0.5, 0.25, 0, 8]").unwrap();

    let stdout = run_ok(&[
        "q8",
        "--config",
        config_path.to_str().unwrap(),
        "--input",
        values_path.to_str().unwrap(),
    ]);
    assert!(stdout.contains("blocks: 2  bytes: 10"), "{stdout}");

    // A second template must not overwrite the edited one
    let output = mxq_cli()
        .current_dir(dir.path())
        .args(["q8", "--generate-config"])
        .output()
        .expect("Failed to run mxq");
    assert!(!output.status.success());
}

#[test]
fn test_roundtrip_passthrough_json() {
    let stdout = run_ok(&["roundtrip", "--type", "f32", "--json", "1.5", "-3.25", "1e-20"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["type"], "f32");
    assert_eq!(report["elements"], 3);
    assert_eq!(report["error"]["max_abs"], 0.0);
}

#[test]
fn test_roundtrip_q8_matrix_sample_data() {
    let stdout = run_ok(&[
        "roundtrip", "--type", "q8", "--rows", "4", "--cols", "64",
    ]);
    assert!(stdout.contains("shape:       4x64"), "{stdout}");
    assert!(stdout.contains("elements:    256"), "{stdout}");
    // 256 values + 8 scales
    assert!(stdout.contains("bytes:       264"), "{stdout}");
}

#[test]
fn test_roundtrip_rows_require_cols() {
    let output = mxq_cli()
        .args(["roundtrip", "--type", "e4m3", "--rows", "2", "1.0", "2.0"])
        .output()
        .expect("Failed to run mxq");
    assert!(!output.status.success());
}

#[test]
fn test_roundtrip_rejects_oversized_shape() {
    let output = mxq_cli()
        .args([
            "roundtrip",
            "--type",
            "e4m3",
            "--rows",
            "18446744073709551615",
            "--cols",
            "2",
        ])
        .output()
        .expect("Failed to run mxq");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("too large"), "{stderr}");
    assert!(!stderr.contains("panicked"), "{stderr}");
}

#[test]
fn test_verbose_logs_go_to_stderr() {
    let output = mxq_cli()
        .args(["-v", "roundtrip", "--type", "e5m10", "--json", "1.0"])
        .output()
        .expect("Failed to run mxq");
    assert!(output.status.success());

    // stdout stays machine readable
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(serde_json::from_str::<serde_json::Value>(&stdout).is_ok());
    assert!(String::from_utf8_lossy(&output.stderr).contains("vector round trip"));
}
