use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn lte_atmos(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lte-atmos"))
        .args(args)
        .output()
        .expect("lte-atmos should launch")
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent directory should be created");
    }
    fs::write(path, content).expect("file should be written");
}

fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path).expect("output should exist");
    serde_json::from_str(&text).expect("output should be JSON")
}

#[test]
fn presets_command_lists_the_sun() {
    let output = lte_atmos(&["presets"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line.starts_with("sun ")), "{stdout}");
    assert!(stdout.contains("arcturus"));
}

#[test]
fn lines_command_lists_the_catalogue() {
    let output = lte_atmos(&["lines"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("na-d1"), "{stdout}");
    assert!(stdout.contains("h-alpha"), "{stdout}");
}

#[test]
fn unknown_preset_exits_with_lookup_code() {
    let output = lte_atmos(&["model", "--preset", "betelgeuse"]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("INPUT.PRESET"), "{stderr}");
    assert!(stderr.contains("FATAL EXIT CODE: 3"), "{stderr}");
}

#[test]
fn malformed_arguments_exit_with_usage_code() {
    let output = lte_atmos(&["model", "--teff", "hot"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn malformed_config_exits_with_usage_code() {
    let temp = TempDir::new().expect("tempdir should be created");
    let config_path = temp.path().join("broken.json");
    write_file(&config_path, "{ \"stellar\": ");
    let output = lte_atmos(&["model", "--config", config_path.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("INPUT.CONFIG"), "{stderr}");
}

#[test]
fn model_command_writes_structure_json() {
    let temp = TempDir::new().expect("tempdir should be created");
    let config_path = temp.path().join("config.json");
    let output_path = temp.path().join("out/model.json");
    write_file(
        &config_path,
        r#"
        {
          "stellar": { "teff": 5000.0, "logG": 4.5 },
          "depth": { "count": 24 },
          "continuum": { "count": 80 }
        }
        "#,
    );

    let output = lte_atmos(&[
        "model",
        "--config",
        config_path.to_str().expect("utf-8 path"),
        "--output",
        output_path.to_str().expect("utf-8 path"),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let model = read_json(&output_path);
    let temperature = model["structure"]["temperature"]
        .as_array()
        .expect("temperature column");
    assert_eq!(temperature.len(), 24);
    assert!(model["convergence"]["passes"].as_u64().expect("passes") >= 1);
    assert_eq!(model["stellar"]["teff"].as_f64(), Some(5000.0));
}

#[test]
fn spectrum_command_reports_requested_lines() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output_path = temp.path().join("spectrum.json");
    let output = lte_atmos(&[
        "spectrum",
        "--preset",
        "sun",
        "--depths",
        "24",
        "--line",
        "na-d1",
        "--output",
        output_path.to_str().expect("utf-8 path"),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = read_json(&output_path);
    let lines = report["lines"].as_array().expect("line reports");
    assert_eq!(lines.len(), 1);
    assert!(lines[0]["equivalentWidthPm"].as_f64().expect("EW") > 0.0);
    assert!(report["recoveredTeff"].as_f64().expect("Teff") > 0.0);
}
