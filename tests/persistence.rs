use std::fs;

use digit_nn::network::params::{BIASES_FILE, WEIGHTS_FILE};
use digit_nn::network::INPUT_SIZE;
use digit_nn::{Dataset, Network, NetworkError, Topology};
use tempfile::tempdir;

fn drawing() -> Vec<f64> {
    (0..INPUT_SIZE).map(|i| ((i * 7) % 11) as f64 / 10.0).collect()
}

#[test]
fn save_then_load_preserves_guesses() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    let net = Network::random();
    net.save(dir).unwrap();

    let loaded = Network::load(dir).unwrap();
    assert_eq!(loaded.topology(), &Topology::digits());
    assert_eq!(loaded.guess(&drawing()).unwrap(), net.guess(&drawing()).unwrap());

    let zeros = vec![0.0; INPUT_SIZE];
    assert_eq!(loaded.guess(&zeros).unwrap(), net.guess(&zeros).unwrap());
}

#[test]
fn saved_files_keep_layer_zero_null() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    Network::random().save(dir).unwrap();

    let weights: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join(WEIGHTS_FILE)).unwrap()).unwrap();
    let biases: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join(BIASES_FILE)).unwrap()).unwrap();

    assert!(weights[0].is_null());
    assert!(biases[0].is_null());
    assert_eq!(weights.as_array().unwrap().len(), 4);
    assert_eq!(weights[1].as_array().unwrap().len(), 16);
    assert_eq!(weights[1][0].as_array().unwrap().len(), 784);
    assert_eq!(weights[3].as_array().unwrap().len(), 10);
    assert_eq!(biases[3].as_array().unwrap().len(), 10);
    assert!(!dir.join("weights.json.tmp").exists());
}

#[test]
fn overwriting_replaces_previous_parameters() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    let first = Network::random();
    let second = Network::random();
    first.save(dir).unwrap();
    second.save(dir).unwrap();

    assert_eq!(Network::load(dir).unwrap(), second);
}

#[test]
fn failed_save_keeps_previous_model() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    let previous = Network::random();
    previous.save(dir).unwrap();

    // A directory squatting on the staging path makes the biases write fail
    // after the weights have already been staged.
    fs::create_dir(dir.join("biases.json.tmp")).unwrap();
    let replacement = Network::random();
    assert!(matches!(replacement.save(dir), Err(NetworkError::Io(_))));

    let loaded = Network::load(dir).unwrap();
    assert_eq!(loaded, previous);
    assert_eq!(loaded.guess(&drawing()).unwrap(), previous.guess(&drawing()).unwrap());
    assert!(!dir.join("weights.json.tmp").exists());
    assert!(dir.join("biases.json.tmp").is_dir());
}

#[test]
fn mismatched_files_fail_to_load() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    Network::random().save(dir).unwrap();
    fs::write(dir.join(BIASES_FILE), "[null, [0.1], [0.1], [0.1]]").unwrap();

    assert!(matches!(
        Network::load(dir),
        Err(NetworkError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        Network::load(dir.join("missing")),
        Err(NetworkError::Io(_))
    ));
}

#[test]
fn dataset_file_loads_and_validates() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    let path = dir.join("data.json");

    let x = vec![0.5; INPUT_SIZE];
    let doc = serde_json::json!({
        "training": [
            { "x": x, "y": [0, 0, 0, 1, 0, 0, 0, 0, 0, 0] },
            { "x": x, "y": [0, 0, 0, 0, 0, 0, 0, 0, 0, 1] }
        ]
    });
    fs::write(&path, doc.to_string()).unwrap();

    let dataset = Dataset::load_json(&path).unwrap();
    assert_eq!(dataset.training.len(), 2);
    assert_eq!(dataset.training[1].label(), 9);
    assert!(dataset.validate(INPUT_SIZE, 10).is_ok());
    assert!(matches!(
        dataset.validate(INPUT_SIZE, 9),
        Err(NetworkError::InvalidSampleShape { index: 0, .. })
    ));
}
