// Loading MNIST-format IDX files from disk.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use sigmoid_mlp::data::idx::{encode_idx1, encode_idx3};
use sigmoid_mlp::data::mnist::{TEST_IMAGES, TEST_LABELS, TRAIN_IMAGES, TRAIN_LABELS};
use sigmoid_mlp::data::{argmax, load_mnist};
use sigmoid_mlp::{DatasetConfig, NnError};

fn config() -> DatasetConfig {
    DatasetConfig { n_train: 4, n_valid: 2, n_test: 3, input_width: 4, classes: 10 }
}

fn write_files(dir: &Path, n_train_file: usize, n_test: usize) {
    let images = |n: usize| (0..n).map(|i| vec![i as u8 * 10; 4]).collect::<Vec<_>>();
    let labels = |n: usize| (0..n).map(|i| (i % 10) as u8).collect::<Vec<_>>();
    fs::write(dir.join(TRAIN_IMAGES), encode_idx3(2, 2, &images(n_train_file))).unwrap();
    fs::write(dir.join(TRAIN_LABELS), encode_idx1(&labels(n_train_file))).unwrap();
    fs::write(dir.join(TEST_IMAGES), encode_idx3(2, 2, &images(n_test))).unwrap();
    fs::write(dir.join(TEST_LABELS), encode_idx1(&labels(n_test))).unwrap();
}

#[test]
fn loads_partitions_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), 6, 3);

    let ds = load_mnist(dir.path(), &config(), &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!((ds.train.len(), ds.valid.len(), ds.test.len()), (4, 2, 3));

    for (x, t) in ds.train.iter().chain(ds.valid.iter()).chain(ds.test.iter()) {
        let pixel = (x[0] * 255.0).round() as usize;
        assert_eq!(argmax(t), pixel / 10 % 10);
        assert_eq!(t.iter().sum::<f64>(), 1.0);
    }
}

#[test]
fn shuffle_is_reproducible_with_seed() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), 6, 3);

    let a = load_mnist(dir.path(), &config(), &mut StdRng::seed_from_u64(9)).unwrap();
    let b = load_mnist(dir.path(), &config(), &mut StdRng::seed_from_u64(9)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn header_count_mismatch_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), 5, 3);

    let err = load_mnist(dir.path(), &config(), &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert!(matches!(err, NnError::Dataset(_)));
}

#[test]
fn truncated_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), 6, 3);
    let path = dir.path().join(TEST_IMAGES);
    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 2);
    fs::write(&path, bytes).unwrap();

    let err = load_mnist(dir.path(), &config(), &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert!(err.to_string().contains("truncated"));
}
