use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::data::dataset::{one_hot, Dataset, DatasetConfig, Partition};
use crate::data::idx::{parse_idx1, parse_idx3, IdxImages};
use crate::error::{NnError, Result};

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// Loads the four MNIST IDX files from `dir`.
///
/// The 60,000 training-file examples are randomly permuted with `rng` and
/// split into training and validation; the test file keeps its order.
pub fn load_mnist<R: Rng + ?Sized>(
    dir: &Path,
    config: &DatasetConfig,
    rng: &mut R,
) -> Result<Dataset> {
    let train_images = read_file(dir, TRAIN_IMAGES)?;
    let train_labels = read_file(dir, TRAIN_LABELS)?;
    let test_images = read_file(dir, TEST_IMAGES)?;
    let test_labels = read_file(dir, TEST_LABELS)?;

    let dataset = build_dataset(
        &parse_idx3(&train_images)?,
        parse_idx1(&train_labels)?,
        &parse_idx3(&test_images)?,
        parse_idx1(&test_labels)?,
        config,
        rng,
    )?;
    info!(
        train = dataset.train.len(),
        valid = dataset.valid.len(),
        test = dataset.test.len(),
        dir = %dir.display(),
        "loaded MNIST"
    );
    Ok(dataset)
}

fn read_file(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let path = dir.join(name);
    std::fs::read(&path)
        .map_err(|e| NnError::Dataset(format!("cannot read {}: {}", path.display(), e)))
}

/// Splits parsed IDX contents into the partitions described by `config`.
pub fn build_dataset<R: Rng + ?Sized>(
    train_images: &IdxImages<'_>,
    train_labels: &[u8],
    test_images: &IdxImages<'_>,
    test_labels: &[u8],
    config: &DatasetConfig,
    rng: &mut R,
) -> Result<Dataset> {
    let n_train_file = config.n_train + config.n_valid;
    check_images("training", train_images, train_labels, n_train_file, config)?;
    check_images("test", test_images, test_labels, config.n_test, config)?;

    let mut order: Vec<usize> = (0..n_train_file).collect();
    order.shuffle(rng);

    let mut train = Partition::default();
    let mut valid = Partition::default();
    for (slot, &n) in order.iter().enumerate() {
        let input = normalize(train_images.image(n));
        let target = one_hot(train_labels[n] as usize, config.classes)?;
        if slot < config.n_train {
            train.push(input, target);
        } else {
            valid.push(input, target);
        }
    }

    let mut test = Partition::default();
    for n in 0..config.n_test {
        test.push(
            normalize(test_images.image(n)),
            one_hot(test_labels[n] as usize, config.classes)?,
        );
    }

    Ok(Dataset {
        train,
        valid,
        test,
        input_width: config.input_width,
        classes: config.classes,
    })
}

fn check_images(
    which: &str,
    images: &IdxImages<'_>,
    labels: &[u8],
    expected: usize,
    config: &DatasetConfig,
) -> Result<()> {
    if images.count != expected {
        return Err(NnError::Dataset(format!(
            "{} image file holds {} images, configuration expects {}",
            which, images.count, expected
        )));
    }
    if labels.len() != expected {
        return Err(NnError::Dataset(format!(
            "{} label file holds {} labels, configuration expects {}",
            which, labels.len(), expected
        )));
    }
    if images.pixels_per_image() != config.input_width {
        return Err(NnError::Dataset(format!(
            "{} images are {}x{} = {} pixels, configuration expects {}",
            which,
            images.rows,
            images.cols,
            images.pixels_per_image(),
            config.input_width
        )));
    }
    Ok(())
}

/// Maps pixel bytes from [0, 255] to [0.0, 1.0].
fn normalize(pixels: &[u8]) -> Vec<f64> {
    pixels.iter().map(|&p| p as f64 / 255.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::argmax;
    use crate::data::idx::{encode_idx1, encode_idx3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiny_config() -> DatasetConfig {
        DatasetConfig { n_train: 3, n_valid: 1, n_test: 2, input_width: 4, classes: 3 }
    }

    fn image(fill: u8) -> Vec<u8> {
        vec![fill; 4]
    }

    #[test]
    fn splits_and_normalizes() {
        let train_x = encode_idx3(2, 2, &[image(0), image(85), image(170), image(255)]);
        let train_t = encode_idx1(&[0, 1, 2, 0]);
        let test_x = encode_idx3(2, 2, &[image(255), image(0)]);
        let test_t = encode_idx1(&[2, 1]);
        let mut rng = StdRng::seed_from_u64(5);

        let ds = build_dataset(
            &parse_idx3(&train_x).unwrap(),
            parse_idx1(&train_t).unwrap(),
            &parse_idx3(&test_x).unwrap(),
            parse_idx1(&test_t).unwrap(),
            &tiny_config(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(ds.train.len(), 3);
        assert_eq!(ds.valid.len(), 1);
        assert_eq!(ds.test.len(), 2);

        // pairs survive the shuffle: pixel value identifies the label
        let label_of = |px: f64| match (px * 255.0).round() as u8 {
            0 => 0,
            85 => 1,
            170 => 2,
            255 => 0,
            _ => unreachable!(),
        };
        for (x, t) in ds.train.iter().chain(ds.valid.iter()) {
            assert!(x.iter().all(|&p| (0.0..=1.0).contains(&p)));
            assert_eq!(argmax(t), label_of(x[0]));
        }

        // test keeps file order
        assert_eq!(ds.test.inputs[0], vec![1.0; 4]);
        assert_eq!(argmax(&ds.test.targets[0]), 2);
        assert_eq!(argmax(&ds.test.targets[1]), 1);
    }

    #[test]
    fn rejects_count_mismatch() {
        let train_x = encode_idx3(2, 2, &[image(0), image(1), image(2)]);
        let train_t = encode_idx1(&[0, 1, 2]);
        let test_x = encode_idx3(2, 2, &[image(0), image(0)]);
        let test_t = encode_idx1(&[0, 0]);
        let err = build_dataset(
            &parse_idx3(&train_x).unwrap(),
            parse_idx1(&train_t).unwrap(),
            &parse_idx3(&test_x).unwrap(),
            parse_idx1(&test_t).unwrap(),
            &tiny_config(),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap_err();
        assert!(err.to_string().contains("expects 4"));
    }

    #[test]
    fn rejects_wrong_image_size_and_bad_label() {
        let train_x = encode_idx3(3, 3, &vec![vec![0u8; 9]; 4]);
        let train_t = encode_idx1(&[0, 1, 2, 0]);
        let test_x = encode_idx3(2, 2, &[image(0), image(0)]);
        let test_t = encode_idx1(&[0, 0]);
        assert!(build_dataset(
            &parse_idx3(&train_x).unwrap(),
            parse_idx1(&train_t).unwrap(),
            &parse_idx3(&test_x).unwrap(),
            parse_idx1(&test_t).unwrap(),
            &tiny_config(),
            &mut StdRng::seed_from_u64(0),
        )
        .is_err());

        let train_x = encode_idx3(2, 2, &vec![image(0); 4]);
        let bad_t = encode_idx1(&[0, 1, 7, 0]);
        assert!(build_dataset(
            &parse_idx3(&train_x).unwrap(),
            parse_idx1(&bad_t).unwrap(),
            &parse_idx3(&test_x).unwrap(),
            parse_idx1(&test_t).unwrap(),
            &tiny_config(),
            &mut StdRng::seed_from_u64(0),
        )
        .is_err());
    }

    #[test]
    fn missing_directory_is_reported() {
        let err = load_mnist(
            Path::new("/nonexistent/mnist"),
            &tiny_config(),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap_err();
        assert!(matches!(err, NnError::Dataset(_)));
    }
}
