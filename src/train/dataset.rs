use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NetworkError, Result};
use crate::math::argmax;

/// One labeled drawing: `x` is the flattened image, `y` the one-hot digit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Sample {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Sample {
        Sample { x, y }
    }

    /// Builds a sample whose label is `one_hot(digit, classes)`.
    pub fn labeled(x: Vec<f64>, digit: usize, classes: usize) -> Sample {
        Sample { x, y: one_hot(digit, classes) }
    }

    /// Index of the hot entry in `y`.
    pub fn label(&self) -> usize {
        argmax(&self.y)
    }

    /// Checks lengths and that `y` has exactly one entry equal to 1 and the
    /// rest equal to 0.
    pub fn validate(&self, index: usize, input_size: usize, output_size: usize) -> Result<()> {
        let invalid = |reason: String| NetworkError::InvalidSampleShape {
            index,
            input_len: self.x.len(),
            label_len: self.y.len(),
            reason,
        };
        if self.x.len() != input_size {
            return Err(invalid(format!("expected {input_size} inputs")));
        }
        if self.y.len() != output_size {
            return Err(invalid(format!("expected {output_size} label entries")));
        }
        let ones = self.y.iter().filter(|&&v| v == 1.0).count();
        let zeros = self.y.iter().filter(|&&v| v == 0.0).count();
        if ones != 1 || ones + zeros != output_size {
            return Err(invalid("label is not one-hot".into()));
        }
        Ok(())
    }
}

/// `classes` zeros with a single 1 at `digit`.
pub fn one_hot(digit: usize, classes: usize) -> Vec<f64> {
    let mut v = vec![0.0; classes];
    if digit < classes {
        v[digit] = 1.0;
    }
    v
}

/// Indexable collection of samples. The training loop only ever asks for
/// `sample(i)` with `i < len()`, wrapping around itself.
pub trait SampleSource {
    fn len(&self) -> usize;

    fn sample(&self, index: usize) -> &Sample;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SampleSource for [Sample] {
    fn len(&self) -> usize {
        <[Sample]>::len(self)
    }

    fn sample(&self, index: usize) -> &Sample {
        &self[index]
    }
}

impl SampleSource for Vec<Sample> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn sample(&self, index: usize) -> &Sample {
        &self[index]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Wrapped { training: Vec<Sample> },
    Bare(Vec<Sample>),
}

/// Training set held in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub training: Vec<Sample>,
}

impl Dataset {
    pub fn new(training: Vec<Sample>) -> Dataset {
        Dataset { training }
    }

    /// Reads `{ "training": [{ "x": [..], "y": [..] }, ..] }` or a bare
    /// array of samples.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let training = match serde_json::from_reader(reader)? {
            DatasetFile::Wrapped { training } => training,
            DatasetFile::Bare(training) => training,
        };
        debug!(path = %path.display(), samples = training.len(), "loaded dataset");
        Ok(Dataset { training })
    }

    /// Validates every sample; fails on the first bad one.
    pub fn validate(&self, input_size: usize, output_size: usize) -> Result<()> {
        if self.training.is_empty() {
            return Err(NetworkError::EmptyDataset);
        }
        self.training
            .iter()
            .enumerate()
            .try_for_each(|(i, s)| s.validate(i, input_size, output_size))
    }
}

impl SampleSource for Dataset {
    fn len(&self) -> usize {
        self.training.len()
    }

    fn sample(&self, index: usize) -> &Sample {
        &self.training[index]
    }
}
