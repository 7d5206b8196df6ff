use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NetworkError, Result};
use crate::math::matrix::Matrix;
use crate::network::topology::Topology;

pub const WEIGHTS_FILE: &str = "weights.json";
pub const BIASES_FILE: &str = "biases.json";

/// Trained weights and biases in their persisted layout.
///
/// Both tensors are indexed by destination layer. Entry 0 belongs to the
/// input layer, which has no parameters, and is written as `null`:
///
/// ```text
/// weights.json  [null, [[..784..] x16], [[..16..] x16], [[..16..] x10]]
/// biases.json   [null, [..16..], [..16..], [..10..]]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub weights: Vec<Option<Matrix>>,
    pub biases: Vec<Option<Vec<f64>>>,
}

impl Parameters {
    /// Every weight set to `weight` and every bias to `bias`.
    pub fn constant(topology: &Topology, weight: f64, bias: f64) -> Parameters {
        let weights = std::iter::once(None)
            .chain((1..topology.depth()).map(|l| {
                let (rows, cols) = topology.weight_shape(l);
                Some(Matrix::filled(rows, cols, weight))
            }))
            .collect();
        let biases = std::iter::once(None)
            .chain((1..topology.depth()).map(|l| Some(vec![bias; topology.size(l)])))
            .collect();
        Parameters { weights, biases }
    }

    /// Reads the layer sizes off the tensor shapes: the first weight matrix
    /// gives the input width, every bias vector gives its layer's size.
    pub fn topology(&self) -> Result<Topology> {
        let first = self
            .weights
            .get(1)
            .and_then(Option::as_ref)
            .ok_or_else(|| NetworkError::InvalidTopology("no weights for layer 1".into()))?;

        let mut sizes = vec![first.cols];
        for (l, biases) in self.biases.iter().enumerate().skip(1) {
            let biases = biases
                .as_ref()
                .ok_or_else(|| NetworkError::InvalidTopology(format!("no biases for layer {l}")))?;
            sizes.push(biases.len());
        }
        Topology::new(sizes)
    }

    /// Writes both tensors into `dir`, creating it if needed.
    ///
    /// Both files are staged and synced before either is renamed into
    /// place, so a failed save never leaves new weights next to old biases.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let weights_path = dir.join(WEIGHTS_FILE);
        let biases_path = dir.join(BIASES_FILE);

        let weights_tmp = stage_json(&weights_path, &self.weights)?;
        let biases_tmp = match stage_json(&biases_path, &self.biases) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = fs::remove_file(&weights_tmp);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&weights_tmp, &weights_path) {
            let _ = fs::remove_file(&weights_tmp);
            let _ = fs::remove_file(&biases_tmp);
            return Err(e.into());
        }
        fs::rename(&biases_tmp, &biases_path)?;
        debug!(dir = %dir.display(), "saved network parameters");
        Ok(())
    }

    pub fn load(dir: impl AsRef<Path>) -> Result<Parameters> {
        let dir = dir.as_ref();
        let weights = read_json(&dir.join(WEIGHTS_FILE))?;
        let biases = read_json(&dir.join(BIASES_FILE))?;
        debug!(dir = %dir.display(), "loaded network parameters");
        Ok(Parameters { weights, biases })
    }
}

/// Serializes `value` into `<path>.tmp` and syncs it to disk. On failure
/// the temp file is removed and `path` is left alone.
fn stage_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf> {
    let tmp = path.with_extension("json.tmp");
    let result = (|| -> Result<()> {
        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    })();

    match result {
        Ok(()) => Ok(tmp),
        Err(e) => {
            if tmp.is_file() {
                let _ = fs::remove_file(&tmp);
            }
            Err(e)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_zero_is_written_as_null() {
        let topology = Topology::new(vec![2, 1]).unwrap();
        let params = Parameters::constant(&topology, 0.5, 0.25);
        assert_eq!(serde_json::to_string(&params.weights).unwrap(), "[null,[[0.5,0.5]]]");
        assert_eq!(serde_json::to_string(&params.biases).unwrap(), "[null,[0.25]]");
    }

    #[test]
    fn topology_is_inferred_from_shapes() {
        let params = Parameters::constant(&Topology::digits(), 0.0, 0.0);
        assert_eq!(params.topology().unwrap(), Topology::digits());
    }

    #[test]
    fn reads_original_layout() {
        let weights: Vec<Option<Matrix>> = serde_json::from_str("[null, [[1, 2], [3, 4]], [[5, 6]]]").unwrap();
        let biases: Vec<Option<Vec<f64>>> = serde_json::from_str("[null, [0.1, 0.2], [0.3]]").unwrap();
        let params = Parameters { weights, biases };
        assert_eq!(params.topology().unwrap().sizes(), &[2, 2, 1]);
        assert!(serde_json::from_str::<Vec<Option<Matrix>>>("[null, [[1, 2], [3]]]").is_err());
    }
}
