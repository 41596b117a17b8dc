use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::neural_network::{Network, connection_count, unit_count, validate_sizes};
use crate::unit::Unit;

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Flat, versioned image of a network's full state.
///
/// Cross-references between units and connections are never stored: the
/// topology is rebuilt from `layer_sizes`, and the flat vectors are matched
/// to it positionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub layer_sizes: Vec<usize>,
    pub biases: Vec<f64>,  // Every unit, layer by layer
    pub outputs: Vec<f64>, // Every unit, layer by layer
    pub weights: Vec<f64>, // Every connection, in wiring order
}

impl Snapshot {
    /// Name of the first field holding a NaN or infinity. JSON cannot carry
    /// those, so such a snapshot never round-trips.
    fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("biases", &self.biases),
            ("outputs", &self.outputs),
            ("weights", &self.weights),
        ]
        .into_iter()
        .find(|(_, values)| values.iter().any(|value| !value.is_finite()))
        .map(|(field, _)| field)
    }
}

impl Network {
    pub fn snapshot(&self) -> Snapshot {
        let units = || self.layers().iter().flat_map(Layer::units);

        Snapshot {
            version: FORMAT_VERSION,
            layer_sizes: self.layer_sizes().to_vec(),
            biases: units().map(Unit::bias).collect(),
            outputs: units().map(Unit::output).collect(),
            weights: self.connections().iter().map(|c| c.weight()).collect(),
        }
    }

    /// Rebuild a network from a snapshot, rejecting anything that does not
    /// describe a network of the declared shape.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        if snapshot.version != FORMAT_VERSION {
            return Err(Error::corrupt(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                snapshot.version
            )));
        }
        validate_sizes(&snapshot.layer_sizes).map_err(|err| Error::corrupt(err.to_string()))?;

        let units = unit_count(&snapshot.layer_sizes)
            .ok_or_else(|| Error::corrupt("layer sizes overflow"))?;
        for (name, values) in [("biases", &snapshot.biases), ("outputs", &snapshot.outputs)] {
            if values.len() != units {
                return Err(Error::corrupt(format!(
                    "{name} holds {} value(s) for {units} unit(s)",
                    values.len()
                )));
            }
        }
        let connections = connection_count(&snapshot.layer_sizes)
            .ok_or_else(|| Error::corrupt("layer sizes overflow"))?;
        if snapshot.weights.len() != connections {
            return Err(Error::corrupt(format!(
                "weights holds {} value(s) for {connections} connection(s)",
                snapshot.weights.len()
            )));
        }

        if let Some(field) = snapshot.non_finite_field() {
            return Err(Error::corrupt(format!("non-finite value in {field}")));
        }

        let mut layers = Vec::with_capacity(snapshot.layer_sizes.len());
        let mut offset = 0;
        for &size in &snapshot.layer_sizes {
            let range = offset..offset + size;
            let mut layer = Layer::from_biases(&snapshot.biases[range.clone()]);
            for (unit, &output) in layer.units.iter_mut().zip(&snapshot.outputs[range]) {
                unit.output = output;
            }
            layers.push(layer);
            offset += size;
        }

        Self::assemble(
            &snapshot.layer_sizes,
            layers,
            snapshot.weights.iter().copied(),
        )
    }

    /// Write the network as JSON to `writer`.
    ///
    /// Nothing is written if any bias, weight or activation is non-finite,
    /// e.g. after propagating an infinite input.
    pub fn save<W: Write>(&self, mut writer: W) -> Result<()> {
        let snapshot = self.snapshot();
        if let Some(field) = snapshot.non_finite_field() {
            return Err(Error::invalid(format!(
                "cannot save a network with non-finite {field}"
            )));
        }

        serde_json::to_writer(&mut writer, &snapshot)?;
        writer.flush()?;

        debug!(
            version = snapshot.version,
            layer_sizes = ?snapshot.layer_sizes,
            "network saved"
        );

        Ok(())
    }

    /// Read a network previously written by [`Network::save`].
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_reader(reader)?;

        debug!(
            version = snapshot.version,
            layer_sizes = ?snapshot.layer_sizes,
            "network loaded"
        );

        Self::from_snapshot(snapshot)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.save(BufWriter::new(file))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::load(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn network() -> Network {
        Network::with_rng(&[3, 4, 2], &mut StdRng::seed_from_u64(21)).unwrap()
    }

    #[test]
    fn test_snapshot_is_flat_and_ordered() {
        let nn = network();
        let snapshot = nn.snapshot();

        assert_eq!(snapshot.version, FORMAT_VERSION);
        assert_eq!(snapshot.layer_sizes, vec![3, 4, 2]);
        assert_eq!(snapshot.biases.len(), 9);
        assert_eq!(snapshot.outputs.len(), 9);
        assert_eq!(snapshot.weights.len(), 3 * 4 + 4 * 2);
        assert_eq!(snapshot.biases[3], nn.layers()[1].units()[0].bias());
        assert_eq!(snapshot.weights[5], nn.connections()[5].weight());
    }

    #[test]
    fn test_round_trip_rebuilds_identical_graph() {
        let mut nn = network();
        nn.propagate(&[0.1, 0.2, 0.3]).unwrap();

        let mut buffer = Vec::new();
        nn.save(&mut buffer).unwrap();
        let restored = Network::load(buffer.as_slice()).unwrap();

        assert_eq!(restored, nn);
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut snapshot = network().snapshot();
        snapshot.version = 99;
        assert!(matches!(
            Network::from_snapshot(snapshot),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    fn test_rejects_inconsistent_lengths() {
        let mut short_weights = network().snapshot();
        short_weights.weights.pop();
        assert!(matches!(
            Network::from_snapshot(short_weights),
            Err(Error::Corrupt(_))
        ));

        let mut extra_bias = network().snapshot();
        extra_bias.biases.push(0.0);
        assert!(matches!(
            Network::from_snapshot(extra_bias),
            Err(Error::Corrupt(_))
        ));

        let mut one_layer = network().snapshot();
        one_layer.layer_sizes = vec![9];
        assert!(matches!(
            Network::from_snapshot(one_layer),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    fn test_rejects_overflowing_sizes() {
        let mut snapshot = network().snapshot();
        snapshot.layer_sizes = vec![usize::MAX, 2];
        assert!(matches!(
            Network::from_snapshot(snapshot),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let mut snapshot = network().snapshot();
        snapshot.weights[0] = f64::INFINITY;
        assert!(matches!(
            Network::from_snapshot(snapshot),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    fn test_save_refuses_non_finite_state() {
        let mut nn = network();
        nn.propagate(&[f64::INFINITY, 0.0, 0.0]).unwrap();

        let mut buffer = Vec::new();
        assert!(matches!(
            nn.save(&mut buffer),
            Err(Error::InvalidArgument(_))
        ));
        assert!(buffer.is_empty());

        // A finite pass clears the activations and saving works again
        nn.propagate(&[0.5, -0.5, 0.25]).unwrap();
        nn.save(&mut buffer).unwrap();
        let restored = Network::load(buffer.as_slice()).unwrap();
        assert_eq!(restored.snapshot(), nn.snapshot());
    }

    #[test]
    fn test_save_refuses_nan_weight() {
        let mut nn = network();
        nn.set_weight(3, f64::NAN).unwrap();

        let mut buffer = Vec::new();
        assert!(matches!(
            nn.save(&mut buffer),
            Err(Error::InvalidArgument(_))
        ));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_rejects_garbage_streams() {
        let streams: [&[u8]; 4] = [b"", b"not json", b"{\"version\":1}", b"[1, 2, 3]"];
        for garbage in streams {
            assert!(matches!(Network::load(garbage), Err(Error::Corrupt(_))));
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Network::from_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
