use rand::Rng;

use crate::unit::Unit;

/// An ordered group of units at the same depth of the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub(crate) units: Vec<Unit>,
}

impl Layer {
    /// Build a layer of `size` units with random biases.
    pub(crate) fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        Layer {
            units: (0..size).map(|_| Unit::random(rng)).collect(),
        }
    }

    /// Build a layer of `size` units with zero biases.
    pub(crate) fn unbiased(size: usize) -> Self {
        Layer {
            units: (0..size).map(|_| Unit::new(0.0)).collect(),
        }
    }

    pub(crate) fn from_biases(biases: &[f64]) -> Self {
        Layer {
            units: biases.iter().map(|&bias| Unit::new(bias)).collect(),
        }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Current activations of every unit, in layer order.
    pub fn outputs(&self) -> Vec<f64> {
        self.units.iter().map(Unit::output).collect()
    }
}
