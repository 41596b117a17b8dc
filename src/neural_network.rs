use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::unit::{Connection, Unit, UnitId, initial_parameter, sigmoid, sigmoid_derivative};

/// A strictly feedforward, fully-connected network of sigmoid units.
///
/// Every unit of layer `i` (for `i >= 1`) receives one connection from each
/// unit of layer `i - 1` and from nowhere else. Units and connections are
/// created once at construction; afterwards only activations, biases, errors
/// and weights change.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layer_sizes: Vec<usize>,          // Number of units in each layer
    layers: Vec<Layer>,               // layers[0] is the input layer
    connections: Vec<Connection>,     // Arena, in creation order
}

impl Network {
    /// Build a randomly initialized network, e.g. `Network::new(&[2, 3, 1])`
    /// has two input units, three hidden units and one output unit.
    pub fn new(layer_sizes: &[usize]) -> Result<Self> {
        Self::with_rng(layer_sizes, &mut rand::rng())
    }

    /// Same as [`Network::new`] but draws every bias and weight from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        validate_sizes(layer_sizes)?;

        // All biases first, then weights in wiring order
        let layers = layer_sizes
            .iter()
            .map(|&size| Layer::random(size, rng))
            .collect();
        let weights = std::iter::repeat_with(|| initial_parameter(rng));

        Self::assemble(layer_sizes, layers, weights)
    }

    /// Build a network with the usual topology and explicit parameters.
    ///
    /// `biases` lists the biases of every non-input unit, layer by layer.
    /// `weights` lists connection weights in wiring order: for each layer
    /// after the input, for each of its units, one weight per unit of the
    /// layer before.
    pub fn from_parameters(layer_sizes: &[usize], biases: &[f64], weights: &[f64]) -> Result<Self> {
        validate_sizes(layer_sizes)?;

        let bias_count = unit_count(&layer_sizes[1..]).unwrap_or_default();
        if biases.len() != bias_count {
            return Err(Error::invalid(format!(
                "expected {bias_count} bias(es), got {}",
                biases.len()
            )));
        }
        let weight_count = connection_count(layer_sizes).unwrap_or_default();
        if weights.len() != weight_count {
            return Err(Error::invalid(format!(
                "expected {weight_count} weight(s), got {}",
                weights.len()
            )));
        }

        let mut layers = vec![Layer::unbiased(layer_sizes[0])];
        let mut offset = 0;
        for &size in &layer_sizes[1..] {
            layers.push(Layer::from_biases(&biases[offset..offset + size]));
            offset += size;
        }

        Self::assemble(layer_sizes, layers, weights.iter().copied())
    }

    /// Wire prepared layers into an adjacent-layer full mesh, taking one
    /// weight per connection from `weights`.
    pub(crate) fn assemble(
        layer_sizes: &[usize],
        layers: Vec<Layer>,
        mut weights: impl Iterator<Item = f64>,
    ) -> Result<Self> {
        let mut network = Network {
            layer_sizes: layer_sizes.to_vec(),
            layers,
            connections: Vec::with_capacity(connection_count(layer_sizes).unwrap_or_default()),
        };

        for layer in 1..network.layers.len() {
            for index in 0..network.layers[layer].len() {
                let target = UnitId::new(layer, index);

                for source_index in 0..network.layers[layer - 1].len() {
                    let source = UnitId::new(layer - 1, source_index);
                    let Some(weight) = weights.next() else {
                        return Err(Error::invalid("ran out of weights while wiring"));
                    };

                    let id = network.connections.len();
                    network
                        .connections
                        .push(Connection::new(source, target, weight));
                    network.layers[layer - 1].units[source_index]
                        .outgoing
                        .push(id);
                    network.layers[layer].units[index].incoming.push(id);
                }
            }
        }

        debug!(
            layer_sizes = ?network.layer_sizes,
            units = network.layer_sizes.iter().sum::<usize>(),
            connections = network.connections.len(),
            "network constructed"
        );

        Ok(network)
    }

    /// Feed `input` through the network and return the output layer's activations.
    pub fn propagate(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_len() {
            return Err(Error::invalid(format!(
                "you must enter {} input value(s), got {}",
                self.input_len(),
                input.len()
            )));
        }

        for (unit, &value) in self.layers[0].units.iter_mut().zip(input) {
            unit.output = value;
        }

        for layer in 1..self.layers.len() {
            let (before, rest) = self.layers.split_at_mut(layer);
            let previous = &before[layer - 1];

            for unit in rest[0].units.iter_mut() {
                let d = unit.incoming.iter().fold(unit.bias, |d, &c| {
                    let connection = &self.connections[c];
                    d + previous.units[connection.source.index].output * connection.weight
                });
                unit.output = sigmoid(d);
            }
        }

        Ok(self.layers[self.last_layer()].outputs())
    }

    /// Train on randomly sampled examples, one forward and one backward pass
    /// per iteration. `targets[k]` is the desired output for `inputs[k]`.
    pub fn train<I, T>(
        &mut self,
        inputs: &[I],
        targets: &[T],
        iterations: usize,
        learning_rate: f64,
    ) -> Result<()>
    where
        I: AsRef<[f64]>,
        T: AsRef<[f64]>,
    {
        self.train_with_rng(inputs, targets, iterations, learning_rate, &mut rand::rng())
    }

    /// Same as [`Network::train`] but samples examples from `rng`.
    pub fn train_with_rng<I, T, R>(
        &mut self,
        inputs: &[I],
        targets: &[T],
        iterations: usize,
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<()>
    where
        I: AsRef<[f64]>,
        T: AsRef<[f64]>,
        R: Rng + ?Sized,
    {
        self.check_dataset(inputs, targets)?;
        if iterations > 0 && inputs.is_empty() {
            return Err(Error::invalid("cannot train on an empty dataset"));
        }

        debug!(
            iterations,
            learning_rate,
            examples = inputs.len(),
            "training started"
        );

        for _ in 0..iterations {
            let k = rng.random_range(0..inputs.len());
            self.propagate(inputs[k].as_ref())?;
            self.backpropagate(targets[k].as_ref(), learning_rate);
        }

        debug!(iterations, "training finished");

        Ok(())
    }

    /// Mean over the dataset of each example's mean squared output error.
    pub fn mean_squared_error<I, T>(&mut self, inputs: &[I], targets: &[T]) -> Result<f64>
    where
        I: AsRef<[f64]>,
        T: AsRef<[f64]>,
    {
        self.check_dataset(inputs, targets)?;
        if inputs.is_empty() {
            return Err(Error::invalid("cannot measure error on an empty dataset"));
        }

        let mut total = 0.0;
        for (input, target) in inputs.iter().zip(targets) {
            let outputs = self.propagate(input.as_ref())?;
            let squared: f64 = outputs
                .iter()
                .zip(target.as_ref())
                .map(|(y, t)| (t - y) * (t - y))
                .sum();
            total += squared / outputs.len() as f64;
        }

        Ok(total / inputs.len() as f64)
    }

    fn backpropagate(&mut self, target: &[f64], learning_rate: f64) {
        let last = self.last_layer();

        for (unit, &t) in self.layers[last].units.iter_mut().zip(target) {
            unit.error = t - unit.output;
        }
        self.adjust_layer(last, learning_rate);

        // Hidden errors read the already-updated weights of the layer ahead
        for layer in (1..last).rev() {
            let errors: Vec<f64> = self.layers[layer]
                .units
                .iter()
                .map(|unit| self.backpropagated_error(unit))
                .collect();

            for (unit, error) in self.layers[layer].units.iter_mut().zip(errors) {
                unit.error = error;
            }
            self.adjust_layer(layer, learning_rate);
        }
    }

    fn backpropagated_error(&self, unit: &Unit) -> f64 {
        unit.outgoing.iter().fold(0.0, |error, &c| {
            let connection = &self.connections[c];
            let target = &self.layers[connection.target.layer].units[connection.target.index];
            error + target.error * connection.weight
        })
    }

    /// Apply the gradient step to the incoming weights and bias of every unit in `layer`.
    fn adjust_layer(&mut self, layer: usize, learning_rate: f64) {
        let (before, rest) = self.layers.split_at_mut(layer);
        let previous = &before[layer - 1];

        for unit in rest[0].units.iter_mut() {
            let gradient = sigmoid_derivative(unit.output) * unit.error * learning_rate;

            for &c in &unit.incoming {
                let connection = &mut self.connections[c];
                connection.weight += gradient * previous.units[connection.source.index].output;
            }

            unit.bias += gradient;
        }
    }

    fn check_dataset<I, T>(&self, inputs: &[I], targets: &[T]) -> Result<()>
    where
        I: AsRef<[f64]>,
        T: AsRef<[f64]>,
    {
        if inputs.len() != targets.len() {
            return Err(Error::invalid(format!(
                "got {} input vector(s) but {} target vector(s)",
                inputs.len(),
                targets.len()
            )));
        }

        if let Some(k) = inputs
            .iter()
            .position(|input| input.as_ref().len() != self.input_len())
        {
            return Err(Error::invalid(format!(
                "input {k} has {} value(s), expected {}",
                inputs[k].as_ref().len(),
                self.input_len()
            )));
        }

        if let Some(k) = targets
            .iter()
            .position(|target| target.as_ref().len() != self.output_len())
        {
            return Err(Error::invalid(format!(
                "target {k} has {} value(s), expected {}",
                targets[k].as_ref().len(),
                self.output_len()
            )));
        }

        Ok(())
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn input_len(&self) -> usize {
        self.layer_sizes[0]
    }

    pub fn output_len(&self) -> usize {
        self.layer_sizes[self.last_layer()]
    }

    /// Index of the output layer.
    pub fn last_layer(&self) -> usize {
        self.layer_sizes.len() - 1
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Every connection, indexed the way [`Unit::incoming`] and [`Unit::outgoing`] refer to them.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.layers.get(id.layer)?.units.get(id.index)
    }

    pub fn connection(&self, index: usize) -> Option<&Connection> {
        self.connections.get(index)
    }

    pub fn set_weight(&mut self, index: usize, weight: f64) -> Result<()> {
        let count = self.connections.len();
        let connection = self
            .connections
            .get_mut(index)
            .ok_or_else(|| Error::invalid(format!("no connection {index} among {count}")))?;
        connection.weight = weight;
        Ok(())
    }

    pub fn set_bias(&mut self, id: UnitId, bias: f64) -> Result<()> {
        let unit = self
            .layers
            .get_mut(id.layer)
            .and_then(|layer| layer.units.get_mut(id.index))
            .ok_or_else(|| Error::invalid(format!("no unit at {id:?}")))?;
        unit.bias = bias;
        Ok(())
    }
}

pub(crate) fn validate_sizes(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(Error::invalid(format!(
            "a network needs at least an input and an output layer, got {} layer(s)",
            layer_sizes.len()
        )));
    }
    if let Some(layer) = layer_sizes.iter().position(|&size| size == 0) {
        return Err(Error::invalid(format!("layer {layer} has no units")));
    }
    if unit_count(layer_sizes).is_none() || connection_count(layer_sizes).is_none() {
        return Err(Error::invalid(format!(
            "layer sizes {layer_sizes:?} overflow the unit or connection count"
        )));
    }
    Ok(())
}

/// Total number of units, `None` on overflow.
pub(crate) fn unit_count(layer_sizes: &[usize]) -> Option<usize> {
    layer_sizes
        .iter()
        .try_fold(0usize, |acc, &size| acc.checked_add(size))
}

/// Total number of connections, `None` on overflow.
pub(crate) fn connection_count(layer_sizes: &[usize]) -> Option<usize> {
    layer_sizes
        .windows(2)
        .try_fold(0usize, |acc, pair| acc.checked_add(pair[0].checked_mul(pair[1])?))
}
