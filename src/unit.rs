use rand::Rng;

/// Position of a unit inside a network: layer index, then index within the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId {
    pub layer: usize,
    pub index: usize,
}

impl UnitId {
    pub fn new(layer: usize, index: usize) -> Self {
        UnitId { layer, index }
    }
}

/// A directed, weighted link feeding `source`'s output into `target`.
///
/// Connections live in a single arena owned by the network; units refer to
/// them by their position in that arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub(crate) source: UnitId,
    pub(crate) target: UnitId,
    pub(crate) weight: f64,
}

impl Connection {
    pub(crate) fn new(source: UnitId, target: UnitId, weight: f64) -> Self {
        Connection {
            source,
            target,
            weight,
        }
    }

    pub fn source(&self) -> UnitId {
        self.source
    }

    pub fn target(&self) -> UnitId {
        self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// A single scalar neuron.
///
/// `error` is scratch space for backpropagation. It only holds a meaningful
/// value while `train` is running and must not be relied upon between calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub(crate) output: f64,
    pub(crate) bias: f64,
    pub(crate) error: f64,
    pub(crate) incoming: Vec<usize>, // Connection arena indices, creation order
    pub(crate) outgoing: Vec<usize>,
}

impl Unit {
    pub(crate) fn new(bias: f64) -> Self {
        Unit {
            output: 0.0,
            bias,
            error: 0.0,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub(crate) fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Unit::new(initial_parameter(rng))
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn incoming(&self) -> &[usize] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[usize] {
        &self.outgoing
    }
}

/// Uniform draw from (-0.5, 0.5], used for every fresh bias and weight.
pub(crate) fn initial_parameter<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    0.5 - rng.random::<f64>()
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of the sigmoid expressed through its output `y = sigmoid(x)`.
pub(crate) fn sigmoid_derivative(y: f64) -> f64 {
    y * (1.0 - y)
}
