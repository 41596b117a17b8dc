//! A minimal fully-connected feedforward neural network.
//!
//! Units live in per-layer arenas and connections in a single network-wide
//! arena, so the unit/connection graph is navigated by index instead of by
//! shared references.
//!
//! ```
//! use feedforward::Network;
//!
//! let mut nn = Network::new(&[2, 3, 1])?;
//! let output = nn.propagate(&[0.0, 1.0])?;
//! assert_eq!(output.len(), 1);
//! # Ok::<(), feedforward::Error>(())
//! ```

mod error;
mod layer;
mod neural_network;
mod persistence;
mod unit;

pub use error::{Error, Result};
pub use layer::Layer;
pub use neural_network::Network;
pub use persistence::{FORMAT_VERSION, Snapshot};
pub use unit::{Connection, Unit, UnitId};
