pub mod forward;
pub mod gradients;
pub mod network;
pub mod params;
pub mod topology;

pub use forward::ForwardPass;
pub use gradients::Gradients;
pub use network::{Guess, Network, OutputDerivative};
pub use params::Parameters;
pub use topology::{Topology, INPUT_SIZE, OUTPUT_SIZE};
