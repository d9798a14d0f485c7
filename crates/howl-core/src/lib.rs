pub mod activity;
pub mod coyote;
pub mod error;
pub mod generator;
pub mod math;
pub mod pulse;
pub mod random;
pub mod shapes;
pub mod smoothed;
pub mod source;
pub mod timer;
pub mod track;
pub mod variance;
pub mod wave;
pub mod wave_manager;

pub use activity::{Activity, ActivityKind, Simulation};
pub use coyote::*;
pub use error::*;
pub use generator::*;
pub use pulse::*;
pub use shapes::*;
pub use smoothed::*;
pub use source::*;
pub use timer::*;
pub use track::*;
pub use variance::*;
pub use wave::*;
pub use wave_manager::*;
