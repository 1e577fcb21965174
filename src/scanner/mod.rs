pub mod normalize;
pub mod candidate;
pub mod similarity;
pub mod cue;
pub mod registry;
pub mod extract;
pub mod scene;
pub mod mention;
pub mod interaction;
pub mod script;

pub use normalize::*;
pub use candidate::*;
pub use similarity::*;
pub use cue::*;
pub use registry::*;
pub use extract::*;
pub use scene::*;
pub use mention::*;
pub use interaction::*;
pub use script::*;
