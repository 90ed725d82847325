pub mod params;
pub mod binning;
pub mod regression_tree;
pub mod gradient_boosting;

pub use params::*;
pub use binning::*;
pub use regression_tree::*;
pub use gradient_boosting::*;
