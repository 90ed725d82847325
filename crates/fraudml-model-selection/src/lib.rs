pub mod kfold;
pub mod param_grid;
pub mod search;

pub use kfold::*;
pub use param_grid::*;
pub use search::*;
