pub mod scaler;
pub mod split;
pub mod smote;

pub use scaler::*;
pub use split::*;
pub use smote::*;
