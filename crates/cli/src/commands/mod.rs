pub mod classify;
pub mod functions;
pub mod scan;

pub use classify::*;
pub use functions::*;
pub use scan::*;
