mod core;
pub mod result;
pub use crate::core::{Calc, Point, PtF, PtI, TPtF, TPtI};
pub use result::{to_fl, ErrorKind, FlError, FlResult};
