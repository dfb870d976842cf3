//! Browser-side helpers kept out of page and component code.

pub mod spawn;
pub mod timer;
