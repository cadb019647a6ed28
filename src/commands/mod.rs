pub mod snapshot;
pub mod status;
