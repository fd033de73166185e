pub mod snapshot;
pub mod take;
