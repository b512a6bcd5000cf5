pub mod deploy;
pub mod plan;
