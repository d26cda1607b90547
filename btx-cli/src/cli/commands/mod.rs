pub mod extract;
pub mod serve;
pub mod status;
