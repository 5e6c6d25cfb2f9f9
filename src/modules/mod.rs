pub mod journey;
pub mod reflection;
