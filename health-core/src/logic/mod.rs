pub mod features;
pub mod model;
