mod builder;
mod gains;
mod layout;
mod solution;

pub use builder::SdpBuilder;
pub use gains::{extract_gains, DEFAULT_COND_LIMIT};
pub use layout::VarLayout;
pub use solution::SteeringSolution;

#[cfg(test)]
mod tests;
