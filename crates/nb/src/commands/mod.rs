//! CLI command implementations.

pub(crate) mod generate;
pub(crate) mod preview;

pub(crate) use generate::GenerateArgs;
pub(crate) use preview::PreviewArgs;
