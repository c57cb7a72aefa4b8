pub mod allocate;
pub mod annotate;
pub mod conflict;
