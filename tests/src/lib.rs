//! Cross-crate integration tests. Unit tests live next to the code
//! they cover; these exercise whole scenarios through the public API.

#[cfg(test)]
mod controller;
#[cfg(test)]
mod orchestrator;
#[cfg(test)]
mod state_store;
