pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod moves;
pub mod piece;
pub mod position;

#[cfg(test)]
mod test_support;

#[cfg(target_arch = "wasm32")]
mod wasm_api;
