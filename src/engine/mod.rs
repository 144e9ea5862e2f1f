mod locks;
#[cfg(test)]
mod tests;
mod transfer_engine;

pub use transfer_engine::TransferEngine;
