pub mod attributes;
pub mod block_ack;
pub mod collaborators;
pub mod receive;
pub mod registry;
pub mod station;

#[cfg(test)]
mod testing;
