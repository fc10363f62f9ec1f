#[macro_use]
extern crate enum_tryfrom_derive;

#[macro_use]
pub mod parse_serialize;
pub mod ieee80211;

pub use nom;
