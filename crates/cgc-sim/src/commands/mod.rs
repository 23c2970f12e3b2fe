pub mod coarse;
pub mod common;
pub mod pentagon;
pub mod three_node;
pub mod version;
