pub mod clock;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod merge;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod projection;
pub mod records;
pub mod summary;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
