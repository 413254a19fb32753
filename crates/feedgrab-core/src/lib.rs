pub mod config;
pub mod logging;

pub mod acquire;
pub mod carousel;
pub mod control;
pub mod dom;
pub mod feed;
pub mod item;
pub mod media;
pub mod naming;
pub mod seen;
pub mod selectors;
pub mod sink;
pub mod snapshot;
pub mod stats;
pub mod storage;
pub mod surface;
