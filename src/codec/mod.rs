//! Codec module - request parameter encoding of searches

mod wire;
mod quick;

pub use wire::{
    decode, decode_lenient, encode, parse_query_string, to_query_string, Param, FIELD_KEY,
    LOOKUP_KEY, NEGATE_KEY, QUERY_KEY,
};
pub use quick::quick_search;
