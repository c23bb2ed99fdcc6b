//! Package metadata baked in by `build.rs`.

include!(concat!(env!("OUT_DIR"), "/app_metadata.rs"));
