// External waypoint suggestions and their validation

pub mod oracle;

pub use oracle::*;
