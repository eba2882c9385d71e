pub mod fetch;
pub mod hash;
pub mod manifest;
pub mod rewrite;
