pub(crate) mod drift;
pub(crate) mod header;
