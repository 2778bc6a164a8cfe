pub(crate) mod binding;
pub(crate) mod range;
pub(crate) mod registry;
