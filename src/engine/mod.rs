pub(crate) mod resize;
pub(crate) mod session;
