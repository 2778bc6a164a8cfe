pub(crate) mod frame;
pub(crate) mod scroller;
pub(crate) mod velocity;
