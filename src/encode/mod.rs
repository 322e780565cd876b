pub(crate) mod dump;
pub(crate) mod sink;
#[cfg(feature = "rerun")]
pub(crate) mod viewer;
