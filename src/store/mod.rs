pub(crate) mod array;
pub(crate) mod codec;
pub(crate) mod dataset;
pub(crate) mod meta;
