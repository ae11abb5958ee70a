pub(crate) mod aspect;
pub(crate) mod cover;
pub(crate) mod wrap;
