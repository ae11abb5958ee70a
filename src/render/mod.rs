pub(crate) mod gradient;
pub(crate) mod shadow;
pub(crate) mod surface;
pub(crate) mod templates;
