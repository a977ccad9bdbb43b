pub(crate) mod export;
pub(crate) mod limits;
pub(crate) mod shared;
