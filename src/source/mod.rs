pub(crate) mod load;
