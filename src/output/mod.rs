pub(crate) mod materialize;
