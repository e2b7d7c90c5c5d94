pub(crate) mod resample;
