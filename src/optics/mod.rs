pub(crate) mod doppler;
pub(crate) mod interferometer;
