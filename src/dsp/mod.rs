pub mod chirp;
pub mod fft;
pub mod log_bins;
