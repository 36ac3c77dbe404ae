pub mod colors;
pub mod spectrogram_renderer;
pub mod waveform_renderer;
