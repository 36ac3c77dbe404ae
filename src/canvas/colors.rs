use crate::config::Palette;

/// Map a magnitude to 0-255 on the linear range `[-0.1·max, 1.2·max]`.
/// Values outside the range are clamped; a non-positive `max_mag` maps everything to 0.
pub fn magnitude_to_byte(mag: f64, max_mag: f64) -> u8 {
    if !(max_mag > 0.0) {
        return 0;
    }
    let lo = -0.1 * max_mag;
    let hi = 1.2 * max_mag;
    let scaled = (mag - lo) / (hi - lo) * 255.0;
    scaled.max(0.0).min(255.0) as u8
}

/// Per-channel 256-entry lookup table applied after greyscale mapping.
pub struct ColorLut {
    red: [u8; 256],
    green: [u8; 256],
    blue: [u8; 256],
}

impl ColorLut {
    pub fn for_palette(palette: Palette) -> Self {
        match palette {
            Palette::Greyscale => Self::greyscale(),
            Palette::Heat => Self::heat(),
        }
    }

    /// Identity table.
    pub fn greyscale() -> Self {
        let mut ramp = [0u8; 256];
        for (i, v) in ramp.iter_mut().enumerate() {
            *v = i as u8;
        }
        Self {
            red: ramp,
            green: ramp,
            blue: ramp,
        }
    }

    /// Black → red → yellow → white.
    pub fn heat() -> Self {
        let mut red = [0u8; 256];
        let mut green = [0u8; 256];
        let mut blue = [0u8; 256];
        for i in 0..256usize {
            let t = i as f32 / 255.0;
            red[i] = channel_ramp(t, 0.0, 1.0 / 3.0);
            green[i] = channel_ramp(t, 1.0 / 3.0, 2.0 / 3.0);
            blue[i] = channel_ramp(t, 2.0 / 3.0, 1.0);
        }
        Self { red, green, blue }
    }

    /// RGBA for a grey level; alpha is always opaque.
    #[inline]
    pub fn apply(&self, grey: u8) -> [u8; 4] {
        let i = grey as usize;
        [self.red[i], self.green[i], self.blue[i], 255]
    }
}

/// Linear ramp from 0 at `edge0` to 255 at `edge1`, clamped.
fn channel_ramp(t: f32, edge0: f32, edge1: f32) -> u8 {
    let x = ((t - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    (x * 255.0).round() as u8
}
