use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color ramps
// ---------------------------------------------------------------------------

/// A piecewise-linear colour ramp sampled over `[0, 1]`.
/// Interpolation happens in linear RGB so midpoints don't go muddy.
#[derive(Debug, Clone)]
pub struct ColorRamp {
    stops: Vec<LinSrgb>,
}

impl ColorRamp {
    fn from_hex(stops: &[u32]) -> Self {
        let stops = stops
            .iter()
            .map(|&hex| {
                Srgb::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
                    .into_format::<f32>()
                    .into_linear()
            })
            .collect();
        ColorRamp { stops }
    }

    pub fn viridis() -> Self {
        Self::from_hex(&[0x440154, 0x3b528b, 0x21918c, 0x5ec962, 0xfde725])
    }

    pub fn rocket() -> Self {
        Self::from_hex(&[0x03051a, 0x4c1d4b, 0xa11a5b, 0xe83f3f, 0xf69c73, 0xfaebdd])
    }

    pub fn mako() -> Self {
        Self::from_hex(&[0x0b0405, 0x382a54, 0x395d9c, 0x3497a9, 0x60ceac, 0xdef5e5])
    }

    pub fn plasma() -> Self {
        Self::from_hex(&[0x0d0887, 0x7e03a8, 0xcc4778, 0xf89540, 0xf0f921])
    }

    pub fn coolwarm() -> Self {
        Self::from_hex(&[0x3b4cc0, 0x8db0fe, 0xdddddd, 0xf49a7b, 0xb40426])
    }

    pub fn yellow_green() -> Self {
        Self::from_hex(&[0xffffe5, 0xd9f0a3, 0x78c679, 0x238443, 0x004529])
    }

    /// Colour at position `t`, clamped into `[0, 1]`.
    pub fn sample(&self, t: f64) -> Color32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) as f32 } else { 0.0 };
        let segments = self.stops.len() - 1;
        let scaled = t * segments as f32;
        let idx = (scaled.floor() as usize).min(segments.saturating_sub(1));
        let local = scaled - idx as f32;
        let color = self.stops[idx].mix(self.stops[idx + 1], local);
        to_color32(color)
    }

    /// Colour for `value` placed within `[lo, hi]`.
    pub fn sample_range(&self, value: f64, lo: f64, hi: f64) -> Color32 {
        if hi - lo <= f64::EPSILON {
            return self.sample(0.5);
        }
        self.sample((value - lo) / (hi - lo))
    }

    /// `n` evenly spaced colours, used for categorical bar charts.
    pub fn discrete(&self, n: usize) -> Vec<Color32> {
        match n {
            0 => Vec::new(),
            1 => vec![self.sample(0.5)],
            _ => (0..n).map(|i| self.sample(i as f64 / (n - 1) as f64)).collect(),
        }
    }
}

fn to_color32(color: LinSrgb) -> Color32 {
    let rgb: Srgb<u8> = Srgb::from_linear(color);
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Black or white, whichever reads better on `background`.
pub fn contrast_text(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 150.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
