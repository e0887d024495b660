//! Color models and the conversion table that links them.
//!
//! Every model converts to and from gamma-encoded sRGB, which acts as the hub:
//! converting `Oklch` to `LinearSrgb` goes `Oklch -> Srgb -> LinearSrgb`. The
//! hop through the hub costs a couple of extra multiplications and keeps the
//! table at one pair of functions per model.
//!
//! The table is a plain `static` built at compile time. Callers obtain it with
//! [`ConversionTable::standard`] and pass the reference along; nothing is
//! registered at runtime.
//!
//! # Example
//!
//! ```rust
//! use varsmith::color::{ColorModel, ConversionTable};
//!
//! let table = ConversionTable::standard();
//! let lch = table.convert([1.0, 1.0, 1.0], ColorModel::Srgb, ColorModel::Oklch);
//! assert!((lch[0] - 1.0).abs() < 1e-6); // white has full lightness
//! assert!(lch[1] < 1e-6); // and no chroma
//! ```

/// Identifier of a color model known to the [`ConversionTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorModel {
    /// Gamma-encoded sRGB, channels nominally in `[0, 1]`.
    Srgb,
    /// Linear-light sRGB.
    LinearSrgb,
    /// OKLab: lightness, green-red axis, blue-yellow axis.
    Oklab,
    /// OKLCH: lightness, chroma, hue in degrees.
    Oklch,
}

/// A pair of conversion routines for one model, relative to sRGB.
#[derive(Debug, Clone, Copy)]
pub struct ModelConversion {
    pub model: ColorModel,
    pub to_srgb: fn([f64; 3]) -> [f64; 3],
    pub from_srgb: fn([f64; 3]) -> [f64; 3],
}

/// Static table mapping [`ColorModel`] identifiers to their conversion routines.
#[derive(Debug)]
pub struct ConversionTable {
    entries: [ModelConversion; 4],
}

static STANDARD: ConversionTable = ConversionTable {
    entries: [
        ModelConversion {
            model: ColorModel::Srgb,
            to_srgb: identity,
            from_srgb: identity,
        },
        ModelConversion {
            model: ColorModel::LinearSrgb,
            to_srgb: linear_to_srgb,
            from_srgb: srgb_to_linear,
        },
        ModelConversion {
            model: ColorModel::Oklab,
            to_srgb: oklab_to_srgb,
            from_srgb: srgb_to_oklab,
        },
        ModelConversion {
            model: ColorModel::Oklch,
            to_srgb: oklch_to_srgb,
            from_srgb: srgb_to_oklch,
        },
    ],
};

impl ConversionTable {
    /// Returns the table with every built-in model.
    pub fn standard() -> &'static ConversionTable {
        &STANDARD
    }

    /// Looks up the conversion routines for `model`.
    pub fn get(&self, model: ColorModel) -> Option<&ModelConversion> {
        self.entries.iter().find(|entry| entry.model == model)
    }

    /// Converts three channels from one model to another through sRGB.
    ///
    /// Alpha is not part of the conversion and is carried by the caller.
    /// Models missing from the table leave the channels untouched.
    pub fn convert(&self, channels: [f64; 3], from: ColorModel, to: ColorModel) -> [f64; 3] {
        if from == to {
            return channels;
        }
        let srgb = match self.get(from) {
            Some(entry) => (entry.to_srgb)(channels),
            None => return channels,
        };
        match self.get(to) {
            Some(entry) => (entry.from_srgb)(srgb),
            None => srgb,
        }
    }
}

// ─── sRGB transfer ──────────────────────────────────────────────────────────

fn identity(channels: [f64; 3]) -> [f64; 3] {
    channels
}

fn decode_channel(c: f64) -> f64 {
    let magnitude = c.abs();
    let linear = if magnitude <= 0.04045 {
        magnitude / 12.92
    } else {
        ((magnitude + 0.055) / 1.055).powf(2.4)
    };
    linear.copysign(c)
}

fn encode_channel(c: f64) -> f64 {
    let magnitude = c.abs();
    let encoded = if magnitude <= 0.0031308 {
        12.92 * magnitude
    } else {
        1.055 * magnitude.powf(1.0 / 2.4) - 0.055
    };
    encoded.copysign(c)
}

fn srgb_to_linear([r, g, b]: [f64; 3]) -> [f64; 3] {
    [decode_channel(r), decode_channel(g), decode_channel(b)]
}

fn linear_to_srgb([r, g, b]: [f64; 3]) -> [f64; 3] {
    [encode_channel(r), encode_channel(g), encode_channel(b)]
}

// ─── OKLab ──────────────────────────────────────────────────────────────────

fn linear_to_oklab([r, g, b]: [f64; 3]) -> [f64; 3] {
    let l = 0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b;
    let m = 0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b;
    let s = 0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b;

    let l = l.cbrt();
    let m = m.cbrt();
    let s = s.cbrt();

    [
        0.2104542553 * l + 0.7936177850 * m - 0.0040720468 * s,
        1.9779984951 * l - 2.4285922050 * m + 0.4505937099 * s,
        0.0259040371 * l + 0.7827717662 * m - 0.8086757660 * s,
    ]
}

fn oklab_to_linear([l, a, b]: [f64; 3]) -> [f64; 3] {
    let l_ = l + 0.3963377774 * a + 0.2158037573 * b;
    let m_ = l - 0.1055613458 * a - 0.0638541728 * b;
    let s_ = l - 0.0894841775 * a - 1.2914855480 * b;

    let l3 = l_ * l_ * l_;
    let m3 = m_ * m_ * m_;
    let s3 = s_ * s_ * s_;

    [
        4.0767416621 * l3 - 3.3077115913 * m3 + 0.2309699292 * s3,
        -1.2684380046 * l3 + 2.6097574011 * m3 - 0.3413193965 * s3,
        -0.0041960863 * l3 - 0.7034186147 * m3 + 1.7076147010 * s3,
    ]
}

fn srgb_to_oklab(channels: [f64; 3]) -> [f64; 3] {
    linear_to_oklab(srgb_to_linear(channels))
}

fn oklab_to_srgb(channels: [f64; 3]) -> [f64; 3] {
    linear_to_srgb(oklab_to_linear(channels))
}

// ─── OKLCH ──────────────────────────────────────────────────────────────────

/// Chroma below this is treated as achromatic and reports a hue of zero.
const ACHROMATIC_EPSILON: f64 = 1e-7;

fn oklab_to_oklch([l, a, b]: [f64; 3]) -> [f64; 3] {
    let chroma = (a * a + b * b).sqrt();
    let hue = if chroma < ACHROMATIC_EPSILON {
        0.0
    } else {
        b.atan2(a).to_degrees().rem_euclid(360.0)
    };
    [l, chroma, hue]
}

fn oklch_to_oklab([l, c, h]: [f64; 3]) -> [f64; 3] {
    let radians = h.to_radians();
    [l, c * radians.cos(), c * radians.sin()]
}

fn srgb_to_oklch(channels: [f64; 3]) -> [f64; 3] {
    oklab_to_oklch(srgb_to_oklab(channels))
}

fn oklch_to_srgb(channels: [f64; 3]) -> [f64; 3] {
    oklab_to_srgb(oklch_to_oklab(channels))
}
