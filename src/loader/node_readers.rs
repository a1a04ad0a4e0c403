//! Typed readers over node attribute strings.

use crate::math::{
    wavelen_to_wavenum, Float, Range, Vec3, Wavelength, WavenumberRange, PI,
};
use crate::{Error, Result};

fn parse_err(what: &str, input: &str) -> Error {
    Error::Loader(format!("cannot parse {what} from \"{input}\""))
}

/// Parses a boolean from `true/false/1/0`.
pub fn read_bool(s: &str) -> Result<bool> {
    match s.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(parse_err("bool", other)),
    }
}

/// Parses an integer.
pub fn read_int(s: &str) -> Result<i64> {
    s.trim().parse().map_err(|_| parse_err("integer", s))
}

/// Parses a floating point value, accepting the simple math expressions
/// scene files use: an optional leading fraction (`1/3`) and the constant
/// `pi` with an optional multiplier (`2pi`, `pi/4`).
pub fn read_float(s: &str) -> Result<Float> {
    let t = s.trim();
    if let Ok(v) = t.parse::<Float>() {
        return Ok(v);
    }

    // "a/b" fractions
    if let Some((num, den)) = t.split_once('/') {
        let n = read_float(num)?;
        let d = read_float(den)?;
        if d == 0.0 {
            return Err(parse_err("float (division by zero)", s));
        }
        return Ok(n / d);
    }

    // "pi", "2pi", "-pi"
    if let Some(prefix) = t.strip_suffix("pi") {
        let mul = match prefix.trim() {
            "" => 1.0,
            "-" => -1.0,
            p => p.parse::<Float>().map_err(|_| parse_err("float", s))?,
        };
        return Ok(mul * PI);
    }

    Err(parse_err("float", s))
}

/// Parses a comma- or whitespace-separated 3-vector.
pub fn read_vec3(s: &str) -> Result<Vec3> {
    let parts: Vec<&str> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return Err(parse_err("vec3", s));
    }
    Ok(Vec3::new(
        read_float(parts[0])?,
        read_float(parts[1])?,
        read_float(parts[2])?,
    ))
}

/// Parses a scalar range written as `"min max"` or `"min..max"`.
pub fn read_range(s: &str) -> Result<Range> {
    let t = s.trim();
    let (a, b) = if let Some((a, b)) = t.split_once("..") {
        (a, b)
    } else {
        let parts: Vec<&str> = t.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(parse_err("range", s));
        }
        (parts[0], parts[1])
    };
    let lo = read_float(a)?;
    let hi = read_float(b)?;
    if hi < lo {
        return Err(parse_err("range (max < min)", s));
    }
    Ok(Range::new(lo, hi))
}

/// Parses a quantity with a unit suffix into millimetres
/// (`nm`, `um`/`µm`, `mm`, `cm`, `m`).
pub fn read_length_mm(s: &str) -> Result<Float> {
    let t = s.trim();
    const UNITS: [(&str, Float); 6] = [
        ("nm", 1e-6),
        ("µm", 1e-3),
        ("um", 1e-3),
        ("mm", 1.0),
        ("cm", 10.0),
        ("m", 1000.0),
    ];
    for (suffix, scale) in UNITS {
        if let Some(v) = t.strip_suffix(suffix) {
            // guard against e.g. "nm" matching the bare "m" suffix
            if v.chars().last().map_or(true, |c| !c.is_alphabetic()) {
                return Ok(read_float(v)? * scale);
            }
        }
    }
    Err(parse_err("length", s))
}

/// Parses a wavelength range (e.g. `"380nm 780nm"`) into the matching
/// wavenumber range; the bounds flip under `k = 2π/λ`.
pub fn read_wavelength_range(s: &str) -> Result<WavenumberRange> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(parse_err("wavelength range", s));
    }
    let wl0 = read_length_mm(parts[0])?;
    let wl1 = read_length_mm(parts[1])?;
    if wl0 <= 0.0 || wl1 <= wl0 {
        return Err(parse_err("wavelength range", s));
    }
    Ok(Range::new(
        wavelen_to_wavenum(Wavelength::from_mm(wl1)),
        wavelen_to_wavenum(Wavelength::from_mm(wl0)),
    ))
}
