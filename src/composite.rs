pub type Rgba8 = [u8; 4];

pub const WHITE: Rgba8 = [255, 255, 255, 255];
pub const BLACK: Rgba8 = [0, 0, 0, 255];

/// Source-over onto an opaque destination, with the source alpha scaled by
/// `coverage` (0..1, used for anti-aliased stroke edges).
///
/// The drawing surface is always opaque (solid background), so the result
/// stays opaque and the blend reduces to a straight lerp by effective alpha.
pub fn over_opaque(dst: Rgba8, src: Rgba8, coverage: f32) -> Rgba8 {
    let coverage = coverage.clamp(0.0, 1.0);
    if coverage <= 0.0 || src[3] == 0 {
        return dst;
    }

    let cov = ((coverage * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), cov);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = 255;
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), u16::from(sa));
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Composite a straight-alpha pixel onto an opaque white background,
/// returning the resulting RGB triple.
pub fn on_white(px: Rgba8) -> [u8; 3] {
    let sa = u16::from(px[3]);
    if sa == 255 {
        return [px[0], px[1], px[2]];
    }
    let inv = 255u16 - sa;
    let mut out = [0u8; 3];
    for i in 0..3 {
        out[i] = add_sat_u8(mul_div255(u16::from(px[i]), sa), mul_div255(255, inv));
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}
