//! CPU mip-chain generation.

use std::borrow::Cow;

/// Number of levels in a full chain down to 1x1: `floor(log2(max(w, h))) + 1`.
#[inline]
pub fn full_mip_count(width: u32, height: u32) -> u32 {
    u32::BITS - width.max(height).max(1).leading_zeros()
}

/// Extent of mip `level`, never below 1x1.
#[inline]
pub fn mip_extent(width: u32, height: u32, level: u32) -> (u32, u32) {
    let shrink = |v: u32| v.checked_shr(level).unwrap_or(0).max(1);
    (shrink(width), shrink(height))
}

/// One level of a mip chain, tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel<'a> {
    pub width: u32,
    pub height: u32,
    pub data: Cow<'a, [u8]>,
}

/// Halves an image with a 2x2 box filter.
///
/// Each output channel is the truncated mean of the four covered source
/// texels. On odd edges the last row/column is reused.
pub fn downsample_box(src: &[u8], width: u32, height: u32, bpp: u32) -> (Vec<u8>, u32, u32) {
    let (w, h, bpp) = (width.max(1) as usize, height.max(1) as usize, bpp as usize);
    debug_assert_eq!(src.len(), w * h * bpp, "source does not match extent");

    let (dw, dh) = ((w / 2).max(1), (h / 2).max(1));
    let mut dst = Vec::with_capacity(dw * dh * bpp);
    let texel = |x: usize, y: usize, c: usize| src[(y * w + x) * bpp + c] as u32;

    for dy in 0..dh {
        let (y0, y1) = (2 * dy, (2 * dy + 1).min(h - 1));
        for dx in 0..dw {
            let (x0, x1) = (2 * dx, (2 * dx + 1).min(w - 1));
            for c in 0..bpp {
                let sum = texel(x0, y0, c) + texel(x1, y0, c) + texel(x0, y1, c) + texel(x1, y1, c);
                dst.push((sum / 4) as u8);
            }
        }
    }

    (dst, dw as u32, dh as u32)
}

/// Builds `count` levels starting from `level0`, which is borrowed, not copied.
pub fn build_mip_chain(
    level0: &[u8],
    width: u32,
    height: u32,
    bpp: u32,
    count: u32,
) -> Vec<MipLevel<'_>> {
    let mut levels = Vec::with_capacity(count.max(1) as usize);
    levels.push(MipLevel {
        width,
        height,
        data: Cow::Borrowed(level0),
    });

    for _ in 1..count {
        let Some(prev) = levels.last() else { break };
        let (data, w, h) = downsample_box(&prev.data, prev.width, prev.height, bpp);
        levels.push(MipLevel {
            width: w,
            height: h,
            data: Cow::Owned(data),
        });
    }

    levels
}
