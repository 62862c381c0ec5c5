//! Index patterns and limits shared by the batch renderers.

/// Texture units cycled by the sprite batch; also its maximum quads per draw.
pub const TEXTURE_SLOTS: usize = crate::gpu::TEXTURE_UNITS as usize;

/// Vertex capacity of one geometry batch draw.
pub const GEO_BATCH_MAX_VERTICES: usize = 48;

/// Quad corners arrive as (left-bottom, left-top, right-bottom, right-top).
const QUAD_PATTERN: [u16; 6] = [0, 1, 3, 0, 3, 2];

/// Appends two triangles per quad for `quads` consecutive 4-vertex quads.
pub(super) fn push_quad_indices(quads: usize, out: &mut Vec<u16>) {
    out.reserve(quads * 6);
    for q in 0..quads {
        let base = (q * 4) as u16;
        out.extend(QUAD_PATTERN.iter().map(|i| base + i));
    }
}

/// Appends `0..vertices` grouped by `stride` (2 for lines, 3 for triangles).
pub(super) fn push_sequential_indices(vertices: usize, stride: usize, out: &mut Vec<u16>) {
    let whole = vertices - vertices % stride;
    out.extend((0..whole).map(|i| i as u16));
}
