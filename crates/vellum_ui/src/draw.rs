//! Draw lists and the final frame buffer.
//!
//! Each window appends triangles to its own [`DrawList`]. At the end of the
//! frame the lists are concatenated back to front into one [`DrawData`] that
//! the host renders command by command with scissoring and alpha blending.

use crate::clip::{ClipStack, ClipTest};
use crate::font::{Font, TextureId};
use crate::style::Color;
use vellum_core::{Rect, Vec2};

/// Vertex for UI rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawVertex {
    /// Position (x, y) in logical pixels.
    pub position: [f32; 2],
    /// UV coordinates.
    pub uv: [f32; 2],
    /// Color (RGBA).
    pub color: [f32; 4],
}

impl DrawVertex {
    /// Creates a new vertex.
    #[must_use]
    pub const fn new(pos: Vec2, uv: Vec2, color: [f32; 4]) -> Self {
        Self {
            position: [pos.x, pos.y],
            uv: [uv.x, uv.y],
            color,
        }
    }
}

/// A run of indices sharing one clip rect and texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Scissor rectangle.
    pub clip_rect: Rect,
    /// Texture to bind.
    pub texture: TextureId,
    /// First index in the index buffer.
    pub idx_offset: u32,
    /// Number of indices.
    pub elem_count: u32,
}

impl DrawCommand {
    fn same_state(&self, clip_rect: &Rect, texture: TextureId) -> bool {
        self.clip_rect == *clip_rect && self.texture == texture
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Append-only triangle list of one container.
#[derive(Debug, Clone)]
pub struct DrawList {
    vertices: Vec<DrawVertex>,
    indices: Vec<u32>,
    commands: Vec<DrawCommand>,
    clips: ClipStack,
    /// Texture of the font atlas; solid fills sample its white texel.
    atlas: TextureId,
    white_uv: Vec2,
}

impl DrawList {
    /// Creates an empty list drawing with `atlas`.
    #[must_use]
    pub fn new(atlas: TextureId, white_uv: Vec2) -> Self {
        Self {
            vertices: Vec::with_capacity(256),
            indices: Vec::with_capacity(512),
            commands: Vec::with_capacity(16),
            clips: ClipStack::default(),
            atlas,
            white_uv,
        }
    }

    /// Empties the list and resets the clip to `base_clip`.
    pub fn reset(&mut self, base_clip: Rect) {
        self.vertices.clear();
        self.indices.clear();
        self.commands.clear();
        self.clips.reset(base_clip);
    }

    /// Vertices appended so far.
    #[must_use]
    pub fn vertices(&self) -> &[DrawVertex] {
        &self.vertices
    }

    /// Indices appended so far.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Commands appended so far.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Returns true if nothing was drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Pushes a clip rect, intersected with the current one.
    pub fn push_clip_rect(&mut self, rect: Rect) {
        self.clips.push(rect);
    }

    /// Pops the current clip rect. Returns false if none was pushed.
    pub fn pop_clip_rect(&mut self) -> bool {
        self.clips.pop().is_some()
    }

    /// Current effective clip rect.
    #[must_use]
    pub fn clip_rect(&self) -> Rect {
        self.clips.current()
    }

    /// Number of pushed clip rects.
    #[must_use]
    pub fn clip_depth(&self) -> usize {
        self.clips.depth()
    }

    /// Drops clip rects above `depth`.
    pub fn truncate_clips(&mut self, depth: usize) {
        self.clips.truncate(depth);
    }

    /// Classifies `rect` against the current clip.
    #[must_use]
    pub fn clip_test(&self, rect: &Rect) -> ClipTest {
        self.clips.test(rect)
    }

    /// Reserves room for a primitive and returns its first vertex index.
    fn reserve(&mut self, texture: TextureId, idx_count: usize) -> u32 {
        let clip = self.clips.current();
        let idx_len = to_u32(self.indices.len());
        match self.commands.last_mut() {
            Some(last)
                if last.same_state(&clip, texture) && last.idx_offset + last.elem_count == idx_len =>
            {
                last.elem_count += to_u32(idx_count);
            }
            _ => self.commands.push(DrawCommand {
                clip_rect: clip,
                texture,
                idx_offset: idx_len,
                elem_count: to_u32(idx_count),
            }),
        }
        to_u32(self.vertices.len())
    }

    /// Quad with explicit UVs, clipped on the CPU.
    fn quad_uv(&mut self, rect: Rect, uv_min: Vec2, uv_max: Vec2, texture: TextureId, color: Color) {
        if color.is_invisible() {
            return;
        }
        let (rect, uv_min, uv_max) = match self.clip_test(&rect) {
            ClipTest::Outside => return,
            ClipTest::Inside => (rect, uv_min, uv_max),
            ClipTest::Partial => {
                let clip = self.clips.current();
                let Some(visible) = rect.intersection(&clip) else {
                    return;
                };
                let uv_span = uv_max - uv_min;
                let to_uv = |p: Vec2| {
                    Vec2::new(
                        uv_min.x + (p.x - rect.x) / rect.width * uv_span.x,
                        uv_min.y + (p.y - rect.y) / rect.height * uv_span.y,
                    )
                };
                (visible, to_uv(visible.min()), to_uv(visible.max()))
            }
        };

        let base = self.reserve(texture, 6);
        let c = color.to_array();
        let (min, max) = (rect.min(), rect.max());
        self.vertices.extend_from_slice(&[
            DrawVertex::new(min, uv_min, c),
            DrawVertex::new(Vec2::new(max.x, min.y), Vec2::new(uv_max.x, uv_min.y), c),
            DrawVertex::new(max, uv_max, c),
            DrawVertex::new(Vec2::new(min.x, max.y), Vec2::new(uv_min.x, uv_max.y), c),
        ]);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Convex polygon fan, kept whole and left to the scissor rect.
    fn convex_fill(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 || color.is_invisible() {
            return;
        }
        let bounds = points
            .iter()
            .skip(1)
            .fold(Rect::from_pos_size(points[0], Vec2::ZERO), |acc, &p| {
                acc.union(&Rect::from_pos_size(p, Vec2::ZERO))
            });
        // zero-area bounds still count if they touch the clip
        let bounds_rect = Rect::from_pos_size(bounds.min(), bounds.size().max(Vec2::splat(f32::EPSILON)));
        if self.clip_test(&bounds_rect) == ClipTest::Outside {
            return;
        }

        let base = self.reserve(self.atlas, (points.len() - 2) * 3);
        let c = color.to_array();
        let uv = self.white_uv;
        self.vertices
            .extend(points.iter().map(|&p| DrawVertex::new(p, uv, c)));
        for i in 1..to_u32(points.len()) - 1 {
            self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }

    /// Filled axis-aligned rectangle.
    pub fn add_rect_filled(&mut self, rect: Rect, color: Color) {
        let uv = self.white_uv;
        self.quad_uv(rect, uv, uv, self.atlas, color);
    }

    /// Rectangle outline drawn inside `rect`.
    pub fn add_rect(&mut self, rect: Rect, color: Color, thickness: f32) {
        if thickness <= 0.0 {
            return;
        }
        let t = thickness.min(rect.width * 0.5).min(rect.height * 0.5);
        let inner_height = (rect.height - t * 2.0).max(0.0);
        self.add_rect_filled(Rect::new(rect.x, rect.y, rect.width, t), color);
        self.add_rect_filled(Rect::new(rect.x, rect.bottom() - t, rect.width, t), color);
        self.add_rect_filled(Rect::new(rect.x, rect.y + t, t, inner_height), color);
        self.add_rect_filled(Rect::new(rect.right() - t, rect.y + t, t, inner_height), color);
    }

    /// Line segment of the given thickness.
    pub fn add_line(&mut self, a: Vec2, b: Vec2, color: Color, thickness: f32) {
        let delta = b - a;
        let len = delta.length();
        if len <= f32::EPSILON {
            return;
        }
        let normal = Vec2::new(-delta.y, delta.x) * (thickness * 0.5 / len);
        self.convex_fill(&[a + normal, b + normal, b - normal, a - normal], color);
    }

    /// Filled triangle.
    pub fn add_triangle_filled(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        self.convex_fill(&[a, b, c], color);
    }

    /// Filled circle. `segments == 0` picks a count from the radius.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn add_circle_filled(&mut self, center: Vec2, radius: f32, color: Color, segments: usize) {
        if radius <= 0.0 {
            return;
        }
        let segments = if segments == 0 {
            ((radius * 0.75) as usize).clamp(8, 64)
        } else {
            segments.max(3)
        };
        let points: Vec<Vec2> = (0..segments)
            .map(|i| {
                let angle = std::f32::consts::TAU * i as f32 / segments as f32;
                center + Vec2::new(angle.cos(), angle.sin()) * radius
            })
            .collect();
        self.convex_fill(&points, color);
    }

    /// Textured quad.
    pub fn add_image(&mut self, texture: TextureId, rect: Rect, uv_min: Vec2, uv_max: Vec2, tint: Color) {
        self.quad_uv(rect, uv_min, uv_max, texture, tint);
    }

    /// Text with its top-left corner at `pos`. Lines break on `'\n'`.
    pub fn add_text(&mut self, font: &Font, pos: Vec2, color: Color, text: &str) {
        if text.is_empty() || color.is_invisible() {
            return;
        }
        let bounds = Rect::from_pos_size(pos, font.calc_text_size(text));
        if self.clip_test(&bounds) == ClipTest::Outside {
            return;
        }
        let mut pen = pos;
        for c in text.chars() {
            if c == '\n' {
                pen = Vec2::new(pos.x, pen.y + font.size);
                continue;
            }
            let glyph = font.glyph(c);
            if !glyph.is_blank() {
                let quad = Rect::from_pos_size(pen + glyph.offset, glyph.size);
                self.quad_uv(quad, glyph.uv_min, glyph.uv_max, self.atlas, color);
            }
            pen.x += glyph.advance;
        }
    }
}

/// Everything the host needs to render one frame.
#[derive(Debug, Clone, Default)]
pub struct DrawData {
    /// All vertices, back to front.
    pub vertices: Vec<DrawVertex>,
    /// All indices, already rebased into `vertices`.
    pub indices: Vec<u32>,
    /// Commands in submission order.
    pub commands: Vec<DrawCommand>,
}

impl DrawData {
    /// Concatenates `lists` back to front.
    #[must_use]
    pub fn build<'a>(lists: impl IntoIterator<Item = &'a DrawList>) -> Self {
        let mut data = Self::default();
        for list in lists {
            data.append(list);
        }
        data
    }

    /// Empties the buffers, keeping their allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.commands.clear();
    }

    /// Appends `list` on top of what is already there.
    pub fn append(&mut self, list: &DrawList) {
        if list.is_empty() {
            return;
        }
        let vtx_base = to_u32(self.vertices.len());
        let idx_base = to_u32(self.indices.len());
        self.vertices.extend_from_slice(&list.vertices);
        self.indices.extend(list.indices.iter().map(|i| i + vtx_base));

        for cmd in list.commands.iter().filter(|c| c.elem_count > 0) {
            let idx_offset = cmd.idx_offset + idx_base;
            match self.commands.last_mut() {
                Some(last)
                    if last.same_state(&cmd.clip_rect, cmd.texture)
                        && last.idx_offset + last.elem_count == idx_offset =>
                {
                    last.elem_count += cmd.elem_count;
                }
                _ => self.commands.push(DrawCommand { idx_offset, ..*cmd }),
            }
        }
    }

    /// Total vertex count.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Vertex buffer as bytes for upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as bytes for upload.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATLAS: TextureId = TextureId(1);

    fn list() -> DrawList {
        let mut list = DrawList::new(ATLAS, Vec2::ZERO);
        list.reset(Rect::new(0.0, 0.0, 100.0, 100.0));
        list
    }

    #[test]
    fn test_same_state_coalesces() {
        let mut list = list();
        list.add_rect_filled(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        list.add_triangle_filled(Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(0.0, 5.0), Color::WHITE);
        assert_eq!(list.commands().len(), 1);
        assert_eq!(list.commands()[0].elem_count, 9);

        list.push_clip_rect(Rect::new(0.0, 0.0, 50.0, 50.0));
        list.add_rect_filled(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        list.pop_clip_rect();
        list.add_rect_filled(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        assert_eq!(list.commands().len(), 3);

        list.add_image(TextureId(7), Rect::new(0.0, 0.0, 10.0, 10.0), Vec2::ZERO, Vec2::splat(1.0), Color::WHITE);
        assert_eq!(list.commands().len(), 4);
    }

    #[test]
    fn test_fully_clipped_emits_nothing() {
        let mut list = list();
        list.add_rect_filled(Rect::new(200.0, 0.0, 10.0, 10.0), Color::WHITE);
        list.add_circle_filled(Vec2::new(-50.0, -50.0), 10.0, Color::WHITE, 0);
        list.add_line(Vec2::new(150.0, 0.0), Vec2::new(150.0, 50.0), Color::WHITE, 1.0);
        assert!(list.vertices().is_empty());
        assert!(list.commands().is_empty());
    }

    #[test]
    fn test_partial_quad_clips_uvs() {
        let mut list = list();
        list.add_image(
            TextureId(3),
            Rect::new(50.0, 0.0, 100.0, 10.0),
            Vec2::ZERO,
            Vec2::splat(1.0),
            Color::WHITE,
        );
        let v = list.vertices();
        assert_eq!(v.len(), 4);
        assert_eq!(v[1].position, [100.0, 0.0]);
        assert!((v[1].uv[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_invisible_color_skipped() {
        let mut list = list();
        list.add_rect_filled(Rect::new(0.0, 0.0, 10.0, 10.0), Color::TRANSPARENT);
        assert!(list.is_empty());
    }

    #[test]
    fn test_draw_data_rebases_and_merges() {
        let mut back = list();
        back.add_rect_filled(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        let mut front = list();
        front.add_rect_filled(Rect::new(5.0, 5.0, 10.0, 10.0), Color::BLACK);

        let data = DrawData::build([&back, &front]);
        assert_eq!(data.vertex_count(), 8);
        assert_eq!(&data.indices[6..], &[4, 5, 6, 4, 6, 7]);
        // equal clip and texture across lists collapse into one command
        assert_eq!(data.commands.len(), 1);
        assert_eq!(data.commands[0].elem_count, 12);
        assert_eq!(data.vertex_bytes().len(), 8 * std::mem::size_of::<DrawVertex>());
        assert_eq!(data.index_bytes().len(), 12 * 4);
    }

    #[test]
    fn test_text_quads() {
        let atlas = crate::font::FontAtlas::monospace(ATLAS, 7.0, 13.0);
        let mut list = list();
        list.add_text(&atlas.font, Vec2::new(1.0, 1.0), Color::WHITE, "a b");
        // blank glyph for the space
        assert_eq!(list.vertices().len(), 8);
        assert_eq!(list.vertices()[4].position, [15.0, 1.0]);
    }
}
