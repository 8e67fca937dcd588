//! Tree nodes and collapsing headers.

use crate::context::Context;
use crate::state::ToggleState;
use crate::style::StyleColor;
use vellum_core::{display_part, Vec2};

fn tree_node_behavior(ctx: &mut Context, label: &str, framed: bool) -> bool {
    let id = ctx.get_id(label);
    let text = display_part(label);
    let font_size = ctx.font().size;
    let padding = ctx.style().frame_padding;
    let spacing = ctx.style().item_inner_spacing.x;
    let height = if framed { ctx.frame_height() } else { font_size };
    let text_w = ctx.text_size(text).x;
    let width = ctx
        .content_region_avail()
        .x
        .max(padding.x * 2.0 + font_size + spacing + text_w);
    let rect = ctx.item_size(Vec2::new(width, height));
    let inter = ctx.button_behavior(rect, id);

    let state = ctx.state_mut().get_or_default::<ToggleState>(id);
    if inter.pressed {
        state.open = !state.open;
    }
    let open = state.open;

    if ctx.is_rect_visible(rect) {
        let slot = if inter.held && inter.hovered {
            Some(StyleColor::HeaderActive)
        } else if inter.hovered {
            Some(StyleColor::HeaderHovered)
        } else if framed {
            Some(StyleColor::Header)
        } else {
            None
        };
        if let Some(slot) = slot {
            let fill = ctx.color(slot);
            ctx.render_frame(rect, fill);
        }
        let pad_y = if framed { padding.y } else { 0.0 };
        let text_color = ctx.color(StyleColor::Text);
        ctx.render_arrow(Vec2::new(rect.x + padding.x, rect.y + pad_y), font_size, open, text_color);
        let text_pos = Vec2::new(rect.x + padding.x + font_size + spacing, rect.y + pad_y);
        ctx.add_text(text_pos, text_color, text);
    }
    open
}

/// Full-width framed header. Returns true while open; content is not
/// indented and needs no pop.
pub fn collapsing_header(ctx: &mut Context, label: &str) -> bool {
    if ctx.skip_items("collapsing_header") {
        return false;
    }
    tree_node_behavior(ctx, label, true)
}

/// Tree node. While it returns true the content is indented and scoped
/// under the node's id; close it with [`tree_pop`].
pub fn tree_node(ctx: &mut Context, label: &str) -> bool {
    if ctx.skip_items("tree_node") {
        return false;
    }
    let open = tree_node_behavior(ctx, label, false);
    if open {
        ctx.tree_push(label);
    }
    open
}

/// Closes a tree node opened by [`tree_node`].
pub fn tree_pop(ctx: &mut Context) {
    ctx.tree_pop();
}
