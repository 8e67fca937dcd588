//! Single-line text field.

use crate::context::{Context, WidgetEvent};
use crate::input::{Key, MouseButton};
use crate::state::TextEditState;
use crate::style::StyleColor;
use vellum_core::{display_part, Rect, Vec2, WidgetId};

/// Editable single-line text. Returns true on frames where `buffer`
/// changed.
///
/// A click gives the field keyboard focus; Enter, Escape or a click
/// elsewhere releases it.
pub fn input_text(ctx: &mut Context, label: &str, buffer: &mut String) -> bool {
    input_text_with_limit(ctx, label, buffer, usize::MAX)
}

/// [`input_text`] limited to `max_len` bytes.
pub fn input_text_with_limit(ctx: &mut Context, label: &str, buffer: &mut String, max_len: usize) -> bool {
    if ctx.skip_items("input_text") {
        return false;
    }
    let id = ctx.get_id(label);
    let text = display_part(label);
    let width = ctx.calc_item_width();
    let height = ctx.frame_height();
    let padding = ctx.style().frame_padding;
    let spacing = ctx.style().item_inner_spacing.x;
    let label_w = if text.is_empty() { 0.0 } else { spacing + ctx.text_size(text).x };
    let rect = ctx.item_size(Vec2::new(width + label_w, height));
    let frame = Rect::from_pos_size(rect.min(), Vec2::new(width, height));
    let inter = ctx.button_behavior(frame, id);

    // a press and release in one frame leaves the field inactive but still focuses it
    if (inter.held || inter.pressed) && ctx.input().mouse_pressed(MouseButton::Left) {
        ctx.set_keyboard_focus(id);
        if let Some(mouse) = ctx.input().mouse_pos() {
            let scroll_x = ctx.state().get::<TextEditState>(id).map_or(0.0, |s| s.scroll_x);
            let offset = ctx
                .font()
                .offset_at_x(buffer, mouse.x - frame.x - padding.x + scroll_x);
            let state = ctx.state_mut().get_or_default::<TextEditState>(id);
            state.cursor = offset;
            state.anchor = None;
        }
    }

    let focused = ctx.focus_id() == id;
    let mut changed = false;
    if focused {
        ctx.keep_alive(id);
        changed = apply_keyboard(ctx, id, buffer, max_len);
        if changed {
            ctx.push_event(WidgetEvent::Changed(id));
        }
        if ctx.input().key_pressed(Key::Enter) || ctx.input().key_pressed(Key::Escape) {
            ctx.clear_keyboard_focus();
        }
    }

    // keep the caret inside the visible part of the field
    let state = {
        let record = ctx.state_mut().get_or_default::<TextEditState>(id);
        record.clamp(buffer);
        *record
    };
    let inner_w = (frame.width - padding.x * 2.0).max(1.0);
    let caret_x = ctx.font().line_width(&buffer[..state.cursor]);
    let mut scroll_x = state.scroll_x;
    if caret_x - scroll_x > inner_w {
        scroll_x = caret_x - inner_w;
    } else if caret_x < scroll_x {
        scroll_x = caret_x;
    }
    ctx.state_mut().get_or_default::<TextEditState>(id).scroll_x = scroll_x;

    if ctx.is_rect_visible(rect) {
        let slot = if focused {
            StyleColor::FrameBgActive
        } else if inter.hovered {
            StyleColor::FrameBgHovered
        } else {
            StyleColor::FrameBg
        };
        let fill = ctx.color(slot);
        ctx.render_frame(frame, fill);

        let origin = Vec2::new(frame.x + padding.x - scroll_x, frame.y + padding.y);
        let font_size = ctx.font().size;
        ctx.push_clip_rect(frame.shrink2(Vec2::new(padding.x, 0.0)));
        if focused {
            if let Some((start, end)) = state.selection() {
                let x0 = ctx.font().line_width(&buffer[..start]);
                let x1 = ctx.font().line_width(&buffer[..end]);
                let color = ctx.color(StyleColor::TextSelectedBg);
                ctx.add_rect_filled(Rect::new(origin.x + x0, origin.y, x1 - x0, font_size), color);
            }
        }
        let text_color = ctx.color(StyleColor::Text);
        ctx.add_text(origin, text_color, buffer);
        if focused {
            let x = (origin.x + caret_x).floor();
            ctx.add_line(Vec2::new(x, origin.y), Vec2::new(x, origin.y + font_size), text_color, 1.0);
        }
        ctx.pop_clip_rect();

        if !text.is_empty() {
            ctx.add_text(Vec2::new(frame.right() + spacing, frame.y + padding.y), text_color, text);
        }
    }
    changed
}

/// Applies this frame's typed text and editing keys. Returns true if the
/// buffer changed.
fn apply_keyboard(ctx: &mut Context, id: WidgetId, buffer: &mut String, max_len: usize) -> bool {
    let input = ctx.input();
    let typed = input.text().to_owned();
    let modifiers = input.modifiers();
    let select_all = modifiers.ctrl && input.key_pressed(Key::A);
    let backspace = input.key_pressed_repeat(Key::Backspace);
    let delete = input.key_pressed_repeat(Key::Delete);
    let left = input.key_pressed_repeat(Key::Left);
    let right = input.key_pressed_repeat(Key::Right);
    let home = input.key_pressed(Key::Home);
    let end = input.key_pressed(Key::End);
    let shift = modifiers.shift;

    let state = ctx.state_mut().get_or_default::<TextEditState>(id);
    state.clamp(buffer);
    let mut changed = false;
    if select_all {
        state.select_all(buffer);
    }
    if !typed.is_empty() && !modifiers.ctrl {
        changed |= state.insert(buffer, &typed, max_len);
    }
    if backspace {
        changed |= state.backspace(buffer);
    }
    if delete {
        changed |= state.delete(buffer);
    }
    if left {
        state.move_left(buffer, shift);
    }
    if right {
        state.move_right(buffer, shift);
    }
    if home {
        state.move_home(shift);
    }
    if end {
        state.move_end(buffer, shift);
    }
    changed
}
