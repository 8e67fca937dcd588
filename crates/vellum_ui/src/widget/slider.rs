//! Sliders and drag fields.
//!
//! Both capture the pointer on press: while the button is held the value
//! follows the pointer even outside the widget, and no other widget is
//! hovered.

use crate::context::{Context, WidgetEvent};
use crate::input::MouseButton;
use crate::state::DragState;
use crate::style::StyleColor;
use vellum_core::{display_part, Rect, Vec2, WidgetId};

/// Frame, label placement and id shared by every slider-like widget.
struct ScalarFrame<'a> {
    id: WidgetId,
    frame: Rect,
    label: &'a str,
}

fn place_scalar_frame<'a>(ctx: &mut Context, label: &'a str) -> ScalarFrame<'a> {
    let id = ctx.get_id(label);
    let text = display_part(label);
    let width = ctx.calc_item_width();
    let height = ctx.frame_height();
    let spacing = ctx.style().item_inner_spacing.x;
    let label_w = if text.is_empty() { 0.0 } else { spacing + ctx.text_size(text).x };
    let rect = ctx.item_size(Vec2::new(width + label_w, height));
    ScalarFrame {
        id,
        frame: Rect::from_pos_size(rect.min(), Vec2::new(width, height)),
        label: text,
    }
}

fn render_scalar_frame(ctx: &mut Context, scalar: &ScalarFrame<'_>, hovered: bool, held: bool) {
    let slot = if held {
        StyleColor::FrameBgActive
    } else if hovered {
        StyleColor::FrameBgHovered
    } else {
        StyleColor::FrameBg
    };
    let fill = ctx.color(slot);
    ctx.render_frame(scalar.frame, fill);
    if !scalar.label.is_empty() {
        let spacing = ctx.style().item_inner_spacing.x;
        let padding_y = ctx.style().frame_padding.y;
        let color = ctx.color(StyleColor::Text);
        let pos = Vec2::new(scalar.frame.right() + spacing, scalar.frame.y + padding_y);
        ctx.add_text(pos, color, scalar.label);
    }
}

/// Slider over `min..=max`. The value is set from the pointer position while
/// the slider is held.
pub fn slider_float(ctx: &mut Context, label: &str, value: &mut f32, min: f32, max: f32) -> bool {
    slider_scalar(ctx, label, value, min, max, false)
}

/// Integer slider over `min..=max`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn slider_int(ctx: &mut Context, label: &str, value: &mut i32, min: i32, max: i32) -> bool {
    let mut v = *value as f32;
    let changed = slider_scalar(ctx, label, &mut v, min as f32, max as f32, true);
    if changed {
        *value = v.round() as i32;
    }
    changed
}

fn slider_scalar(ctx: &mut Context, label: &str, value: &mut f32, min: f32, max: f32, integer: bool) -> bool {
    if ctx.skip_items("slider") {
        return false;
    }
    let scalar = place_scalar_frame(ctx, label);
    let inter = ctx.button_behavior(scalar.frame, scalar.id);

    let frame = scalar.frame;
    let pad = 2.0;
    let grab_min = ctx.style().grab_min_size;
    let grab_w = if integer && max > min {
        ((frame.width - pad * 2.0) / (max - min + 1.0)).max(grab_min)
    } else {
        grab_min
    };
    let travel = (frame.width - pad * 2.0 - grab_w).max(1.0);

    let mut changed = false;
    if inter.held {
        if let Some(mouse) = ctx.input().mouse_pos() {
            let t = ((mouse.x - frame.x - pad - grab_w * 0.5) / travel).clamp(0.0, 1.0);
            let mut v = min + (max - min) * t;
            if integer {
                v = v.round();
            }
            if v != *value {
                *value = v;
                changed = true;
                ctx.push_event(WidgetEvent::Changed(scalar.id));
            }
        }
    }

    if ctx.is_rect_visible(frame) {
        let t = if max > min { ((*value - min) / (max - min)).clamp(0.0, 1.0) } else { 0.0 };
        let text = if integer { format!("{}", value.round()) } else { format!("{value:.3}") };
        render_scalar_frame(ctx, &scalar, inter.hovered, inter.held);
        let grab = Rect::new(frame.x + pad + travel * t, frame.y + pad, grab_w, (frame.height - pad * 2.0).max(1.0));
        let slot = if inter.held { StyleColor::SliderGrabActive } else { StyleColor::SliderGrab };
        let color = ctx.color(slot);
        ctx.add_rect_filled(grab, color);
        ctx.render_text_clipped(frame, &text, Vec2::splat(0.5));
    }
    changed
}

/// Field edited by dragging horizontally: the value moves by `speed` per
/// pixel from where the drag started. `min >= max` disables clamping.
pub fn drag_float(ctx: &mut Context, label: &str, value: &mut f32, speed: f32, min: f32, max: f32) -> bool {
    if ctx.skip_items("drag_float") {
        return false;
    }
    let scalar = place_scalar_frame(ctx, label);
    let id = scalar.id;
    let inter = ctx.button_behavior(scalar.frame, id);

    let mut changed = false;
    if inter.held {
        if let Some(mouse) = ctx.input().mouse_pos() {
            let starting = ctx.input().mouse_pressed(MouseButton::Left) || ctx.state().get::<DragState>(id).is_none();
            if starting {
                *ctx.state_mut().get_or_default::<DragState>(id) = DragState {
                    start_value: *value,
                    start_mouse: mouse,
                };
            }
            let drag = *ctx.state_mut().get_or_default::<DragState>(id);
            let mut v = drag.start_value + (mouse.x - drag.start_mouse.x) * speed;
            if min < max {
                v = v.clamp(min, max);
            }
            if v != *value {
                *value = v;
                changed = true;
                ctx.push_event(WidgetEvent::Changed(id));
            }
        }
    }

    if ctx.is_rect_visible(scalar.frame) {
        let text = format!("{value:.3}");
        render_scalar_frame(ctx, &scalar, inter.hovered, inter.held);
        ctx.render_text_clipped(scalar.frame, &text, Vec2::splat(0.5));
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;
    use crate::widget::testing::{context, frame};

    fn slider_int_frame(ctx: &mut Context, input: &mut InputState, value: &mut i32) -> bool {
        frame(ctx, input, |ctx| {
            ctx.set_next_item_width(200.0);
            slider_int(ctx, "Count", value, 0, 10)
        })
    }

    fn drag_frame(ctx: &mut Context, input: &mut InputState, value: &mut f32) -> (WidgetId, bool) {
        frame(ctx, input, |ctx| {
            ctx.set_next_item_width(200.0);
            let id = ctx.get_id("Speed");
            (id, drag_float(ctx, "Speed", value, 0.5, 0.0, 100.0))
        })
    }

    #[test]
    fn test_slider_int_rounds_to_nearest_step() {
        let mut ctx = context();
        let mut input = InputState::new();
        let mut value = 0;
        slider_int_frame(&mut ctx, &mut input, &mut value);

        // frame starts at x 8: grab 196 / 11 wide, travel 196 minus that
        let grab_w = 196.0 / 11.0;
        let travel = 196.0 - grab_w;
        let x_at = |t: f32| 8.0 + 2.0 + grab_w * 0.5 + travel * t;

        input.set_mouse_pos(x_at(0.62), 15.0);
        input.mouse_button_down(MouseButton::Left);
        assert!(slider_int_frame(&mut ctx, &mut input, &mut value));
        assert_eq!(value, 6);

        input.set_mouse_pos(x_at(0.67), 15.0);
        assert!(slider_int_frame(&mut ctx, &mut input, &mut value));
        assert_eq!(value, 7);

        // past the end while held
        input.set_mouse_pos(290.0, 15.0);
        slider_int_frame(&mut ctx, &mut input, &mut value);
        assert_eq!(value, 10);

        input.mouse_button_up(MouseButton::Left);
        input.set_mouse_pos(x_at(0.2), 15.0);
        assert!(!slider_int_frame(&mut ctx, &mut input, &mut value), "released slider ignores the pointer");
        assert_eq!(value, 10);
    }

    #[test]
    fn test_drag_float_follows_speed_and_clamps() {
        let mut ctx = context();
        let mut input = InputState::new();
        let mut value = 1.0;
        drag_frame(&mut ctx, &mut input, &mut value);

        input.set_mouse_pos(50.0, 15.0);
        input.mouse_button_down(MouseButton::Left);
        let (id, changed) = drag_frame(&mut ctx, &mut input, &mut value);
        assert!(!changed, "the press frame records the start only");
        assert_eq!(ctx.output().active_id, id);

        input.set_mouse_pos(80.0, 15.0);
        let (id, changed) = drag_frame(&mut ctx, &mut input, &mut value);
        assert!(changed);
        assert!((value - 16.0).abs() < 1e-4, "1 + 30 * 0.5, got {value}");
        assert!(ctx.output().events.contains(&WidgetEvent::Changed(id)));

        input.set_mouse_pos(300.0, 15.0);
        drag_frame(&mut ctx, &mut input, &mut value);
        assert!((value - 100.0).abs() < f32::EPSILON, "clamped to max");

        input.set_mouse_pos(-400.0, 15.0);
        drag_frame(&mut ctx, &mut input, &mut value);
        assert!(value.abs() < f32::EPSILON, "clamped to min");

        // a new drag starts from the current value
        input.mouse_button_up(MouseButton::Left);
        drag_frame(&mut ctx, &mut input, &mut value);
        input.set_mouse_pos(50.0, 15.0);
        input.mouse_button_down(MouseButton::Left);
        drag_frame(&mut ctx, &mut input, &mut value);
        input.set_mouse_pos(60.0, 15.0);
        drag_frame(&mut ctx, &mut input, &mut value);
        assert!((value - 5.0).abs() < 1e-4, "0 + 10 * 0.5, got {value}");
    }
}
