//! Text, buttons, toggles and simple decorations.

use crate::animation::Animation;
use crate::context::{Context, WidgetEvent};
use crate::font::TextureId;
use crate::style::{Color, StyleColor};
use vellum_core::{display_part, Rect, Vec2};

/// Plain text. Lines are split on `'\n'`.
pub fn text(ctx: &mut Context, text: &str) {
    let color = ctx.color(StyleColor::Text);
    text_colored(ctx, color, text);
}

/// Text in the disabled color.
pub fn text_disabled(ctx: &mut Context, text: &str) {
    let color = ctx.color(StyleColor::TextDisabled);
    text_colored(ctx, color, text);
}

/// Text in `color`.
pub fn text_colored(ctx: &mut Context, color: Color, text: &str) {
    if ctx.skip_items("text") {
        return;
    }
    let size = ctx.text_size(text);
    let rect = ctx.item_size(size);
    if ctx.is_rect_visible(rect) {
        ctx.add_text(rect.min(), color, text);
    }
}

/// A value followed by its label, aligned like framed widgets.
pub fn label_text(ctx: &mut Context, label: &str, value: &str) {
    if ctx.skip_items("label_text") {
        return;
    }
    let width = ctx.calc_item_width();
    let label = display_part(label);
    let spacing = ctx.style().item_inner_spacing.x;
    let value_size = ctx.text_size(value);
    let label_size = ctx.text_size(label);
    let size = Vec2::new(width + spacing + label_size.x, value_size.y.max(label_size.y));
    let rect = ctx.item_size(size);
    if ctx.is_rect_visible(rect) {
        let color = ctx.color(StyleColor::Text);
        ctx.render_text_clipped(Rect::from_pos_size(rect.min(), Vec2::new(width, size.y)), value, Vec2::ZERO);
        ctx.add_text(Vec2::new(rect.x + width + spacing, rect.y), color, label);
    }
}

/// Button sized to its label. Returns true when clicked.
pub fn button(ctx: &mut Context, label: &str) -> bool {
    let padding = ctx.style().frame_padding;
    button_ex(ctx, label, Vec2::ZERO, padding)
}

/// Button without vertical padding, for use inside text.
pub fn small_button(ctx: &mut Context, label: &str) -> bool {
    let padding = Vec2::new(ctx.style().frame_padding.x, 0.0);
    button_ex(ctx, label, Vec2::ZERO, padding)
}

fn button_ex(ctx: &mut Context, label: &str, size: Vec2, padding: Vec2) -> bool {
    if ctx.skip_items("button") {
        return false;
    }
    let id = ctx.get_id(label);
    let text = display_part(label);
    let text_size = ctx.text_size(text);
    let size = Vec2::new(
        if size.x > 0.0 { size.x } else { text_size.x + padding.x * 2.0 },
        if size.y > 0.0 { size.y } else { text_size.y + padding.y * 2.0 },
    );
    let rect = ctx.item_size(size);
    let inter = ctx.button_behavior(rect, id);

    let dt = ctx.input().dt();
    let hover = ctx
        .state_mut()
        .get_or_default::<Animation>(id)
        .tick(if inter.hovered { 1.0 } else { 0.0 }, dt);

    if ctx.is_rect_visible(rect) {
        let fill = if inter.held && inter.hovered {
            ctx.color(StyleColor::ButtonActive)
        } else {
            ctx.color(StyleColor::Button)
                .lerp(ctx.color(StyleColor::ButtonHovered), hover)
        };
        ctx.render_frame(rect, fill);
        ctx.render_text_clipped(rect.shrink2(padding), text, Vec2::splat(0.5));
    }
    inter.pressed
}

/// Clickable area that draws nothing.
pub fn invisible_button(ctx: &mut Context, str_id: &str, size: Vec2) -> bool {
    if ctx.skip_items("invisible_button") {
        return false;
    }
    let id = ctx.get_id(str_id);
    let rect = ctx.item_size(size.max(Vec2::splat(1.0)));
    ctx.button_behavior(rect, id).pressed
}

fn frame_color(ctx: &Context, hovered: bool, held: bool) -> Color {
    let slot = if held && hovered {
        StyleColor::FrameBgActive
    } else if hovered {
        StyleColor::FrameBgHovered
    } else {
        StyleColor::FrameBg
    };
    ctx.color(slot)
}

/// Check box. Toggles `value` when clicked and returns true on that frame.
pub fn checkbox(ctx: &mut Context, label: &str, value: &mut bool) -> bool {
    if ctx.skip_items("checkbox") {
        return false;
    }
    let id = ctx.get_id(label);
    let text = display_part(label);
    let square = ctx.frame_height();
    let spacing = ctx.style().item_inner_spacing.x;
    let label_size = ctx.text_size(text);
    let label_w = if text.is_empty() { 0.0 } else { spacing + label_size.x };
    let rect = ctx.item_size(Vec2::new(square + label_w, square));
    let inter = ctx.button_behavior(rect, id);
    if inter.pressed {
        *value = !*value;
        ctx.push_event(WidgetEvent::Changed(id));
    }

    if ctx.is_rect_visible(rect) {
        let check_box = Rect::from_pos_size(rect.min(), Vec2::splat(square));
        let fill = frame_color(ctx, inter.hovered, inter.held);
        ctx.render_frame(check_box, fill);
        if *value {
            let mark = ctx.color(StyleColor::CheckMark);
            ctx.add_rect_filled(check_box.shrink((square / 4.0).floor()), mark);
        }
        if !text.is_empty() {
            let color = ctx.color(StyleColor::Text);
            let padding_y = ctx.style().frame_padding.y;
            ctx.add_text(Vec2::new(check_box.right() + spacing, rect.y + padding_y), color, text);
        }
    }
    inter.pressed
}

/// Radio button. Sets `current` to `value` when clicked.
pub fn radio_button<T: PartialEq + Copy>(ctx: &mut Context, label: &str, current: &mut T, value: T) -> bool {
    if ctx.skip_items("radio_button") {
        return false;
    }
    let id = ctx.get_id(label);
    let text = display_part(label);
    let square = ctx.frame_height();
    let spacing = ctx.style().item_inner_spacing.x;
    let label_size = ctx.text_size(text);
    let label_w = if text.is_empty() { 0.0 } else { spacing + label_size.x };
    let rect = ctx.item_size(Vec2::new(square + label_w, square));
    let inter = ctx.button_behavior(rect, id);
    if inter.pressed && *current != value {
        *current = value;
        ctx.push_event(WidgetEvent::Changed(id));
    }

    if ctx.is_rect_visible(rect) {
        let center = rect.min() + Vec2::splat(square * 0.5);
        let radius = square * 0.5 - 1.0;
        let fill = frame_color(ctx, inter.hovered, inter.held);
        ctx.add_circle_filled(center, radius, fill);
        if *current == value {
            let mark = ctx.color(StyleColor::CheckMark);
            ctx.add_circle_filled(center, (radius - 3.0).max(1.0), mark);
        }
        if !text.is_empty() {
            let color = ctx.color(StyleColor::Text);
            let padding_y = ctx.style().frame_padding.y;
            ctx.add_text(Vec2::new(rect.x + square + spacing, rect.y + padding_y), color, text);
        }
    }
    inter.pressed
}

/// Full-width row that highlights when hovered or selected. Clicking it
/// inside a popup closes the popup.
pub fn selectable(ctx: &mut Context, label: &str, selected: bool) -> bool {
    if ctx.skip_items("selectable") {
        return false;
    }
    let id = ctx.get_id(label);
    let text = display_part(label);
    let text_size = ctx.text_size(text);
    let width = ctx.content_region_avail().x.max(text_size.x);
    let rect = ctx.item_size(Vec2::new(width, text_size.y));
    let inter = ctx.button_behavior(rect, id);

    let dt = ctx.input().dt();
    let hover = ctx
        .state_mut()
        .get_or_default::<Animation>(id)
        .tick(if inter.hovered { 1.0 } else { 0.0 }, dt);

    if ctx.is_rect_visible(rect) {
        let fill = if inter.held && inter.hovered {
            Some(ctx.color(StyleColor::HeaderActive))
        } else if selected {
            Some(ctx.color(StyleColor::Header))
        } else if hover > 0.0 {
            Some(ctx.color(StyleColor::HeaderHovered).fade(hover))
        } else {
            None
        };
        if let Some(fill) = fill {
            ctx.add_rect_filled(rect, fill);
        }
        let color = ctx.color(StyleColor::Text);
        ctx.add_text(rect.min(), color, text);
    }
    if inter.pressed {
        ctx.close_current_popup();
    }
    inter.pressed
}

/// Horizontal bar filled to `fraction`. A non-positive size component uses
/// the available width or the frame height.
pub fn progress_bar(ctx: &mut Context, fraction: f32, size: Vec2, overlay: Option<&str>) {
    if ctx.skip_items("progress_bar") {
        return;
    }
    let avail = ctx.content_region_avail().x;
    let size = Vec2::new(
        if size.x > 0.0 { size.x } else { (avail + size.x).max(1.0) },
        if size.y > 0.0 { size.y } else { ctx.frame_height() },
    );
    let rect = ctx.item_size(size);
    if !ctx.is_rect_visible(rect) {
        return;
    }
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let bg = ctx.color(StyleColor::FrameBg);
    let fill = ctx.color(StyleColor::PlotHistogram);
    ctx.render_frame(rect, bg);
    ctx.add_rect_filled(Rect::new(rect.x, rect.y, rect.width * fraction, rect.height), fill);

    let percent;
    let label = match overlay {
        Some(text) => text,
        None => {
            percent = format!("{:.0}%", fraction * 100.0);
            percent.as_str()
        }
    };
    ctx.render_text_clipped(rect, label, Vec2::splat(0.5));
}

/// Textured quad of `size`.
pub fn image(ctx: &mut Context, texture: TextureId, size: Vec2, uv_min: Vec2, uv_max: Vec2, tint: Color) {
    if ctx.skip_items("image") {
        return;
    }
    let rect = ctx.item_size(size);
    if ctx.is_rect_visible(rect) {
        ctx.add_image(texture, rect, uv_min, uv_max, tint);
    }
}

/// Horizontal line across the content region.
pub fn separator(ctx: &mut Context) {
    if ctx.skip_items("separator") {
        return;
    }
    let width = ctx.content_region_avail().x;
    let rect = ctx.item_size(Vec2::new(width, 1.0));
    if ctx.is_rect_visible(rect) {
        let color = ctx.color(StyleColor::Separator);
        ctx.add_rect_filled(rect, color);
    }
}

/// Empty item of `size`, for spacing.
pub fn dummy(ctx: &mut Context, size: Vec2) {
    if ctx.skip_items("dummy") {
        return;
    }
    ctx.item_size(size);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;
    use crate::widget::testing::{click_at, context, frame};
    use vellum_core::WidgetId;

    fn checkbox_frame(ctx: &mut Context, input: &mut InputState, value: &mut bool) -> (WidgetId, bool) {
        frame(ctx, input, |ctx| (ctx.get_id("Enabled"), checkbox(ctx, "Enabled", value)))
    }

    #[test]
    fn test_checkbox_toggles_on_click() {
        let mut ctx = context();
        let mut input = InputState::new();
        let mut enabled = false;
        checkbox_frame(&mut ctx, &mut input, &mut enabled);

        click_at(&mut input, Vec2::new(15.0, 15.0));
        let (id, clicked) = checkbox_frame(&mut ctx, &mut input, &mut enabled);
        assert!(clicked);
        assert!(enabled);
        assert!(ctx.output().events_for(id).any(|e| e == WidgetEvent::Changed(id)));

        let (_, clicked) = checkbox_frame(&mut ctx, &mut input, &mut enabled);
        assert!(!clicked, "no click without a new press");
        assert!(enabled);

        click_at(&mut input, Vec2::new(15.0, 15.0));
        checkbox_frame(&mut ctx, &mut input, &mut enabled);
        assert!(!enabled);
    }

    #[test]
    fn test_checkbox_ignores_click_outside() {
        let mut ctx = context();
        let mut input = InputState::new();
        let mut enabled = false;
        checkbox_frame(&mut ctx, &mut input, &mut enabled);

        click_at(&mut input, Vec2::new(15.0, 200.0));
        let (id, clicked) = checkbox_frame(&mut ctx, &mut input, &mut enabled);
        assert!(!clicked);
        assert!(!enabled);
        assert_eq!(ctx.output().events_for(id).count(), 0);
    }

    #[test]
    fn test_radio_button_selects_value() {
        fn radios(ctx: &mut Context, current: &mut i32) -> (WidgetId, WidgetId) {
            radio_button(ctx, "One", current, 1);
            radio_button(ctx, "Two", current, 2);
            (ctx.get_id("One"), ctx.get_id("Two"))
        }

        let mut ctx = context();
        let mut input = InputState::new();
        let mut current = 1;
        frame(&mut ctx, &mut input, |ctx| radios(ctx, &mut current));

        // second row starts at 8 + 19 + 4
        click_at(&mut input, Vec2::new(15.0, 40.0));
        let (one, two) = frame(&mut ctx, &mut input, |ctx| radios(ctx, &mut current));
        assert_eq!(current, 2);
        assert!(ctx.output().events_for(two).any(|e| e == WidgetEvent::Changed(two)));
        assert_eq!(ctx.output().events_for(one).count(), 0);

        click_at(&mut input, Vec2::new(15.0, 40.0));
        frame(&mut ctx, &mut input, |ctx| radios(ctx, &mut current));
        assert_eq!(current, 2);
        assert!(
            !ctx.output().events.contains(&WidgetEvent::Changed(two)),
            "selecting the current value changes nothing"
        );

        click_at(&mut input, Vec2::new(15.0, 15.0));
        frame(&mut ctx, &mut input, |ctx| radios(ctx, &mut current));
        assert_eq!(current, 1);
    }
}
