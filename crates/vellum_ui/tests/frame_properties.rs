//! # Frame Core Verification Tests
//!
//! End-to-end checks of the frame contract, driven the way a host drives
//! the context: raw input in, one `begin_frame`/`end_frame` pair per frame.
//!
//! 1. **Stacks**: every push/pop stack is empty after `end_frame`
//! 2. **Identity**: ids are deterministic and salted by the id stack
//! 3. **Clipping**: clipped widgets draw nothing but keep their state
//! 4. **Arbitration**: later items win hover, active items keep the capture
//! 5. **State store**: untouched records are evicted after K frames
//! 6. **Z-order**: windows draw back to front, popups and tooltips on top
//!
//! Run with: cargo test -p vellum_ui --test frame_properties

use vellum_ui::{
    widget, Cond, Context, ErrorPolicy, FontAtlas, InputState, MouseButton, Rect, StackDepths,
    TextureId, ToggleState, UiConfig, Vec2, WidgetEvent, WidgetId, WindowFlags, TOOLTIP_WINDOW,
};

const DT: f32 = 1.0 / 60.0;

fn context_with(config: UiConfig) -> Context {
    Context::new(config, FontAtlas::monospace(TextureId(1), 7.0, 13.0))
}

fn context() -> Context {
    context_with(UiConfig {
        error_policy: ErrorPolicy::Recover,
        ..UiConfig::default()
    })
}

/// One frame with a 300x300 untitled window at the origin around `f`.
fn frame(ctx: &mut Context, input: &mut InputState, f: impl FnOnce(&mut Context)) {
    ctx.begin_frame(input, DT);
    ctx.set_next_window_pos(Vec2::ZERO, Cond::Always);
    ctx.set_next_window_size(Vec2::new(300.0, 300.0), Cond::Always);
    ctx.begin_window("Panel", WindowFlags::NO_TITLE_BAR);
    f(ctx);
    ctx.end_window();
    ctx.end_frame();
}

// ============================================================================
// STACK BALANCE
// ============================================================================

#[test]
fn verify_balanced_stacks_after_frame() {
    let mut ctx = context();
    let mut input = InputState::new();

    frame(&mut ctx, &mut input, |ctx| {
        ctx.push_id("outer");
        ctx.push_clip_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        ctx.begin_group();
        widget::text(ctx, "grouped");
        ctx.end_group();
        ctx.pop_clip_rect();
        if widget::tree_node(ctx, "Node") {
            widget::tree_pop(ctx);
        }
        ctx.pop_id();
        ctx.child("Inner", Vec2::new(0.0, 80.0), true, |ctx| {
            ctx.with_id_int(7, |ctx| widget::text(ctx, "row"));
        });
    });

    assert_eq!(ctx.stack_depths(), StackDepths::default());
}

#[test]
fn verify_unbalanced_stacks_recover() {
    let mut ctx = context();
    let mut input = InputState::new();

    ctx.begin_frame(&mut input, DT);
    ctx.begin_window("Leaky", WindowFlags::NONE);
    ctx.push_id("never popped");
    ctx.push_clip_rect(Rect::new(10.0, 10.0, 50.0, 50.0));
    ctx.begin_group();
    ctx.tree_push("open node");
    ctx.begin_window("Nested", WindowFlags::NONE);
    ctx.end_frame();

    assert_eq!(ctx.stack_depths(), StackDepths::default());

    // the next frame starts clean and balances normally
    frame(&mut ctx, &mut input, |ctx| widget::text(ctx, "fine"));
    assert_eq!(ctx.stack_depths(), StackDepths::default());
}

#[test]
#[should_panic(expected = "vellum programming error")]
fn verify_unbalanced_window_panics_under_panic_policy() {
    let mut ctx = context_with(UiConfig {
        error_policy: ErrorPolicy::Panic,
        ..UiConfig::default()
    });
    let mut input = InputState::new();
    ctx.begin_frame(&mut input, DT);
    ctx.begin_window("Forgotten", WindowFlags::NONE);
    ctx.end_frame();
}

// ============================================================================
// WIDGET IDENTITY
// ============================================================================

#[test]
fn verify_ids_are_deterministic_across_frames() {
    let mut ctx = context();
    let mut input = InputState::new();
    let mut seen = Vec::new();

    for _ in 0..3 {
        frame(&mut ctx, &mut input, |ctx| {
            let id = ctx.with_id("settings", |ctx| ctx.get_id("Save"));
            seen.push(id);
        });
    }

    assert!(seen[0].is_some());
    assert!(seen.iter().all(|&id| id == seen[0]));
}

#[test]
fn verify_nesting_path_changes_ids() {
    let mut ctx = context();
    let mut input = InputState::new();

    frame(&mut ctx, &mut input, |ctx| {
        let top = ctx.get_id("Save");
        let in_a = ctx.with_id("a", |ctx| ctx.get_id("Save"));
        let in_b = ctx.with_id("b", |ctx| ctx.get_id("Save"));
        assert_ne!(top, in_a);
        assert_ne!(in_a, in_b);

        // same label, different integer salts
        let row_1 = ctx.with_id_int(1, |ctx| ctx.get_id("row"));
        let row_2 = ctx.with_id_int(2, |ctx| ctx.get_id("row"));
        assert_ne!(row_1, row_2);

        // text after "##" only disambiguates, "###" replaces the label
        assert_ne!(ctx.get_id("Ok##first"), ctx.get_id("Ok##second"));
        assert_eq!(ctx.get_id("Play###toggle"), ctx.get_id("Pause###toggle"));
    });
}

#[test]
fn verify_window_scopes_ids() {
    let mut ctx = context();
    let mut input = InputState::new();

    ctx.begin_frame(&mut input, DT);
    ctx.begin_window("Left", WindowFlags::NONE);
    let left = ctx.get_id("Apply");
    ctx.end_window();
    ctx.begin_window("Right", WindowFlags::NONE);
    let right = ctx.get_id("Apply");
    ctx.end_window();
    ctx.end_frame();

    assert_ne!(left, right);
}

// ============================================================================
// CLIPPING
// ============================================================================

#[test]
fn verify_clipped_widget_draws_nothing_but_keeps_state() {
    fn first_frame(with_button: Option<f32>) -> (usize, Option<(WidgetId, bool)>, Context) {
        let mut ctx = context();
        let mut input = InputState::new();
        let mut button = None;
        frame(&mut ctx, &mut input, |ctx| {
            if let Some(y) = with_button {
                ctx.set_cursor_pos(Vec2::new(8.0, y));
                let id = ctx.get_id("Hidden");
                widget::button(ctx, "Hidden");
                button = Some((id, ctx.last_item().clipped));
            }
        });
        (ctx.output().draw_data.vertex_count(), button, ctx)
    }

    let (baseline, _, _) = first_frame(None);
    let (clipped, button, ctx) = first_frame(Some(1000.0));
    let (id, was_clipped) = button.unwrap();

    assert!(was_clipped);
    assert_eq!(clipped, baseline);
    assert!(ctx.state().contains(id));
    assert_eq!(ctx.state().last_touched(id), Some(ctx.frame_index()));

    // straddling the clip edge still draws
    let (partial, button, _) = first_frame(Some(290.0));
    assert!(!button.unwrap().1);
    assert!(partial > baseline);
}

// ============================================================================
// HOVER AND ACTIVE ARBITRATION
// ============================================================================

/// Item id and hover result of two same-sized buttons stacked at one spot.
fn overlapping_buttons(ctx: &mut Context, input: &mut InputState) -> [(WidgetId, bool); 2] {
    let spot = Vec2::new(20.0, 20.0);
    let mut items = [(WidgetId::NONE, false); 2];
    frame(ctx, input, |ctx| {
        for (item, label) in items.iter_mut().zip(["A", "B"]) {
            ctx.set_cursor_pos(spot);
            widget::invisible_button(ctx, label, Vec2::new(100.0, 40.0));
            *item = (ctx.last_item().id, ctx.is_item_hovered());
        }
    });
    items
}

#[test]
fn verify_later_item_wins_hover() {
    let mut ctx = context();
    let mut input = InputState::new();

    // windows are hit tested against the previous frame
    overlapping_buttons(&mut ctx, &mut input);
    input.set_mouse_pos(40.0, 30.0);
    let [_, b] = overlapping_buttons(&mut ctx, &mut input);
    assert_eq!(ctx.output().hovered_id, b.0);

    let [a, b] = overlapping_buttons(&mut ctx, &mut input);
    assert_eq!(ctx.output().hovered_id, b.0);
    assert!(!a.1);
    assert!(b.1);
}

/// Ids of a 100x40 button and a 50x40 button drawn after it at the same spot.
fn stacked_buttons(ctx: &mut Context, input: &mut InputState) -> (WidgetId, WidgetId) {
    let spot = Vec2::new(20.0, 20.0);
    let mut ids = (WidgetId::NONE, WidgetId::NONE);
    frame(ctx, input, |ctx| {
        ctx.set_cursor_pos(spot);
        widget::invisible_button(ctx, "wide", Vec2::new(100.0, 40.0));
        ids.0 = ctx.last_item().id;
        ctx.set_cursor_pos(spot);
        widget::invisible_button(ctx, "narrow", Vec2::new(50.0, 40.0));
        ids.1 = ctx.last_item().id;
    });
    ids
}

#[test]
fn verify_press_on_arrival_goes_to_top_item() {
    let mut ctx = context();
    let mut input = InputState::new();
    stacked_buttons(&mut ctx, &mut input);

    // the pointer enters the overlap and presses in the same frame
    input.set_mouse_pos(30.0, 30.0);
    input.mouse_button_down(MouseButton::Left);
    let (wide, narrow) = stacked_buttons(&mut ctx, &mut input);

    let output = ctx.output();
    assert_eq!(output.active_id, narrow);
    assert_eq!(output.hovered_id, narrow);
    assert_eq!(output.events_for(wide).count(), 0);
    assert!(output.events_for(narrow).any(|e| e == WidgetEvent::Activated(narrow)));
}

#[test]
fn verify_press_tie_between_new_items_goes_to_last() {
    let mut ctx = context();
    let mut input = InputState::new();
    frame(&mut ctx, &mut input, |_| {});

    // both items appear under a pressed pointer
    input.set_mouse_pos(30.0, 30.0);
    input.mouse_button_down(MouseButton::Left);
    let (wide, narrow) = stacked_buttons(&mut ctx, &mut input);

    let output = ctx.output();
    assert_eq!(output.active_id, narrow);
    assert_eq!(output.events_for(wide).count(), 0);
    assert_eq!(output.events_for(narrow).collect::<Vec<_>>(), [WidgetEvent::Activated(narrow)]);

    input.mouse_button_up(MouseButton::Left);
    stacked_buttons(&mut ctx, &mut input);
    let output = ctx.output();
    assert!(output.events_for(narrow).any(|e| e == WidgetEvent::Clicked(narrow)));
    assert_eq!(output.events_for(wide).count(), 0);
    assert!(output.active_id.is_none());
}

#[test]
fn verify_press_after_leaving_overlap_reaches_lower_item() {
    let mut ctx = context();
    let mut input = InputState::new();
    stacked_buttons(&mut ctx, &mut input);

    input.set_mouse_pos(30.0, 30.0);
    stacked_buttons(&mut ctx, &mut input);
    stacked_buttons(&mut ctx, &mut input);

    // only the wide button covers x = 100
    input.set_mouse_pos(100.0, 30.0);
    input.mouse_button_down(MouseButton::Left);
    let (wide, narrow) = stacked_buttons(&mut ctx, &mut input);
    let output = ctx.output();
    assert_eq!(output.active_id, wide);
    assert_eq!(output.hovered_id, wide);
    assert!(output.events_for(wide).any(|e| e == WidgetEvent::Activated(wide)));
    assert_eq!(output.events_for(narrow).count(), 0);

    input.mouse_button_up(MouseButton::Left);
    stacked_buttons(&mut ctx, &mut input);
    assert!(ctx.output().events_for(wide).any(|e| e == WidgetEvent::Clicked(wide)));
}

/// Id, rect and active flag of a 200 px slider.
fn slider_frame(ctx: &mut Context, input: &mut InputState, value: &mut f32) -> (WidgetId, Rect, bool) {
    let mut out = (WidgetId::NONE, Rect::ZERO, false);
    frame(ctx, input, |ctx| {
        ctx.set_next_item_width(200.0);
        let id = ctx.get_id("##volume");
        widget::slider_float(ctx, "##volume", value, 0.0, 1.0);
        out = (id, ctx.last_item().rect, ctx.is_item_active());
    });
    out
}

#[test]
fn verify_slider_drag_keeps_capture_outside_bounds() {
    let mut ctx = context();
    let mut input = InputState::new();
    let mut value = 0.25_f32;

    let (id, rect, _) = slider_frame(&mut ctx, &mut input, &mut value);
    let start = Vec2::new(rect.x + 60.0, rect.center().y);
    input.set_mouse_pos(start.x, start.y);
    slider_frame(&mut ctx, &mut input, &mut value);
    assert!((value - 0.25).abs() < f32::EPSILON);

    input.mouse_button_down(MouseButton::Left);
    let (_, _, active) = slider_frame(&mut ctx, &mut input, &mut value);
    assert!(active);
    let pressed_value = value;

    // move right by 40 px and well below the slider and the window
    input.set_mouse_pos(start.x + 40.0, 400.0);
    let (_, _, active) = slider_frame(&mut ctx, &mut input, &mut value);
    assert!(active);
    assert_eq!(ctx.output().active_id, id);
    let travel = rect.width - 4.0 - ctx.style().grab_min_size;
    assert!((value - pressed_value - 40.0 / travel).abs() < 1e-4);
    let dragged_value = value;

    input.set_mouse_pos(start.x + 120.0, 400.0);
    input.mouse_button_up(MouseButton::Left);
    let (_, _, active) = slider_frame(&mut ctx, &mut input, &mut value);
    assert!(!active);
    assert!(ctx.output().active_id.is_none());
    assert!(ctx.output().events_for(id).any(|e| e == WidgetEvent::Deactivated(id)));
    assert!((value - dragged_value).abs() < f32::EPSILON);

    // hovering without the button held leaves the value alone
    input.set_mouse_pos(start.x, start.y);
    slider_frame(&mut ctx, &mut input, &mut value);
    assert!((value - dragged_value).abs() < f32::EPSILON);
}

/// Id, rect and click result of a single button.
fn button_frame(ctx: &mut Context, input: &mut InputState) -> (WidgetId, Rect, bool) {
    let mut out = (WidgetId::NONE, Rect::ZERO, false);
    frame(ctx, input, |ctx| {
        let id = ctx.get_id("OK");
        let clicked = widget::button(ctx, "OK");
        out = (id, ctx.last_item().rect, clicked);
    });
    out
}

#[test]
fn verify_single_click_activates_once() {
    let mut ctx = context();
    let mut input = InputState::new();

    let (id, rect, _) = button_frame(&mut ctx, &mut input);
    let target = rect.center();
    input.set_mouse_pos(target.x, target.y);
    let (_, _, clicked) = button_frame(&mut ctx, &mut input);
    assert!(!clicked);

    // press and release between two frames
    input.mouse_button_down(MouseButton::Left);
    input.mouse_button_up(MouseButton::Left);
    let (_, _, clicked) = button_frame(&mut ctx, &mut input);

    assert!(clicked);
    let events: Vec<_> = ctx.output().events_for(id).collect();
    let activations = events
        .iter()
        .filter(|e| matches!(e, WidgetEvent::Activated(_)))
        .count();
    assert_eq!(activations, 1);
    assert!(events.contains(&WidgetEvent::Clicked(id)));
    assert!(ctx.output().active_id.is_none());
}

// ============================================================================
// STATE STORE EVICTION
// ============================================================================

#[test]
fn verify_eviction_after_k_frames() {
    const K: u64 = 3;
    let mut ctx = context_with(UiConfig {
        state_eviction_frames: K,
        error_policy: ErrorPolicy::Recover,
        ..UiConfig::default()
    });
    let mut input = InputState::new();
    let mut transient = WidgetId::NONE;
    let mut kept = WidgetId::NONE;

    frame(&mut ctx, &mut input, |ctx| {
        transient = ctx.get_id("transient");
        kept = ctx.get_id("kept");
        ctx.state_mut().get_or_default::<ToggleState>(transient).open = true;
        ctx.state_mut().get_or_default::<ToggleState>(kept).open = true;
    });

    for unreferenced in 1..=K {
        assert!(ctx.state().contains(transient), "evicted after only {} frames", unreferenced - 1);
        frame(&mut ctx, &mut input, |ctx| {
            ctx.state_mut().touch(kept);
        });
    }

    assert!(!ctx.state().contains(transient));
    assert!(ctx.state().get::<ToggleState>(kept).is_some_and(|s| s.open));
}

#[test]
fn verify_zero_eviction_window_is_raised_to_one() {
    let mut ctx = context_with(UiConfig {
        state_eviction_frames: 0,
        error_policy: ErrorPolicy::Recover,
        ..UiConfig::default()
    });
    assert_eq!(ctx.config().state_eviction_frames, 1);
    let mut input = InputState::new();
    let mut id = WidgetId::NONE;

    frame(&mut ctx, &mut input, |ctx| {
        id = ctx.get_id("fresh");
        ctx.state_mut().get_or_default::<ToggleState>(id).open = true;
    });
    assert!(ctx.state().contains(id), "a record survives the frame that made it");

    frame(&mut ctx, &mut input, |_| {});
    assert!(!ctx.state().contains(id));
}

// ============================================================================
// Z-ORDER
// ============================================================================

/// Begins a 200x200 untitled window at `pos` and runs `f` inside it.
fn panel_at(ctx: &mut Context, name: &str, pos: Vec2, f: impl FnOnce(&mut Context)) {
    ctx.set_next_window_pos(pos, Cond::Always);
    ctx.set_next_window_size(Vec2::new(200.0, 200.0), Cond::Always);
    ctx.begin_window(name, WindowFlags::NO_TITLE_BAR);
    f(ctx);
    ctx.end_window();
}

fn two_windows(ctx: &mut Context, input: &mut InputState) {
    ctx.begin_frame(input, DT);
    panel_at(ctx, "Back", Vec2::ZERO, |ctx| widget::text(ctx, "back"));
    panel_at(ctx, "Front", Vec2::new(100.0, 100.0), |ctx| widget::text(ctx, "front"));
    ctx.end_frame();
}

fn window_names(ctx: &Context) -> Vec<String> {
    let windows = ctx.windows();
    windows
        .display_order()
        .into_iter()
        .filter_map(|h| windows.get(h).map(|w| w.name.clone()))
        .collect()
}

#[test]
fn verify_click_brings_window_to_front() {
    let mut ctx = context();
    let mut input = InputState::new();

    two_windows(&mut ctx, &mut input);
    assert_eq!(window_names(&ctx), ["Back", "Front"]);
    // the first vertex is the background of the backmost window
    assert_eq!(ctx.output().draw_data.vertices[0].position, [0.0, 0.0]);

    // press where only "Back" is
    input.set_mouse_pos(50.0, 50.0);
    input.mouse_button_down(MouseButton::Left);
    input.mouse_button_up(MouseButton::Left);
    two_windows(&mut ctx, &mut input);

    assert_eq!(window_names(&ctx), ["Front", "Back"]);
    let windows = ctx.windows();
    assert_eq!(windows.focused(), windows.find_by_name("Back"));
    let vertices = &ctx.output().draw_data.vertices;
    assert_eq!(vertices[0].position, [100.0, 100.0]);

    // "Back" now draws after every vertex of "Front"
    let front_len = windows
        .find_by_name("Front")
        .and_then(|h| windows.get(h))
        .map_or(0, |w| w.draw_list.vertices().len());
    assert_eq!(vertices[front_len].position, [0.0, 0.0]);
}

#[test]
fn verify_popup_and_tooltip_draw_above_windows() {
    let mut ctx = context();
    let mut input = InputState::new();

    for _ in 0..3 {
        ctx.begin_frame(&mut input, DT);
        panel_at(&mut ctx, "Back", Vec2::ZERO, |ctx| {
            if !ctx.is_popup_open("menu") {
                ctx.open_popup("menu");
            }
            ctx.popup("menu", |ctx| widget::text(ctx, "entry"));
            ctx.set_tooltip("tip");
        });
        // begun after the popup, still below it
        panel_at(&mut ctx, "Front", Vec2::new(100.0, 100.0), |ctx| widget::text(ctx, "front"));
        ctx.end_frame();
    }

    let names = window_names(&ctx);
    assert_eq!(names.len(), 4, "{names:?}");
    assert_eq!(names[..2], ["Back", "Front"]);
    assert!(names[2].starts_with("##Popup_"), "{names:?}");
    assert_eq!(names[3], TOOLTIP_WINDOW);

    // the frame buffer is every window list, back to front
    let windows = ctx.windows();
    let expected: Vec<[f32; 2]> = windows
        .display_order()
        .into_iter()
        .filter_map(|h| windows.get(h))
        .flat_map(|w| w.draw_list.vertices().iter().map(|v| v.position))
        .collect();
    let actual: Vec<[f32; 2]> = ctx.output().draw_data.vertices.iter().map(|v| v.position).collect();
    assert_eq!(actual, expected);
}

/// Largest vertex y of a 200x200 titled window at the origin.
fn titled_window_bottom(collapsed: bool) -> f32 {
    let mut ctx = context();
    let mut input = InputState::new();
    let mut body_ran = false;
    ctx.begin_frame(&mut input, DT);
    ctx.set_next_window_pos(Vec2::ZERO, Cond::Always);
    ctx.set_next_window_size(Vec2::new(200.0, 200.0), Cond::Always);
    ctx.set_next_window_collapsed(collapsed, Cond::Always);
    ctx.window("Folded", WindowFlags::NONE, |ctx| {
        body_ran = true;
        widget::text(ctx, "body");
    });
    ctx.end_frame();

    assert_eq!(body_ran, !collapsed);
    let vertices = &ctx.output().draw_data.vertices;
    assert!(!vertices.is_empty(), "the title bar is drawn either way");
    vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max)
}

#[test]
fn verify_collapsed_window_keeps_only_title_bar() {
    // title bar height is the frame height: 13 + 2 * 3
    let title_bottom = 19.0;
    assert!(titled_window_bottom(true) <= title_bottom);
    assert!((titled_window_bottom(false) - 200.0).abs() < f32::EPSILON);
}
