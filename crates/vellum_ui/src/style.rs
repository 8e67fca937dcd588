//! Styling: metrics that drive layout, and the widget color palette.
//!
//! Colors here are only defaults. Hosts override them through [`UiConfig`](crate::UiConfig)
//! or by mutating [`Context::style_mut`](crate::Context::style_mut).

use serde::{Deserialize, Serialize};
use vellum_core::Vec2;

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (0-1) with full alpha.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from hex value (0xRRGGBBAA).
    #[must_use]
    pub fn hex(hex: u32) -> Self {
        let channel = |shift: u32| f32::from(((hex >> shift) & 0xFF) as u8) / 255.0;
        Self::rgba(channel(24), channel(16), channel(8), channel(0))
    }

    /// Returns a new color with different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Returns the color with alpha multiplied by `factor`.
    #[must_use]
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor.clamp(0.0, 1.0))
    }

    /// Linearly interpolates between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Converts to array format.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns true if nothing would be visible.
    #[must_use]
    pub fn is_invisible(self) -> bool {
        self.a <= 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Palette slots used by the built-in widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleColor {
    /// Regular text.
    Text,
    /// Disabled / hint text.
    TextDisabled,
    /// Window background.
    WindowBg,
    /// Child region background.
    ChildBg,
    /// Popup and tooltip background.
    PopupBg,
    /// Window and frame borders.
    Border,
    /// Frame (checkbox, slider, text field) background.
    FrameBg,
    /// Frame background while hovered.
    FrameBgHovered,
    /// Frame background while active.
    FrameBgActive,
    /// Title bar background.
    TitleBg,
    /// Title bar background of the focused window.
    TitleBgActive,
    /// Button.
    Button,
    /// Button while hovered.
    ButtonHovered,
    /// Button while active.
    ButtonActive,
    /// Header (collapsing header, selectable).
    Header,
    /// Header while hovered.
    HeaderHovered,
    /// Header while active.
    HeaderActive,
    /// Check mark and radio dot.
    CheckMark,
    /// Slider grab.
    SliderGrab,
    /// Slider grab while active.
    SliderGrabActive,
    /// Scrollbar track.
    ScrollbarBg,
    /// Scrollbar thumb.
    ScrollbarGrab,
    /// Resize grip in the window corner.
    ResizeGrip,
    /// Separator line.
    Separator,
    /// Text selection highlight.
    TextSelectedBg,
    /// Progress bar fill.
    PlotHistogram,
}

impl StyleColor {
    /// Number of palette slots.
    pub const COUNT: usize = 26;
}

/// Layout metrics and palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Padding inside windows.
    pub window_padding: Vec2,
    /// Minimum window size.
    pub window_min_size: Vec2,
    /// Padding inside framed widgets.
    pub frame_padding: Vec2,
    /// Spacing between consecutive items.
    pub item_spacing: Vec2,
    /// Spacing between elements of one composite widget.
    pub item_inner_spacing: Vec2,
    /// Horizontal indent applied by `indent()` and tree nodes.
    pub indent_spacing: f32,
    /// Width of the vertical scrollbar.
    pub scrollbar_size: f32,
    /// Minimum length of slider grabs and scrollbar thumbs.
    pub grab_min_size: f32,
    /// Window border thickness (0 disables).
    pub window_border_size: f32,
    /// Frame border thickness (0 disables).
    pub frame_border_size: f32,
    /// Default width of sliders and text fields, as a fraction of the content width.
    pub item_width_ratio: f32,
    /// Size of the resize grip in the bottom-right window corner.
    pub resize_grip_size: f32,
    /// Offset of tooltips from the pointer.
    pub tooltip_offset: Vec2,
    /// Palette, indexed by [`StyleColor`].
    pub colors: Vec<Color>,
}

impl Style {
    /// Looks up a palette color.
    #[must_use]
    pub fn color(&self, slot: StyleColor) -> Color {
        self.colors
            .get(slot as usize)
            .copied()
            .unwrap_or(Color::WHITE)
    }

    /// Replaces a palette color.
    pub fn set_color(&mut self, slot: StyleColor, color: Color) {
        if self.colors.len() < StyleColor::COUNT {
            self.colors.resize(StyleColor::COUNT, Color::WHITE);
        }
        self.colors[slot as usize] = color;
    }

    /// Dark palette.
    #[must_use]
    pub fn dark_colors() -> Vec<Color> {
        let mut colors = vec![Color::WHITE; StyleColor::COUNT];
        let mut set = |slot: StyleColor, c: Color| colors[slot as usize] = c;
        set(StyleColor::Text, Color::rgb(0.92, 0.92, 0.92));
        set(StyleColor::TextDisabled, Color::rgb(0.50, 0.50, 0.50));
        set(StyleColor::WindowBg, Color::rgba(0.06, 0.06, 0.06, 0.94));
        set(StyleColor::ChildBg, Color::TRANSPARENT);
        set(StyleColor::PopupBg, Color::rgba(0.08, 0.08, 0.08, 0.94));
        set(StyleColor::Border, Color::rgba(0.43, 0.43, 0.50, 0.50));
        set(StyleColor::FrameBg, Color::rgba(0.16, 0.29, 0.48, 0.54));
        set(StyleColor::FrameBgHovered, Color::rgba(0.26, 0.59, 0.98, 0.40));
        set(StyleColor::FrameBgActive, Color::rgba(0.26, 0.59, 0.98, 0.67));
        set(StyleColor::TitleBg, Color::rgb(0.04, 0.04, 0.04));
        set(StyleColor::TitleBgActive, Color::rgb(0.16, 0.29, 0.48));
        set(StyleColor::Button, Color::rgba(0.26, 0.59, 0.98, 0.40));
        set(StyleColor::ButtonHovered, Color::rgb(0.26, 0.59, 0.98));
        set(StyleColor::ButtonActive, Color::rgb(0.06, 0.53, 0.98));
        set(StyleColor::Header, Color::rgba(0.26, 0.59, 0.98, 0.31));
        set(StyleColor::HeaderHovered, Color::rgba(0.26, 0.59, 0.98, 0.80));
        set(StyleColor::HeaderActive, Color::rgb(0.26, 0.59, 0.98));
        set(StyleColor::CheckMark, Color::rgb(0.26, 0.59, 0.98));
        set(StyleColor::SliderGrab, Color::rgb(0.24, 0.52, 0.88));
        set(StyleColor::SliderGrabActive, Color::rgb(0.26, 0.59, 0.98));
        set(StyleColor::ScrollbarBg, Color::rgba(0.02, 0.02, 0.02, 0.53));
        set(StyleColor::ScrollbarGrab, Color::rgb(0.31, 0.31, 0.31));
        set(StyleColor::ResizeGrip, Color::rgba(0.26, 0.59, 0.98, 0.20));
        set(StyleColor::Separator, Color::rgba(0.43, 0.43, 0.50, 0.50));
        set(StyleColor::TextSelectedBg, Color::rgba(0.26, 0.59, 0.98, 0.35));
        set(StyleColor::PlotHistogram, Color::rgb(0.90, 0.70, 0.00));
        colors
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            window_padding: Vec2::new(8.0, 8.0),
            window_min_size: Vec2::new(32.0, 32.0),
            frame_padding: Vec2::new(4.0, 3.0),
            item_spacing: Vec2::new(8.0, 4.0),
            item_inner_spacing: Vec2::new(4.0, 4.0),
            indent_spacing: 21.0,
            scrollbar_size: 14.0,
            grab_min_size: 10.0,
            window_border_size: 1.0,
            frame_border_size: 0.0,
            item_width_ratio: 0.65,
            resize_grip_size: 12.0,
            tooltip_offset: Vec2::new(16.0, 10.0),
            colors: Self::dark_colors(),
        }
    }
}
