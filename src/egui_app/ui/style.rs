use eframe::egui::{
    Color32, CornerRadius, Frame, Margin, Stroke, Visuals, epaint::Shadow, style::WidgetVisuals,
};

/// Slate dashboard colors.
#[derive(Clone, Copy)]
pub struct Palette {
    pub canvas: Color32,
    pub card: Color32,
    pub control: Color32,
    pub outline: Color32,
    pub text: Color32,
    pub text_muted: Color32,
    pub highlight: Color32,
    pub positive: Color32,
    pub caution: Color32,
}

pub fn palette() -> Palette {
    Palette {
        canvas: Color32::from_rgb(17, 21, 28),
        card: Color32::from_rgb(27, 33, 43),
        control: Color32::from_rgb(40, 48, 61),
        outline: Color32::from_rgb(52, 62, 78),
        text: Color32::from_rgb(214, 220, 228),
        text_muted: Color32::from_rgb(139, 150, 166),
        highlight: Color32::from_rgb(94, 167, 255),
        positive: Color32::from_rgb(76, 187, 120),
        caution: Color32::from_rgb(230, 152, 84),
    }
}

pub fn apply_visuals(visuals: &mut Visuals) {
    let palette = palette();
    visuals.panel_fill = palette.canvas;
    visuals.window_fill = palette.card;
    visuals.extreme_bg_color = palette.canvas;
    visuals.faint_bg_color = palette.card;
    visuals.override_text_color = Some(palette.text);
    visuals.hyperlink_color = palette.highlight;
    visuals.warn_fg_color = palette.caution;
    visuals.error_fg_color = palette.caution;
    visuals.selection.bg_fill = palette.highlight.gamma_multiply(0.35);
    visuals.selection.stroke = Stroke::new(1.0, palette.highlight);
    visuals.popup_shadow = Shadow::NONE;
    visuals.window_corner_radius = CornerRadius::same(4);
    visuals.widgets.noninteractive.bg_fill = palette.card;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, palette.text);
    style_widget(&mut visuals.widgets.inactive, palette.control, palette);
    style_widget(&mut visuals.widgets.hovered, palette.outline, palette);
    style_widget(&mut visuals.widgets.active, palette.highlight, palette);
    style_widget(&mut visuals.widgets.open, palette.control, palette);
}

fn style_widget(vis: &mut WidgetVisuals, fill: Color32, palette: Palette) {
    vis.bg_fill = fill;
    vis.weak_bg_fill = fill;
    vis.corner_radius = CornerRadius::same(3);
    vis.bg_stroke = Stroke::new(1.0, palette.outline);
    vis.fg_stroke = Stroke::new(1.0, palette.text);
}

/// Frame around one dashboard section.
pub fn card_frame() -> Frame {
    let palette = palette();
    Frame::new()
        .fill(palette.card)
        .stroke(Stroke::new(1.0, palette.outline))
        .corner_radius(CornerRadius::same(4))
        .inner_margin(Margin::same(10))
}

/// Frame for the top and status bars.
pub fn bar_frame() -> Frame {
    let palette = palette();
    Frame::new()
        .fill(palette.card)
        .stroke(Stroke::new(1.0, palette.outline))
        .inner_margin(Margin::symmetric(10, 5))
}

pub fn badge_border() -> Stroke {
    Stroke::new(1.0, palette().outline)
}
