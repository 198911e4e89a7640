use egui::Context as EguiContext;
use meshview_common::ShaderVariant;
use meshview_input::Movement;
use meshview_scene::SceneState;
use std::ops::RangeInclusive;

/// Slider bounds for each variant's effect value.
pub fn slider_range(variant: ShaderVariant) -> RangeInclusive<f32> {
    match variant {
        ShaderVariant::GreenShift => 0.0..=1.0,
        ShaderVariant::Wavy => 0.0..=100.0,
        ShaderVariant::Cross => 0.0..=1.0,
        ShaderVariant::Noisy => 1.0..=64.0,
    }
}

/// Where the slider handle sits for `value`, and whether that differs
/// from the value itself. NaN sits at the start of the range.
fn slider_position(value: f32, range: &RangeInclusive<f32>) -> (f32, bool) {
    if range.contains(&value) {
        (value, false)
    } else if value.is_nan() {
        (*range.start(), true)
    } else {
        (value.clamp(*range.start(), *range.end()), true)
    }
}

/// Text under the controls, e.g. `R: Up  F: Down ...`.
fn key_map() -> String {
    Movement::ALL
        .iter()
        .map(|m| format!("{}: {m:?}", m.key()))
        .collect::<Vec<_>>()
        .join("  ")
}

/// UI-only state; the effect value itself lives in `SceneState`.
pub struct HudState {
    effect_text: String,
    pub backend: String,
}

impl HudState {
    pub fn new(scene: &SceneState) -> Self {
        Self {
            effect_text: format!("{}", scene.effect.value()),
            backend: String::new(),
        }
    }

    pub fn draw(&mut self, ctx: &EguiContext, scene: &mut SceneState) {
        egui::Window::new("Mesh Viewer")
            .default_pos([10.0, 10.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(scene.effect.label());

                let range = slider_range(scene.effect.variant());
                let (mut value, outside) = slider_position(scene.effect.value(), &range);
                if ui
                    .add(egui::Slider::new(&mut value, range).show_value(false))
                    .changed()
                {
                    scene.effect.set(value);
                    self.effect_text = format!("{value:.2}");
                } else if outside {
                    ui.small("value is outside the slider range");
                }

                ui.horizontal(|ui| {
                    ui.label("Value:");
                    let response = ui.text_edit_singleline(&mut self.effect_text);
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        scene.effect.set_from_input(&self.effect_text);
                    }
                });

                ui.separator();
                let camera = &scene.camera;
                ui.label(format!(
                    "Angle: {:.1}  Height: {:.2}  Distance: {:.2}",
                    camera.angle, camera.height, camera.distance
                ));
                if !self.backend.is_empty() {
                    ui.label(format!("Backend: {}", self.backend));
                }

                ui.separator();
                ui.small(key_map());
            });
    }
}
