//! Built-in diagnostics window, drawn when the `show_demo` switch is set.

use scrim_core::switches;

use crate::context::ContextProxy;

pub(crate) fn show(ctx: &egui::Context, proxy: &ContextProxy) {
    egui::Window::new(format!("scrim \u{2014} {}", proxy.name()))
        .default_width(260.0)
        .show(ctx, |ui| {
            egui::Grid::new("scrim_stats").num_columns(2).show(ui, |ui| {
                ui.label("frame");
                ui.label(
                    proxy
                        .last_frame_number()
                        .map_or_else(|| "-".to_owned(), |frame| frame.to_string()),
                );
                ui.end_row();

                ui.label("canvas");
                ui.label(format!(
                    "{:.0} x {:.0}",
                    proxy.canvas_size().x,
                    proxy.canvas_size().y
                ));
                ui.end_row();

                ui.label("draw lists");
                ui.label(proxy.draw_lists().len().to_string());
                ui.end_row();

                ui.label("cursor");
                ui.label(format!("{:?}", proxy.mouse_cursor()));
                ui.end_row();

                ui.label("active item");
                ui.label(proxy.has_active_item().to_string());
                ui.end_row();
            });

            ui.separator();
            for switch in switches::all() {
                let mut value = switch.get();
                if ui
                    .checkbox(&mut value, switch.name())
                    .on_hover_text(switch.help())
                    .changed()
                {
                    switch.set(value);
                }
            }
        });
}
