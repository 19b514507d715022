// ReqScope - ui/panels/filters.rs
//
// Filter box above the request list: text input, history drop-down,
// regex toggle, clear button.

use crate::app::state::AppState;

/// Render the filter controls.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let mut history_pick: Option<String> = None;

    ui.horizontal(|ui| {
        let mut input = state.filter_input.clone();
        // Room for the history, regex and clear controls.
        let width = (ui.available_width() - 180.0).max(80.0);
        let response = ui.add(
            egui::TextEdit::singleline(&mut input)
                .hint_text("Filter by URL or body")
                .desired_width(width),
        );
        if response.changed() {
            state.set_filter_input(&input);
        }
        if response.lost_focus() {
            state.commit_filter();
        }

        ui.add_enabled_ui(!state.filter_history.items().is_empty(), |ui| {
            ui.menu_button("History \u{25BE}", |ui| {
                for item in state.filter_history.items() {
                    if ui.button(item).clicked() {
                        history_pick = Some(item.clone());
                        ui.close_menu();
                    }
                }
            });
        });

        let mut use_regex = state.filter_state.use_regex;
        if ui
            .checkbox(&mut use_regex, ".*")
            .on_hover_text("Treat the filter as a regular expression")
            .changed()
        {
            state.set_use_regex(use_regex);
        }

        if ui
            .add_enabled(!state.filter_input.is_empty(), egui::Button::new("Clear"))
            .clicked()
        {
            state.clear_filter();
        }
    });

    if let Some(item) = history_pick {
        state.apply_history_item(&item);
    }

    if let Some(ref err) = state.filter_error {
        ui.colored_label(ui.visuals().error_fg_color, err);
    }
}
