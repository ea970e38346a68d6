// ./src/debug/ui.rs
use crate::math::optimization::report_header;
use crate::math::point_distribution::{MinimizerKind, SeedingStrategy};
use crate::math::probability::{SeedChangedEvent, SeedResource};
use crate::sim::commands::CellCommand;
use crate::sim::history::CheckpointHistory;
use crate::sim::resources::{CellSimulation, ControlPanel};
use bevy::prelude::*;
use bevy_egui::{
    EguiContexts,
    egui::{ComboBox, DragValue, Slider, Window},
};
use std::path::PathBuf;

pub fn cell_control_ui_system(
    mut contexts: EguiContexts,
    mut panel: ResMut<ControlPanel>,
    sim: Res<CellSimulation>,
    history: Res<CheckpointHistory>,
    seed: Res<SeedResource>,
    mut commands: EventWriter<CellCommand>,
    mut seed_events: EventWriter<SeedChangedEvent>,
) {
    let optimizing = sim.is_optimizing();

    Window::new("Zellabstand")
        .default_width(360.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Status");
            match sim.cells() {
                Some(cells) => {
                    ui.label(format!(
                        "{} Zellen, Gebiet {}, Bedeckung {:.3}",
                        cells.len(),
                        cells.domain(),
                        cells.mean_coverage()
                    ));
                }
                None => {
                    ui.label("Kein Zellfeld");
                }
            }
            if let Some(report) = sim.last_report {
                ui.monospace(report_header());
                ui.monospace(report.to_string());
            }
            if let Some(run) = sim.run() {
                ui.label(format!(
                    "Schleife {} / {}",
                    run.iteration(),
                    run.max_outer_loops()
                ));
            }
            if let Some(termination) = sim.last_termination {
                ui.label(termination.message());
            }
            if !panel.status.is_empty() {
                ui.label(format!("» {}", panel.status));
            }

            ui.separator();
            ui.collapsing("Optimierung", |ui| {
                ui.add(Slider::new(&mut panel.max_loops, 1..=500).text("Max. Schleifen"));
                ui.horizontal(|ui| {
                    if optimizing {
                        if ui.button("⏹ Stop").clicked() {
                            commands.send(CellCommand::StopOptimization);
                        }
                    } else if ui.button("▶ Optimieren").clicked() {
                        commands.send(CellCommand::StartOptimization {
                            max_loops: panel.max_loops,
                        });
                    }
                    if ui.button("Kosten").clicked() {
                        commands.send(CellCommand::EvaluateCost);
                    }
                });
            });

            ui.collapsing("Zellen bearbeiten", |ui| {
                ui.add_enabled_ui(!optimizing, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("Initialisieren").clicked() {
                            commands.send(CellCommand::Initialise);
                        }
                        ui.add(DragValue::new(&mut panel.add_count).clamp_range(1..=100));
                        if ui.button("Hinzufügen").clicked() {
                            commands.send(CellCommand::AddCells(panel.add_count));
                        }
                    });
                    ui.horizontal(|ui| {
                        ui.label("Zelle");
                        ui.add(DragValue::new(&mut panel.cell_index));
                        if ui.button("Übernehmen").clicked() {
                            if let Some(cells) = sim.cells() {
                                if let Some(c) = cells.centers().get(panel.cell_index) {
                                    panel.edit_x = c.x;
                                    panel.edit_y = c.y;
                                    panel.edit_radius = cells.radii()[panel.cell_index];
                                }
                            }
                        }
                        if ui.button("Entfernen").clicked() {
                            commands.send(CellCommand::RemoveCell(panel.cell_index));
                        }
                    });
                    ui.horizontal(|ui| {
                        ui.add(DragValue::new(&mut panel.edit_x).speed(0.01).prefix("x "));
                        ui.add(DragValue::new(&mut panel.edit_y).speed(0.01).prefix("y "));
                        ui.add(
                            DragValue::new(&mut panel.edit_radius)
                                .speed(0.01)
                                .prefix("r "),
                        );
                        if ui.button("Setzen").clicked() {
                            commands.send(CellCommand::AdjustCell {
                                index: panel.cell_index,
                                x: panel.edit_x,
                                y: panel.edit_y,
                                radius: panel.edit_radius,
                            });
                        }
                    });
                });
            });

            ui.collapsing("Dateien & Verlauf", |ui| {
                ui.horizontal(|ui| {
                    if ui.button("Speichern").clicked() {
                        commands.send(CellCommand::SaveSnapshot);
                    }
                    if ui.button("SVG").clicked() {
                        commands.send(CellCommand::ExportSvg);
                    }
                });
                ui.add_enabled_ui(!optimizing, |ui| {
                    ui.horizontal(|ui| {
                        ui.text_edit_singleline(&mut panel.snapshot_path);
                        if ui.button("Laden").clicked() && !panel.snapshot_path.is_empty() {
                            commands.send(CellCommand::LoadSnapshot {
                                path: PathBuf::from(panel.snapshot_path.trim()),
                            });
                        }
                    });
                    if !history.is_empty() {
                        let last = history.len() - 1;
                        ui.horizontal(|ui| {
                            ui.add(Slider::new(&mut panel.checkpoint_index, 0..=last).text("Checkpoint"));
                            if ui.button("Zurücksetzen").clicked() {
                                commands.send(CellCommand::RestoreCheckpoint(panel.checkpoint_index));
                            }
                        });
                        if let Some(snapshot) = history.get_snapshot_by_index(panel.checkpoint_index) {
                            ui.label(format!("nach Schleife {}", snapshot.iteration));
                        }
                    }
                });
            });

            ui.collapsing("Konfiguration", |ui| {
                ui.add_enabled_ui(!optimizing, |ui| {
                    let draft = &mut panel.draft_config;
                    ui.add(Slider::new(&mut draft.num_cells, 1..=500).text("Zellen"));
                    ui.add(DragValue::new(&mut draft.width).speed(0.1).prefix("Breite "));
                    ui.add(DragValue::new(&mut draft.height).speed(0.1).prefix("Höhe "));
                    ui.add(DragValue::new(&mut draft.avg_radius).speed(0.01).prefix("Radius "));
                    ui.add(
                        DragValue::new(&mut draft.radius_dispersion)
                            .speed(0.01)
                            .prefix("Streuung "),
                    );
                    ui.add(Slider::new(&mut draft.num_neighbours, 1..=20).text("Nachbarn"));
                    ui.add(
                        DragValue::new(&mut draft.grid_spacing)
                            .speed(0.05)
                            .prefix("Gitterabstand "),
                    );
                    ui.add(
                        DragValue::new(&mut draft.desired_spacing)
                            .speed(0.05)
                            .prefix("Sollabstand "),
                    );
                    ui.add(DragValue::new(&mut draft.cost_goal).speed(0.001).prefix("Kostenziel "));
                    ui.add(
                        Slider::new(&mut draft.max_inner_iterations, 1..=2000)
                            .logarithmic(true)
                            .text("Iterationen je Schleife"),
                    );
                    ComboBox::from_label("Minimierer")
                        .selected_text(format!("{:?}", draft.minimizer))
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut draft.minimizer, MinimizerKind::Powell, "Powell");
                            ui.selectable_value(
                                &mut draft.minimizer,
                                MinimizerKind::NelderMead,
                                "Nelder-Mead",
                            );
                        });
                    ComboBox::from_label("Startverteilung")
                        .selected_text(format!("{:?}", draft.seeding))
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut draft.seeding, SeedingStrategy::LowDensity, "LowDensity");
                            ui.selectable_value(&mut draft.seeding, SeedingStrategy::Stratified, "Stratified");
                            ui.selectable_value(&mut draft.seeding, SeedingStrategy::Uniform, "Uniform");
                        });
                    ui.horizontal(|ui| {
                        if ui.button("Hexagonaler Sollabstand").clicked() {
                            *draft = draft.clone().with_hexagonal_spacing();
                        }
                        if ui.button("Übernehmen").clicked() {
                            commands.send(CellCommand::ApplyConfig(draft.clone()));
                        }
                    });
                });
            });

            ui.collapsing("Zufall & Anzeige", |ui| {
                ui.label(format!("Seed: {}", seed.seed));
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut panel.seed_text);
                    if ui.button("Seed setzen").clicked() {
                        let text = panel.seed_text.trim();
                        let new_seed = text
                            .parse::<u64>()
                            .unwrap_or_else(|_| SeedResource::from_text(text).seed);
                        seed_events.send(SeedChangedEvent { new_seed });
                    }
                });
                ui.checkbox(&mut panel.show_density_areas, "Dichte-Messkreise");
            });
        });
}
