//! Overlay UI: status bar and equations sidebar
//!
//! Displays the running state and the physics in use with egui.

use egui::{Color32, Context, RichText};
use space_sim::trace::TraceMode;
use space_sim::SimStats;

/// An equation with its name and formula
pub struct Equation {
    pub name: &'static str,
    pub formula: &'static str,
    pub description: &'static str,
}

/// Draw the equations sidebar
pub fn draw_equations_sidebar(
    ctx: &Context,
    title: &str,
    equations: &[Equation],
    variables: &[(&str, &str)],
) {
    egui::SidePanel::right("equations_panel")
        .resizable(true)
        .default_width(280.0)
        .show(ctx, |ui| {
            ui.heading(RichText::new(title).color(Color32::LIGHT_BLUE));
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.collapsing(RichText::new("📐 Equations").strong(), |ui| {
                    for eq in equations {
                        ui.group(|ui| {
                            ui.label(RichText::new(eq.name).strong().color(Color32::YELLOW));
                            ui.label(RichText::new(eq.formula).monospace().color(Color32::WHITE));
                            ui.label(RichText::new(eq.description).small().italics());
                        });
                        ui.add_space(4.0);
                    }
                });

                ui.add_space(8.0);

                ui.collapsing(RichText::new("📖 Variables").strong(), |ui| {
                    egui::Grid::new("variables_grid")
                        .num_columns(2)
                        .spacing([10.0, 4.0])
                        .show(ui, |ui| {
                            for (symbol, meaning) in variables {
                                ui.label(RichText::new(*symbol).monospace().color(Color32::LIGHT_GREEN));
                                ui.label(*meaning);
                                ui.end_row();
                            }
                        });
                });
            });
        });
}

/// Draw the one-line status bar across the top of the window
pub fn draw_status_bar(ctx: &Context, stats: &SimStats, paused: bool, trace_mode: TraceMode, bodies: usize) {
    egui::TopBottomPanel::top("status").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if paused {
                ui.label(RichText::new("PAUSED").color(Color32::YELLOW));
            } else {
                ui.label(RichText::new("RUNNING").color(Color32::GREEN));
            }
            ui.separator();
            ui.label(format!("t = {:.2} s", stats.elapsed));
            ui.label(format!("steps: {}", stats.steps));
            ui.separator();
            ui.label(format!("bodies: {}", bodies));
            ui.label(format!("collisions: {}", stats.collisions));
            ui.separator();
            ui.label(format!("E = {:.4e}", stats.energy));
            ui.label(format!("|p| = {:.4e}", stats.momentum.length()));
            ui.label(format!(
                "COM = ({:.1}, {:.1})",
                stats.center_of_mass.x, stats.center_of_mass.y
            ));
            ui.separator();
            ui.label(format!("trace: {}", trace_mode.label()));
        });
    });
}

// ============================================================================
// Gravity and collision equations
// ============================================================================

pub const SPACE_EQUATIONS: &[Equation] = &[
    Equation {
        name: "Pairwise Gravity",
        formula: "Δv⃗ₐ = -G·m_b·d⃗ / r³ · Δt",
        description: "Velocity kick along the separation d⃗ = x⃗ₐ - x⃗_b",
    },
    Equation {
        name: "Semi-implicit Euler",
        formula: "x⃗ ← x⃗ + v⃗·Δt",
        description: "Positions move with the already-kicked velocities",
    },
    Equation {
        name: "Contact Normal",
        formula: "n̂ = (x⃗ₐ - x⃗_b) / |x⃗ₐ - x⃗_b|",
        description: "Direction of the elastic impulse",
    },
    Equation {
        name: "Time Since Contact",
        formula: "t = (d - (rₐ + r_b + ε)) / (Δv⃗·n̂)",
        description: "Linear rewind to the touching instant",
    },
    Equation {
        name: "Elastic Impulse",
        formula: "v⃗ₐ' = v⃗ₐ - 2m_b(Δv⃗·n̂)n̂ / (mₐ + m_b)",
        description: "Conserves momentum and normal kinetic energy",
    },
    Equation {
        name: "Center of Mass",
        formula: "X⃗ = Σ mᵢx⃗ᵢ / Σ mᵢ",
        description: "Moves uniformly in an isolated system",
    },
];

pub const SPACE_VARIABLES: &[(&str, &str)] = &[
    ("G", "Gravitational constant"),
    ("m", "Body mass"),
    ("r", "Centre distance"),
    ("x⃗, v⃗", "Position, velocity"),
    ("Δv⃗", "Relative velocity vₐ - v_b"),
    ("ε", "Collision slack"),
    ("Δt", "Fixed time step"),
];
