//! Feeds a [`Script`] through a placement session against a [`SimWorld`].

use std::fmt;

use palisade_catalog::TemplateId;
use palisade_place::{PlacedBuilding, PlacementSession};

use crate::script::{self, Script, Step};
use crate::sim::{SimInstance, SimWorld};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub placed: Vec<PlacedBuilding>,
    pub rotations: u32,
    pub cancels: u32,
    /// Ticks on which the candidate was invalid while a selection was active.
    pub blocked_ticks: u64,
    /// Selections the session refused, with the reason.
    pub rejected: Vec<String>,
    pub active_at_end: Option<TemplateId>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} tick(s), {} placed, {} rotation(s), {} cancel(s), {} blocked tick(s)",
            self.ticks,
            self.placed.len(),
            self.rotations,
            self.cancels,
            self.blocked_ticks
        )?;
        for p in &self.placed {
            writeln!(
                f,
                "  {:<12} ({:>7.2}, {:>5.2}, {:>7.2}) yaw {:>3}",
                p.template.as_str(),
                p.position.x,
                p.position.y,
                p.position.z,
                p.yaw_deg
            )?;
        }
        for r in &self.rejected {
            writeln!(f, "  rejected: {}", r)?;
        }
        match &self.active_at_end {
            Some(id) => write!(f, "still placing '{}'", id),
            None => write!(f, "idle at end"),
        }
    }
}

pub fn run(
    script: &Script,
    session: &mut PlacementSession<SimInstance>,
    world: &mut SimWorld,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for (i, step) in script.steps.iter().enumerate() {
        match step {
            Step::Select(id) => {
                if let Err(e) = session.select_template(&TemplateId::from(id.as_str()), world) {
                    log::warn!(target: "replay", "step {}: {}", i, e);
                    summary.rejected.push(e.to_string());
                }
            }
            Step::SelectIndex(index) => {
                if let Err(e) = session.select_index(*index, world) {
                    log::warn!(target: "replay", "step {}: {}", i, e);
                    summary.rejected.push(e.to_string());
                }
            }
            Step::Cancel => {
                if session.cancel(world) {
                    summary.cancels += 1;
                }
            }
            Step::Hold {
                ticks,
                from,
                to,
                keys,
            } => {
                for frame in 0..*ticks {
                    let cursor = script.ray_to(script::lerp_cursor(*from, *to, frame, *ticks));
                    let input = script::snapshot(cursor, keys);
                    let active = session.has_active_selection();
                    let report = session.update(&input, world);
                    summary.ticks += 1;
                    if active && !report.valid {
                        summary.blocked_ticks += 1;
                    }
                    if report.rotated {
                        summary.rotations += 1;
                    }
                    if report.cancelled {
                        summary.cancels += 1;
                    }
                    if let Some(p) = report.placed {
                        summary.placed.push(p);
                    }
                }
            }
        }
    }
    summary.active_at_end = session.active_template().map(|t| t.id.clone());
    log::info!(
        target: "replay",
        "script done after {} tick(s): {} placed",
        summary.ticks,
        summary.placed.len()
    );
    summary
}
