//! Aerobeam Example - Static aeroelastic cantilever
//!
//! Couples a beam model with a spring structural kernel and a strip-lift
//! aerodynamic model. Pass a `BeamInput` JSON file to use your own mesh.

use std::env;

use anyhow::{Context, Result};
use log::info;

use aerobeam::prelude::*;

/// Nodes move in proportion to their applied force
struct SpringKernel {
    compliance: f64,
    vdof: Vec<Option<usize>>,
    reference: Vec<Vec3>,
}

impl SpringKernel {
    fn new(model: &BeamModel, compliance: f64) -> Self {
        Self {
            compliance,
            vdof: model.dofs().vdof().to_vec(),
            reference: model.ini_info().pos.clone(),
        }
    }
}

impl StructuralKernel for SpringKernel {
    fn run(&mut self, input: KernelInput<'_>, state: &mut TimestepState) -> AeroelasticResult<()> {
        for (inode, pos) in state.pos.iter_mut().enumerate() {
            let reference = input.ini_info.pos[inode];
            if input.arrays.vdof[inode] == 0 {
                *pos = reference;
                continue;
            }
            let force = input.applied_forces[inode].fixed_rows::<3>(0).into_owned();
            *pos = reference + self.compliance * force;
        }
        Ok(())
    }

    fn update(&mut self, state: &mut TimestepState) -> AeroelasticResult<()> {
        state.q.fill(0.0);
        state.dqdt.fill(0.0);
        for (inode, dof) in self.vdof.iter().enumerate() {
            let Some(dof) = dof else { continue };
            let displacement = state.pos[inode] - self.reference[inode];
            for k in 0..3 {
                state.q[6 * dof + k] = displacement[k];
            }
        }
        Ok(())
    }
}

/// Lift per vertex falling off linearly with the vertex height
struct StripLift {
    lift: f64,
    washout: f64,
    chord: f64,
    history: Vec<AeroTimestep>,
    mapping: PanelMapping,
    deflections: Vec<f64>,
}

impl StripLift {
    fn new(model: &BeamModel, chord: f64, lift: f64, washout: f64) -> AeroelasticResult<Self> {
        let mapping = PanelMapping::new(
            (0..model.num_node())
                .map(|span| vec![PanelRef { surface: 0, span }])
                .collect(),
        );
        let mut aero = Self {
            lift,
            washout,
            chord,
            history: vec![AeroTimestep::default()],
            mapping,
            deflections: vec![0.0],
        };
        aero.update_step(model.ini_info())?;
        Ok(aero)
    }

    fn latest_mut(&mut self) -> &mut AeroTimestep {
        let last = self.history.len() - 1;
        &mut self.history[last]
    }
}

impl AeroSolver for StripLift {
    fn run(&mut self) -> AeroelasticResult<()> {
        let (lift, washout) = (self.lift, self.washout);
        let flap = 1.0 + self.deflections[0];
        for surface in &mut self.latest_mut().surfaces {
            for (zeta_row, force_row) in surface.zeta.iter().zip(surface.forces.iter_mut()) {
                for (zeta, force) in zeta_row.iter().zip(force_row.iter_mut()) {
                    *force = Vec6::new(0.0, 0.0, flap * lift * (1.0 - washout * zeta.z), 0.0, 0.0, 0.0);
                }
            }
        }
        Ok(())
    }

    fn current(&self) -> &AeroTimestep {
        &self.history[self.history.len() - 1]
    }

    fn struct2aero_mapping(&self) -> &PanelMapping {
        &self.mapping
    }

    fn update_step(&mut self, structure: &TimestepState) -> AeroelasticResult<()> {
        let cga = structure.cga();
        let offsets = [-0.25 * self.chord, 0.75 * self.chord];
        let zeta = offsets
            .iter()
            .map(|&x| {
                structure
                    .pos
                    .iter()
                    .map(|p| cga * (p + Vec3::new(x, 0.0, 0.0)))
                    .collect::<Vec<_>>()
            })
            .collect();
        self.latest_mut().surfaces = vec![AeroSurface::new(zeta)];
        Ok(())
    }

    fn next_step(&mut self) {
        let next = self.current().clone();
        self.history.push(next);
    }

    fn collapse_history(&mut self) {
        if let Some(last) = self.history.pop() {
            self.history = vec![last];
        }
    }

    fn control_surface_deflection_mut(&mut self) -> Option<&mut [f64]> {
        Some(&mut self.deflections)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Aerobeam Example: Static Aeroelastic Cantilever ===\n");

    let input = match env::args().nth(1) {
        Some(path) => {
            BeamInput::from_file(&path).with_context(|| format!("failed to read mesh from {path}"))?
        }
        None => BeamInput::cantilever(10, 3, 16.0),
    };

    let model = BeamModel::generate(&input, BeamSettings::default())
        .context("failed to generate beam model")?;
    println!(
        "Model: {} nodes, {} elements, {} DOFs, {} bodies",
        model.num_node(),
        model.num_elem(),
        model.num_dof(),
        model.num_bodies()
    );

    let kernel = SpringKernel::new(&model, 1e-3);
    let aero = StripLift::new(&model, 1.0, 50.0, 0.1)?;
    let options = CouplingOptions::default()
        .with_load_steps(2)
        .with_relaxation(0.3)
        .with_tolerance(1e-8);

    let mut coupling = StaggeredCoupling::new(model, kernel, aero, options)?;
    let summary = coupling.run()?;

    println!("\n=== Load Steps ===");
    for step in &summary.steps {
        println!(
            "Step {}: multiplier {:.3}, {} iterations, converged: {}",
            step.step, step.multiplier, step.iterations, step.converged
        );
    }
    println!("\nResultants: {}", summary.resultants);

    let model = coupling.model();
    let tip = model.num_node() - 1;
    let tip_pos = model.timestep_info().latest().pos[tip];
    println!(
        "Tip position: [{:.6}, {:.6}, {:.6}]",
        tip_pos.x, tip_pos.y, tip_pos.z
    );

    info!("summary: {}", serde_json::to_string(&summary)?);
    Ok(())
}
