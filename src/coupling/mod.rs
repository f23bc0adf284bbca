//! Staggered fluid-structure coupling
//!
//! Each load step iterates aerodynamics, force transfer, relaxation and the
//! structural solve until the norm of the nodal positions settles.

mod collaborators;
mod convergence;
mod mapping;
mod options;
mod relaxation;
mod trim;

pub use collaborators::{AeroSolver, KernelInput, StructuralKernel};
pub use convergence::ResidualMonitor;
pub use mapping::{aero2struct_force_mapping, AeroSurface, AeroTimestep, PanelMapping, PanelRef};
pub use options::CouplingOptions;
pub use relaxation::ForceRelaxation;
pub use trim::{attitude, ThrustDirections, TrimChange};

use log::{info, warn};

use crate::error::{AeroelasticError, AeroelasticResult};
use crate::math::Vec6;
use crate::model::BeamModel;
use crate::results::{CouplingSummary, LoadStepOutcome, Resultants};

/// Staggered coupling of a beam model with an aerodynamic solver
#[derive(Debug)]
pub struct StaggeredCoupling<S, A> {
    options: CouplingOptions,
    model: BeamModel,
    structural: S,
    aero: A,
    relaxation: ForceRelaxation,
    thrust: ThrustDirections,
}

impl<S: StructuralKernel, A: AeroSolver> StaggeredCoupling<S, A> {
    pub fn new(
        model: BeamModel,
        structural: S,
        aero: A,
        options: CouplingOptions,
    ) -> AeroelasticResult<Self> {
        options.validate()?;
        Ok(Self {
            relaxation: ForceRelaxation::new(options.relaxation_factor),
            options,
            model,
            structural,
            aero,
            thrust: ThrustDirections::default(),
        })
    }

    pub fn options(&self) -> &CouplingOptions {
        &self.options
    }

    pub fn model(&self) -> &BeamModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut BeamModel {
        &mut self.model
    }

    pub fn structural(&self) -> &S {
        &self.structural
    }

    pub fn aero(&self) -> &A {
        &self.aero
    }

    /// Thrust directions captured by earlier trim changes
    pub fn thrust_directions(&self) -> &ThrustDirections {
        &self.thrust
    }

    pub fn into_parts(self) -> (BeamModel, S, A) {
        (self.model, self.structural, self.aero)
    }

    /// New working state on both solvers
    fn increase_ts(&mut self) {
        self.model.next_step();
        self.structural.next_step();
        self.aero.next_step();
    }

    /// Run every load step to convergence or `max_iter`
    pub fn run(&mut self) -> AeroelasticResult<CouplingSummary> {
        let max_iter = self.options.max_iter;
        self.relaxation.reset(self.model.num_node());

        let mut steps = Vec::new();
        for (i_step, multiplier) in self.options.load_multipliers().into_iter().enumerate() {
            if i_step > 0 {
                self.increase_ts();
            }

            let mut monitor = ResidualMonitor::new(self.options.tolerance);
            let mut outcome = LoadStepOutcome {
                step: i_step,
                multiplier,
                iterations: 0,
                converged: false,
                residual: None,
            };

            for i_iter in 0..max_iter {
                if self.options.print_info {
                    info!("load step {i_step}, iteration {i_iter}");
                }

                self.iterate(multiplier)?;
                outcome.iterations = i_iter + 1;

                let residual = self.model.timestep_info().latest().position_norm();
                let converged = monitor.check(i_iter, residual);
                outcome.residual = monitor.last_change();

                if converged {
                    self.structural.update(self.model.timestep_info_mut().latest_mut())?;
                    self.model.timestep_info_mut().collapse();
                    self.aero.collapse_history();
                    outcome.converged = true;
                    break;
                }
                if i_iter + 1 == max_iter {
                    warn!(
                        "load step {i_step} did not converge in {max_iter} iterations (last change {:?})",
                        outcome.residual
                    );
                }
            }
            steps.push(outcome);
        }

        let resultants = Resultants::from_state(self.model.timestep_info().latest());
        if self.options.print_info {
            info!("resultant forces and moments: {resultants}");
        }
        Ok(CouplingSummary { steps, resultants })
    }

    /// One aerodynamic solve, force transfer and structural solve
    fn iterate(&mut self, multiplier: f64) -> AeroelasticResult<()> {
        self.aero.run()?;

        let mut forces = aero2struct_force_mapping(
            self.aero.current(),
            self.aero.struct2aero_mapping(),
            self.model.timestep_info().latest(),
            self.model.master_table(),
        )?;
        self.relaxation.apply(&mut forces);

        let applied: Vec<Vec6> = forces
            .iter()
            .zip(&self.model.ini_info().steady_applied_forces)
            .map(|(aero, steady)| multiplier * (aero + steady))
            .collect();

        let gravity = self.options.gravity;
        let (arrays, ini_info, state) = self.model.kernel_view();
        state.steady_applied_forces.clone_from(&applied);
        let input = KernelInput {
            arrays,
            ini_info,
            applied_forces: &applied,
            gravity,
        };
        self.structural.run(input, state)?;

        self.aero.update_step(self.model.timestep_info().latest())
    }

    /// Restart from the reference state at a new trim point
    ///
    /// Each thrust node's direction is taken from the reference applied force
    /// the first time the node is used and reused by every later call. Nothing
    /// is modified if the control surface cannot be deflected or a thrust
    /// direction is undefined.
    pub fn change_trim(&mut self, trim: &TrimChange) -> AeroelasticResult<()> {
        let mut directions = self.thrust.clone();
        directions.capture(&self.model.ini_info().steady_applied_forces, &trim.thrust_nodes)?;
        let mut steady = self.model.ini_info().steady_applied_forces.clone();
        directions.apply(trim.thrust, &trim.thrust_nodes, &mut steady)?;

        match self.aero.control_surface_deflection_mut() {
            None => {
                return Err(AeroelasticError::Configuration(
                    "this model has no control surfaces".to_string(),
                ));
            }
            Some(deflections) if trim.control_surface >= deflections.len() => {
                return Err(AeroelasticError::Configuration(format!(
                    "control surface index {} out of range ({} surfaces)",
                    trim.control_surface,
                    deflections.len()
                )));
            }
            Some(deflections) => deflections[trim.control_surface] = trim.deflection,
        }

        self.model.ini_info_mut().steady_applied_forces = steady;
        self.thrust = directions;

        let reference = self.model.ini_info().clone();
        let history = self.model.timestep_info_mut();
        history.reset(reference);
        history.latest_mut().quat = attitude(trim.alpha);
        self.aero.collapse_history();

        if self.options.print_info {
            info!(
                "trim changed: alpha = {:.4}, thrust = {:.4}, control surface {} at {:.4}",
                trim.alpha, trim.thrust, trim.control_surface, trim.deflection
            );
        }
        self.aero.update_step(self.model.timestep_info().latest())
    }
}
