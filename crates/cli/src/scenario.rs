//! JSON scenario files for `cli run`.
//!
//! A scenario names the initial mesh, the analytic flow, the step count and the full
//! threshold set. Every field has a default, so `{}` is a valid scenario.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tts::api::{
    advect, cube, lon_lat, CosineBells, Context, Deformation, DeformationCase, LonLatFlow,
    LonLatGrid, Mesh, Sampled, SolidRotation, Sphere, StepReport, Tracker, TtsCfg,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeshKind {
    Cube,
    LonLat { nlon: usize, nlat: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowKind {
    SolidRotation { period: f64, alpha: f64 },
    Deformation { case: DeformationCase, period: f64 },
}

impl FlowKind {
    fn period(&self) -> f64 {
        match *self {
            FlowKind::SolidRotation { period, .. } | FlowKind::Deformation { period, .. } => period,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub radius: f64,
    pub mesh: MeshKind,
    /// `(seed, amplitude in degrees)` applied to the initial vertices.
    pub jitter: Option<(u64, f64)>,
    pub flow: FlowKind,
    pub steps: u64,
    /// Step length; defaults to `period / 600`.
    pub dt: Option<f64>,
    pub grid: LonLatGrid,
    pub tracer: Option<CosineBells>,
    pub cfg: TtsCfg,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            radius: 1.0,
            mesh: MeshKind::LonLat { nlon: 72, nlat: 36 },
            jitter: None,
            flow: FlowKind::Deformation {
                case: DeformationCase::Case1,
                period: 5.0,
            },
            steps: 600,
            dt: None,
            grid: LonLatGrid::default(),
            tracer: Some(CosineBells::default()),
            cfg: TtsCfg::default(),
        }
    }
}

/// Outcome of a scenario run, written as the primary artifact.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub initial_mass: Option<f64>,
    pub final_mass: Option<f64>,
    pub reports: Vec<StepReport>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn dt(&self) -> f64 {
        self.dt.unwrap_or(self.flow.period() / 600.0)
    }

    pub fn build_mesh(&self) -> Result<Mesh> {
        let sphere = Sphere::new(self.radius);
        let mut mesh = match self.mesh {
            MeshKind::Cube => cube(sphere)?,
            MeshKind::LonLat { nlon, nlat } => lon_lat(sphere, nlon, nlat)?,
        };
        if let Some((seed, amplitude)) = self.jitter {
            mesh.jitter(seed, amplitude);
        }
        Ok(mesh)
    }

    pub fn run(&self) -> Result<RunSummary> {
        let mut mesh = self.build_mesh()?;
        let tracer = self.tracer.map(|bells| mesh.add_tracer(|x| bells.density(x)));
        let initial_mass = tracer.map(|k| mesh.total_mass(k));
        let sphere = mesh.sphere;
        let reports = match self.flow {
            FlowKind::SolidRotation { period, alpha } => {
                let flow = SolidRotation {
                    period,
                    alpha,
                    sphere,
                };
                self.drive(&mut mesh, &flow)?
            }
            FlowKind::Deformation { case, period } => {
                let flow = Deformation {
                    case,
                    period,
                    sphere,
                };
                self.drive(&mut mesh, &flow)?
            }
        };
        Ok(RunSummary {
            initial_mass,
            final_mass: tracer.map(|k| mesh.total_mass(k)),
            reports,
        })
    }

    fn drive<F: LonLatFlow>(&self, mesh: &mut Mesh, flow: &F) -> Result<Vec<StepReport>> {
        let dt = self.dt();
        let mut ctx = Context::new(self.cfg);
        let mut reports = Vec::with_capacity(self.steps as usize);
        for n in 0..self.steps {
            let field = Sampled::new(flow, n as f64 * dt, dt);
            let tracker = Tracker::new(&self.grid, &field, dt, mesh.sphere);
            let report =
                advect(mesh, &mut ctx, &tracker).with_context(|| format!("advect step {n}"))?;
            reports.push(report);
        }
        Ok(reports)
    }
}
