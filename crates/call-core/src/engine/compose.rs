//! Composición branch/feed: invocaciones laterales y colas dependientes.
//!
//! Para una posición elegible, el composer (a) sobreescribe los
//! `start_values` de cada cola dependiente registrada con el `ValueSet` de
//! la posición, y (b) invoca cada branch con ese mismo `ValueSet`. Las
//! salidas de un branch se descartan: existe por sus efectos. Un branch
//! puede ser una sub-cola completa (modo run o fallback), reconocida por su
//! variante de `BranchSpec`; sus `start_values` se instalan justo antes de
//! invocarla y la propia ejecución los consume.

use crate::errors::PipelineError;
use crate::handler::ErrorHandler;
use crate::value::ValueSet;

use super::pipeline::{BranchSpec, Pipeline};

impl Pipeline {
    /// Corre branches y feeds de la posición `pos` y rutea cualquier error
    /// de branch por el handler dado. Devuelve el error no manejado, si lo
    /// hay (estructural: sin pasar por el handler).
    pub(crate) fn compose_for(&self,
                              pos: usize,
                              vals: &ValueSet,
                              handler: &dyn ErrorHandler)
                              -> Option<PipelineError> {
        match self.run_branches_and_feeds(pos, vals) {
            None => None,
            Some(e) if e.is_structural() => Some(e),
            Some(e) => handler.handle(e),
        }
    }

    fn run_branches_and_feeds(&self, pos: usize, vals: &ValueSet) -> Option<PipelineError> {
        if let Some(feeds) = self.feeds_at(pos) {
            for dependent in feeds {
                match dependent.lock() {
                    Ok(mut sub) => sub.set_start_values(vals.clone()),
                    Err(_) => return Some(self.not_callable(pos, "feed target lock poisoned")),
                }
            }
        }

        if let Some(branches) = self.branches_at(pos) {
            for branch in branches {
                let err = match branch {
                    BranchSpec::Call(spec) => {
                        let (_discarded, e) = self.pipe_call(spec, vals);
                        e
                    }
                    BranchSpec::Run(sub) => match sub.lock() {
                        Ok(mut q) => {
                            q.set_start_values(vals.clone());
                            q.run().err()
                        }
                        Err(_) => {
                            Some(self.not_callable(pos, "nested pipeline lock poisoned"))
                        }
                    },
                    BranchSpec::Fallback(sub) => match sub.lock() {
                        Ok(mut q) => {
                            q.set_start_values(vals.clone());
                            q.fallback().error
                        }
                        Err(_) => {
                            Some(self.not_callable(pos, "nested pipeline lock poisoned"))
                        }
                    },
                };
                if let Some(e) = err {
                    return Some(e);
                }
            }
        }

        None
    }
}
