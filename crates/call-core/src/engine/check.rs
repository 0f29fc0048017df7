//! Preflight signature validation.
//!
//! `check` walks the queue in position order and verifies, without invoking
//! anything, that every call would receive arguments compatible with its
//! declared signature — substituting the output types of the previous call
//! wherever `PIPE` appears, and applying the variadic-tail rule. It stops
//! at the first mismatch: the point is an early, well-located diagnostic,
//! not an exhaustive report.

use crate::call::CallSpec;
use crate::call::Callable;
use crate::errors::PipelineError;
use crate::trace::RecordLevel;
use crate::value::ValueType;

use super::pipeline::{BranchSpec, Pipeline};

fn validate_args(target: &dyn Callable, args: &[ValueType]) -> Option<String> {
    let fixed = target.params();

    match target.variadic() {
        None => {
            if args.len() != fixed.len() {
                return Some(format!("func wants {} arguments, but gets {}",
                                    fixed.len(),
                                    args.len()));
            }
        }
        Some(_) => {
            if args.len() < fixed.len() {
                return Some(format!("func wants at least {} arguments, but gets {}",
                                    fixed.len(),
                                    args.len()));
            }
        }
    }

    for (i, (is, should)) in args.iter().zip(fixed.iter()).enumerate() {
        if !is.assignable_to(should) {
            return Some(format!("{}. argument is a {} but should be a {}", i + 1, is, should));
        }
    }

    if let Some(elem) = target.variadic() {
        for (i, is) in args.iter().enumerate().skip(fixed.len()) {
            if !is.assignable_to(&elem) {
                return Some(format!("{}. argument is a {} but should be a {}", i + 1, is, elem));
            }
        }
    }

    None
}

impl Pipeline {
    /// Valida firmas y tipos de toda la cola sin ejecutar nada.
    ///
    /// El recorrido arranca con los tipos de los `start_values` actuales
    /// (lo que un feed instalaría) y propaga hacia adelante los tipos de
    /// salida declarados de cada llamada. Corta en el primer error.
    pub fn check(&self) -> Result<(), PipelineError> {
        let mut piped: Vec<ValueType> = self.start_types();
        for spec in self.calls() {
            piped = self.validate_call(spec, &piped)?;
        }

        // Los objetivos anidados tienen que seguir siendo invocables: un
        // lock envenenado por un pánico previo ya no lo es.
        for (pos, branch) in self.branch_targets() {
            let poisoned = match branch {
                BranchSpec::Call(_) => false,
                BranchSpec::Run(sub) | BranchSpec::Fallback(sub) => sub.is_poisoned(),
            };
            if poisoned {
                return Err(self.not_callable(pos, "nested pipeline lock poisoned"));
            }
        }
        for (pos, feed) in self.feed_targets() {
            if feed.is_poisoned() {
                return Err(self.not_callable(pos, "feed target lock poisoned"));
            }
        }

        Ok(())
    }

    fn validate_call(&self,
                     spec: &CallSpec,
                     piped: &[ValueType])
                     -> Result<Vec<ValueType>, PipelineError> {
        let expected = spec.expected_types(piped);
        if let Some(detail) = validate_args(spec.target(), &expected) {
            let err = PipelineError::InvalidArgument { site: spec.site(),
                                                       detail };
            self.emit(RecordLevel::Panic,
                      spec,
                      expected.iter().map(|t| t.to_string()).collect(),
                      Vec::new(),
                      Some(err.to_string()));
            return Err(err);
        }
        Ok(spec.target().outputs().to_vec())
    }

    pub(crate) fn not_callable(&self, position: usize, detail: &str) -> PipelineError {
        PipelineError::InvalidCall { site: crate::errors::CallSite::new(position,
                                                                        "",
                                                                        "pipeline".to_string()),
                                     detail: detail.to_string() }
    }
}
