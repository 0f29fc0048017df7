use std::sync::Arc;

use crate::errors::CallSite;
use crate::value::{ValueSet, ValueType};

use super::callable::Callable;

/// Marcador de sustitución: en una lista de argumentos significa
/// "expandir aquí las salidas del paso anterior".
///
/// Se guarda como un `PipeValue` común y se reconoce por su tipo dinámico,
/// así la lista de argumentos es homogénea y el orden relativo contra los
/// literales se preserva solo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipe;

/// Pseudo-argumento que será reemplazado por las salidas no-error de la
/// llamada anterior.
pub const PIPE: Pipe = Pipe;

/// Construye la lista de argumentos de una llamada.
///
/// Acepta literales y `PIPE` mezclados:
/// `args!["%d: ", PIPE, 5i64]`.
#[macro_export]
macro_rules! args {
    () => { $crate::value::ValueSet::new() };
    ($($x:expr),+ $(,)?) => {
        vec![$($crate::value::PipeValue::new($x)),+]
    };
}

/// Descriptor de una llamada: objetivo invocable, argumentos fijos (con
/// posibles marcadores `PIPE`), nombre diagnóstico opcional y la posición
/// que ocupa en su cola.
#[derive(Clone)]
pub struct CallSpec {
    target: Arc<dyn Callable>,
    args: ValueSet,
    name: String,
    position: usize,
}

impl CallSpec {
    pub fn new(target: Arc<dyn Callable>, args: ValueSet, position: usize) -> Self {
        Self { target,
               args,
               name: String::new(),
               position }
    }

    pub fn target(&self) -> &dyn Callable {
        &*self.target
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn site(&self) -> CallSite {
        CallSite::new(self.position, &self.name, self.target.signature())
    }

    /// Resuelve la lista real de argumentos: cada `PIPE` se expande al
    /// `ValueSet` completo entrante, el resto se copia tal cual.
    pub fn resolve_args(&self, piped: &ValueSet) -> ValueSet {
        let mut all = ValueSet::new();
        for arg in &self.args {
            if arg.is::<Pipe>() {
                all.extend(piped.iter().cloned());
            } else {
                all.push(arg.clone());
            }
        }
        all
    }

    /// Misma expansión que `resolve_args` pero sobre tipos, para el
    /// validador de firmas.
    pub fn expected_types(&self, piped: &[ValueType]) -> Vec<ValueType> {
        let mut all = Vec::new();
        for arg in &self.args {
            if arg.is::<Pipe>() {
                all.extend_from_slice(piped);
            } else {
                all.push(arg.value_type());
            }
        }
        all
    }
}
