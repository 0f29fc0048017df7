//! Modelo de datos de la cola y su superficie de construcción.
//!
//! Una `Pipeline` se crea vacía, crece durante la fase de build (lista de
//! llamadas append-only, handler y sink con semántica "la última asignación
//! gana", branches y feeds por posición) y se ejecuta cero o más veces con
//! `run` / `fallback` y sus variantes validadas. No hay teardown: sale de
//! scope y ya.
//!
//! Los `start_values` son estado transitorio: cada ejecución los consume, y
//! un feed los sobreescribe justo antes de la próxima ejecución de la cola
//! dependiente. Compartir una cola que además es destino de feed entre
//! hilos exige serializar las ejecuciones (el `Mutex` del attach lo hace);
//! una cola que se alimenta a sí misma se bloquearía sobre su propio lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::call::{CallSpec, Callable};
use crate::handler::ErrorHandler;
use crate::trace::{TraceSink, Verbosity};
use crate::value::ValueSet;

/// Binding de log activo: destino + verbosidad.
#[derive(Clone)]
pub(crate) struct TraceBinding {
    pub sink: Arc<dyn TraceSink>,
    pub verbosity: Verbosity,
}

/// Objetivo secundario adjunto a una posición.
#[derive(Clone)]
pub(crate) enum BranchSpec {
    /// Una llamada común; sus salidas se descartan.
    Call(CallSpec),
    /// Una sub-cola completa ejecutada en modo run.
    Run(Arc<Mutex<Pipeline>>),
    /// Una sub-cola completa ejecutada en modo fallback.
    Fallback(Arc<Mutex<Pipeline>>),
}

/// Cola secuencial de llamadas con piping de salidas, branches/feeds y una
/// única política de manejo de errores.
///
/// La construcción es fluida y consume `self`; una vez invocado un método
/// de ejecución los descriptores no se mutan, así que la misma cola puede
/// ejecutarse varias veces (salvo los `start_values`, que son
/// transitorios).
#[derive(Clone)]
pub struct Pipeline {
    id: Uuid,
    calls: Vec<CallSpec>,
    handler: Option<Arc<dyn ErrorHandler>>,
    sink: Option<TraceBinding>,
    branches: HashMap<usize, Vec<BranchSpec>>,
    feeds: HashMap<usize, Vec<Arc<Mutex<Pipeline>>>>,
    start_values: ValueSet,
}

impl Pipeline {
    /// Crea una cola vacía. Agregar llamadas con `add`/`add_named`,
    /// política con `on_error`, y ejecutar con `run`/`fallback` o sus
    /// variantes `check_and_*`.
    pub fn new() -> Self {
        Self { id: Uuid::new_v4(),
               calls: Vec::new(),
               handler: None,
               sink: None,
               branches: HashMap::new(),
               feeds: HashMap::new(),
               start_values: ValueSet::new() }
    }

    /// Identidad diagnóstica de la cola (aparece en los registros).
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Agrega una llamada al final de la cola.
    ///
    /// Los argumentos se fijan acá (ver `args!`); el marcador `PIPE` se
    /// resuelve recién en ejecución contra las salidas del paso anterior.
    pub fn add(mut self, callable: impl Callable + 'static, arguments: ValueSet) -> Self {
        let position = self.calls.len();
        self.calls.push(CallSpec::new(Arc::new(callable), arguments, position));
        self
    }

    /// Como `add`, con un nombre diagnóstico que aparecerá en errores
    /// estructurados y registros.
    pub fn add_named(self,
                     name: &str,
                     callable: impl Callable + 'static,
                     arguments: ValueSet)
                     -> Self {
        self.add(callable, arguments).with_name(name)
    }

    /// Nombra la última llamada agregada.
    pub fn with_name(mut self, name: &str) -> Self {
        debug_assert!(!self.calls.is_empty(), "agregar una llamada antes de nombrarla");
        if let Some(last) = self.calls.last_mut() {
            last.set_name(name);
        }
        self
    }

    /// Fija la política de errores. Si se llama varias veces, sólo la
    /// última tiene efecto.
    pub fn on_error(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Adjunta una llamada secundaria ("tee") a la última posición: se
    /// invoca con las salidas de esa posición y sus propias salidas se
    /// descartan.
    pub fn branch(mut self, callable: impl Callable + 'static, arguments: ValueSet) -> Self {
        let Some(pos) = self.calls.len().checked_sub(1) else {
            debug_assert!(false, "agregar una llamada antes de adjuntar un branch");
            return self;
        };
        let spec = CallSpec::new(Arc::new(callable), arguments, pos);
        self.branches.entry(pos).or_default().push(BranchSpec::Call(spec));
        self
    }

    /// Adjunta una sub-cola como branch de la última posición, ejecutada en
    /// modo run con las salidas de la posición como `start_values`.
    pub fn branch_run(mut self, sub: Arc<Mutex<Pipeline>>) -> Self {
        let Some(pos) = self.calls.len().checked_sub(1) else {
            debug_assert!(false, "agregar una llamada antes de adjuntar un branch");
            return self;
        };
        self.branches.entry(pos).or_default().push(BranchSpec::Run(sub));
        self
    }

    /// Adjunta una sub-cola como branch de la última posición, ejecutada en
    /// modo fallback.
    pub fn branch_fallback(mut self, sub: Arc<Mutex<Pipeline>>) -> Self {
        let Some(pos) = self.calls.len().checked_sub(1) else {
            debug_assert!(false, "agregar una llamada antes de adjuntar un branch");
            return self;
        };
        self.branches.entry(pos).or_default().push(BranchSpec::Fallback(sub));
        self
    }

    /// Registra una cola dependiente: cada vez que la última posición
    /// produzca salidas, se instalan como `start_values` de la dependiente
    /// para su próxima ejecución.
    pub fn feed(mut self, dependent: Arc<Mutex<Pipeline>>) -> Self {
        let Some(pos) = self.calls.len().checked_sub(1) else {
            debug_assert!(false, "agregar una llamada antes de adjuntar un feed");
            return self;
        };
        self.feeds.entry(pos).or_default().push(dependent);
        self
    }

    /// Loguea sólo errores y panics al sink dado. Alternativa excluyente
    /// con `log_debug_to`: la última llamada a cualquiera de las dos gana.
    pub fn log_errors_to(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sink = Some(TraceBinding { sink: Arc::new(sink),
                                        verbosity: Verbosity::Errors });
        self
    }

    /// Loguea cada llamada (argumentos y salidas) además de los errores.
    pub fn log_debug_to(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sink = Some(TraceBinding { sink: Arc::new(sink),
                                        verbosity: Verbosity::Debug });
        self
    }

    /// Versión builder de `set_start_values`.
    pub fn with_start_values(mut self, values: ValueSet) -> Self {
        self.start_values = values;
        self
    }

    /// Instala los valores iniciales que consumirá la próxima ejecución
    /// (lo que hace un feed desde la cola padre).
    pub fn set_start_values(&mut self, values: ValueSet) {
        self.start_values = values;
    }

    // --- acceso interno para runner / validador / composer ---

    pub(crate) fn calls(&self) -> &[CallSpec] {
        &self.calls
    }

    pub(crate) fn active_handler(&self) -> Option<Arc<dyn ErrorHandler>> {
        self.handler.clone()
    }

    pub(crate) fn trace_binding(&self) -> Option<&TraceBinding> {
        self.sink.as_ref()
    }

    pub(crate) fn branches_at(&self, pos: usize) -> Option<&[BranchSpec]> {
        self.branches.get(&pos).map(|v| v.as_slice())
    }

    pub(crate) fn feeds_at(&self, pos: usize) -> Option<&[Arc<Mutex<Pipeline>>]> {
        self.feeds.get(&pos).map(|v| v.as_slice())
    }

    pub(crate) fn branch_targets(&self) -> impl Iterator<Item = (usize, &BranchSpec)> {
        self.branches.iter().flat_map(|(pos, list)| list.iter().map(move |b| (*pos, b)))
    }

    pub(crate) fn feed_targets(&self) -> impl Iterator<Item = (usize, &Arc<Mutex<Pipeline>>)> {
        self.feeds.iter().flat_map(|(pos, list)| list.iter().map(move |f| (*pos, f)))
    }

    pub(crate) fn take_start_values(&mut self) -> ValueSet {
        std::mem::take(&mut self.start_values)
    }

    pub(crate) fn start_types(&self) -> Vec<crate::value::ValueType> {
        self.start_values.iter().map(|v| v.value_type()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
