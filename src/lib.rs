//! Callflow: cola secuencial de llamadas con piping de salidas.
//!
//! Este crate actúa como la fachada del workspace:
//! - Reexporta el motor (`call-core`): `Pipeline`, los adapters tipados,
//!   las políticas de error y los sinks de registro.
//! - Los escenarios de integración de todo el workspace viven en `tests/`.
//!
//! Puede usarse directamente o depender de `call-core` a secas.

pub use call_core::{args, func0, func0_2, func0v, func1, func1_2, func1v, func2, func2_2, func2v,
                    func3, func3_2, func4, func5, handler_fn, try_func0, try_func0_2, try_func0v,
                    try_func1, try_func1_2, try_func1v, try_func2, try_func2_2, try_func2v,
                    try_func3, try_func3_2, try_func4, try_func5, BoxError, CallOutcome,
                    CallRecord, CallSite, CallSpec, Callable, ErrorHandler, FallbackOutcome,
                    FnCallable, HandlerFn, Ignore, JsonLinesSink, PanicOnError, Pipe, PipeValue,
                    Pipeline, PipelineError, RecordLevel, Stop, TraceSink, TracingSink, ValueSet,
                    ValueType, Verbosity, WriterSink, PIPE};
