//! Escenarios de punta a punta sobre la fachada del workspace.

use std::io::Write;
use std::sync::{Arc, Mutex};

use callflow::{args, func0, func1, func2, try_func1, Ignore, JsonLinesSink, Pipeline,
               PipelineError, Stop, PIPE};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn parse_then_format_with_stop_policy() {
    // [parse("4") -> i64, format("%d", PIPE)] con Stop: termina bien y el
    // texto formateado es exactamente "4"
    let out: Arc<Mutex<String>> = Arc::new(Mutex::new(String::new()));
    let sink = out.clone();

    let mut q = Pipeline::new()
        .on_error(Stop)
        .add(try_func1(|s: String| s.parse::<i64>()), args!["4".to_string()])
        .add(func1(|n: i64| format!("{n}")), args![PIPE])
        .add(func1(move |s: String| *sink.lock().unwrap() = s), args![PIPE]);

    assert!(q.run().is_ok());
    assert_eq!(*out.lock().unwrap(), "4");
}

#[test]
fn swallowed_parse_failure_still_runs_the_literal_step() {
    // [parse("b") falla] + [format("%d", 5)] con Ignore: run devuelve Ok y
    // el paso con argumento literal corre igual
    let out: Arc<Mutex<String>> = Arc::new(Mutex::new(String::new()));
    let sink = out.clone();

    let mut q = Pipeline::new()
        .on_error(Ignore)
        .add(try_func1(|s: String| s.parse::<i64>()), args!["b".to_string()])
        .add(func1(|n: i64| format!("{n}")), args![5i64])
        .add(func1(move |s: String| *sink.lock().unwrap() = s), args![PIPE]);

    assert!(q.run().is_ok());
    assert_eq!(*out.lock().unwrap(), "5");
}

#[test]
fn fallback_parses_as_float_when_int_fails() {
    let mut q = Pipeline::new().add(try_func1(|s: String| s.parse::<i64>()),
                                    args!["3.5".to_string()])
                               .add(try_func1(|s: String| s.parse::<f64>()),
                                    args!["3.5".to_string()]);

    let out = q.fallback();
    assert_eq!(out.position, 1);
    assert!(out.error.is_none());
}

#[test]
fn validated_run_reports_the_mismatch_without_executing() {
    let executed = Arc::new(Mutex::new(false));
    let flag = executed.clone();

    let mut q = Pipeline::new().add(func0(move || {
                                        *flag.lock().unwrap() = true;
                                        5i64
                                    }),
                                    args![])
                               .add(func1(|_s: String| ()), args![PIPE]);

    let err = q.check_and_run().expect_err("tipos incompatibles");
    assert!(matches!(err, PipelineError::InvalidArgument { .. }));
    assert!(!*executed.lock().unwrap());
}

#[test]
fn branches_feeds_and_logging_compose_end_to_end() {
    let audit: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let teed = audit.clone();
    let buf = SharedBuf::default();

    let downstream_total: Arc<Mutex<i64>> = Arc::new(Mutex::new(0));
    let total = downstream_total.clone();
    let dependent = Arc::new(Mutex::new(
        Pipeline::new().add(func1(move |n: i64| *total.lock().unwrap() += n), args![PIPE]),
    ));

    let mut q = Pipeline::new()
        .log_debug_to(JsonLinesSink::new(buf.clone()))
        .add_named("parse", try_func1(|s: String| s.parse::<i64>()), args!["21".to_string()])
        .add(func2(|n: i64, factor: i64| n * factor), args![PIPE, 2i64])
        .branch(func1(move |n: i64| teed.lock().unwrap().push(format!("saw {n}"))),
                args![PIPE])
        .feed(dependent.clone());

    q.run().expect("el escenario completo debería pasar");

    assert_eq!(*audit.lock().unwrap(), vec!["saw 42".to_string()]);

    dependent.lock().unwrap().run().unwrap();
    assert_eq!(*downstream_total.lock().unwrap(), 42);

    // el sink recibió un registro JSON por llamada (incluido el branch)
    let log = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    let records: Vec<serde_json::Value> =
        log.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert!(records.len() >= 3);
    assert_eq!(records[0]["name"], "parse");
    assert!(records.iter().all(|r| r["level"] == "Debug"));
}
